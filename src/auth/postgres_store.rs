use crate::error::{
    ChalkError, InvalidChronoDateTimeSnafu, InvalidSessionExpirySnafu, MakeQuerySnafu,
    RmpSerdeDecodeSnafu, RmpSerdeEncodeSnafu,
};
use async_trait::async_trait;
use axum_login::tower_sessions::{
    ExpiredDeletion, SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store::Error as SSError,
};
use chrono::{DateTime, Utc};
use snafu::{OptionExt, ResultExt};
use sqlx::{PgConnection, Pool, Postgres};

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: Pool<Postgres>,
}

impl PostgresSessionStore {
    pub const fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<sqlx::pool::PoolConnection<Postgres>, SSError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| SSError::Backend(e.to_string()))
    }

    async fn id_exists(id: Id, conn: &mut PgConnection) -> Result<bool, ChalkError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM public.sessions WHERE id = $1)")
            .bind(id.to_string())
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn save_session(record: &Record, conn: &mut PgConnection) -> Result<(), ChalkError> {
        let expiry_date: DateTime<Utc> = DateTime::from_timestamp(
            record.expiry_date.unix_timestamp(),
            record.expiry_date.nanosecond(),
        )
        .context(InvalidSessionExpirySnafu {
            odt: record.expiry_date,
        })?;

        let serialised_data = rmp_serde::to_vec(&record.data).context(RmpSerdeEncodeSnafu)?;

        sqlx::query("INSERT INTO public.sessions (id, data, expiry_date) VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET data = excluded.data, expiry_date = excluded.expiry_date")
            .bind(record.id.to_string())
            .bind(serialised_data)
            .bind(expiry_date)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;

        Ok(())
    }

    async fn load_session(id: Id, conn: &mut PgConnection) -> Result<Option<Record>, ChalkError> {
        let Some((data, expiry_date)) = sqlx::query_as::<_, (Vec<u8>, DateTime<Utc>)>(
            "SELECT data, expiry_date FROM public.sessions WHERE id = $1 AND expiry_date > now()",
        )
        .bind(id.to_string())
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)?
        else {
            return Ok(None);
        };

        let data = rmp_serde::from_slice(&data).context(RmpSerdeDecodeSnafu)?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(expiry_date.timestamp())
            .context(InvalidChronoDateTimeSnafu {
                utc_dt: expiry_date,
            })?;

        Ok(Some(Record {
            id,
            data,
            expiry_date,
        }))
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session_record: &mut Record) -> Result<(), SSError> {
        let mut connection = self.connection().await?;

        while Self::id_exists(session_record.id, &mut connection)
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?
        {
            session_record.id = Id::default();
        }

        Self::save_session(session_record, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))
    }

    async fn save(&self, session_record: &Record) -> Result<(), SSError> {
        let mut connection = self.connection().await?;

        Self::save_session(session_record, &mut connection)
            .await
            .map_err(|e| SSError::Encode(e.to_string()))
    }

    async fn load(&self, session_id: &Id) -> Result<Option<Record>, SSError> {
        let mut connection = self.connection().await?;

        Self::load_session(*session_id, &mut connection)
            .await
            .map_err(|e| SSError::Decode(e.to_string()))
    }

    async fn delete(&self, session_id: &Id) -> Result<(), SSError> {
        sqlx::query("DELETE FROM public.sessions WHERE id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for PostgresSessionStore {
    async fn delete_expired(&self) -> Result<(), SSError> {
        let deleted = sqlx::query("DELETE FROM public.sessions WHERE expiry_date < now()")
            .execute(&self.pool)
            .await
            .map_err(|e| SSError::Backend(e.to_string()))?
            .rows_affected();

        info!(deleted, "Removed expired sessions");
        Ok(())
    }
}
