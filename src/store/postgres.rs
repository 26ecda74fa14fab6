use crate::{
    data::{
        incident::{Incident, NewIncident},
        student::{NewStudent, Student},
        user::{NewUser, User, UserRow},
    },
    error::{ChalkError, ChalkResult, MakeQuerySnafu},
    store::{IncidentStore, StudentStore, UserStore},
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const SELECT_INCIDENTS: &str = "SELECT i.id, i.student_id, s.name AS student_name, i.user_id, u.name AS user_name, i.date_incident, i.description, i.soluction, i.created_at, i.updated_at FROM public.incidents i INNER JOIN public.students s ON s.id = i.student_id INNER JOIN public.users u ON u.id = i.user_id";

#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    pub const fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for PostgresStore {
    async fn all_students(&self) -> ChalkResult<Vec<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM public.students ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn find_student(&self, id: i32) -> ChalkResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM public.students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn create_student(&self, new: NewStudent) -> ChalkResult<i32> {
        let NewStudent {
            name,
            responsible,
            contact_responsible,
            date_enrolment,
            image,
            status,
        } = new;

        sqlx::query_scalar("INSERT INTO public.students (name, responsible, contact_responsible, date_enrolment, image, status) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id")
            .bind(name)
            .bind(responsible)
            .bind(contact_responsible)
            .bind(date_enrolment)
            .bind(image)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn update_student(&self, id: i32, new: NewStudent) -> ChalkResult<()> {
        let NewStudent {
            name,
            responsible,
            contact_responsible,
            date_enrolment,
            image,
            status,
        } = new;

        sqlx::query("UPDATE public.students SET name = $2, responsible = $3, contact_responsible = $4, date_enrolment = $5, image = $6, status = $7, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(responsible)
            .bind(contact_responsible)
            .bind(date_enrolment)
            .bind(image)
            .bind(status)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }
}

#[async_trait]
impl IncidentStore for PostgresStore {
    async fn all_incidents(&self) -> ChalkResult<Vec<Incident>> {
        sqlx::query_as::<_, Incident>(&format!(
            "{SELECT_INCIDENTS} ORDER BY i.date_incident DESC, i.id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn incidents_for_student(&self, student_id: i32) -> ChalkResult<Vec<Incident>> {
        sqlx::query_as::<_, Incident>(&format!(
            "{SELECT_INCIDENTS} WHERE i.student_id = $1 ORDER BY i.date_incident DESC, i.id DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn find_incident(&self, id: i32) -> ChalkResult<Option<Incident>> {
        sqlx::query_as::<_, Incident>(&format!("{SELECT_INCIDENTS} WHERE i.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn create_incident(&self, new: NewIncident) -> ChalkResult<i32> {
        let NewIncident {
            student_id,
            user_id,
            date_incident,
            description,
            soluction,
        } = new;

        sqlx::query_scalar("INSERT INTO public.incidents (student_id, user_id, date_incident, description, soluction) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(student_id)
            .bind(user_id)
            .bind(date_incident)
            .bind(description)
            .bind(soluction)
            .fetch_one(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn update_incident(&self, id: i32, new: NewIncident) -> ChalkResult<()> {
        let NewIncident {
            student_id,
            user_id,
            date_incident,
            description,
            soluction,
        } = new;

        sqlx::query("UPDATE public.incidents SET student_id = $2, user_id = $3, date_incident = $4, description = $5, soluction = $6, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(student_id)
            .bind(user_id)
            .bind(date_incident)
            .bind(description)
            .bind(soluction)
            .execute(&self.pool)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn delete_incident(&self, id: i32) -> ChalkResult<bool> {
        match sqlx::query("DELETE FROM public.incidents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) => Ok(result.rows_affected() == 1),
            Err(sqlx::Error::Database(db_error)) if db_error.is_foreign_key_violation() => {
                warn!(id, ?db_error, "Incident is still referenced, refusing to delete");
                Ok(false)
            }
            Err(source) => Err(ChalkError::MakeQuery { source }),
        }
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_user(&self, id: Uuid) -> ChalkResult<Option<User>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, bcrypt_hashed_password, admin FROM public.users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)?
        .map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> ChalkResult<Option<User>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, bcrypt_hashed_password, admin FROM public.users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)?
        .map(User::from))
    }

    async fn create_user(&self, new: NewUser) -> ChalkResult<Option<User>> {
        let NewUser {
            name,
            email,
            bcrypt_hashed_password,
        } = new;

        let mut transaction = self.pool.begin().await.context(MakeQuerySnafu)?;
        //serialises sign ups, so only one of two simultaneous first accounts becomes admin
        sqlx::query("LOCK TABLE public.users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *transaction)
            .await
            .context(MakeQuerySnafu)?;

        let inserted = sqlx::query_as::<_, UserRow>(
            "INSERT INTO public.users (name, email, bcrypt_hashed_password, admin) \
             VALUES ($1, $2, $3, NOT EXISTS (SELECT 1 FROM public.users)) \
             RETURNING id, name, email, bcrypt_hashed_password, admin",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(bcrypt_hashed_password)
        .fetch_one(&mut *transaction)
        .await;

        match inserted {
            Ok(row) => {
                transaction.commit().await.context(MakeQuerySnafu)?;
                Ok(Some(row.into()))
            }
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                warn!(%email, "Email was registered in the meantime");
                Ok(None)
            }
            Err(source) => Err(ChalkError::MakeQuery { source }),
        }
    }
}
