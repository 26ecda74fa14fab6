use crate::{
    config::RuntimeConfiguration,
    error::{ChalkResult, MigrateSnafu, OpenDatabaseSnafu},
    store::postgres::PostgresStore,
};
use snafu::ResultExt;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

#[derive(Clone, Debug)]
pub struct ChalkState {
    pool: Pool<Postgres>,
}

impl ChalkState {
    pub async fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> ChalkResult<Self> {
        let pool = options
            .connect(&config.db_config().get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> Pool<Postgres> {
        self.pool.clone()
    }

    pub fn store(&self) -> PostgresStore {
        PostgresStore::new(self.pool.clone())
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}
