use crate::error::{BadEnvVarSnafu, ChalkError, ChalkResult, ParseNumberSnafu};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_config: Arc<ServerConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> ChalkResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
            server_config: Arc::new(ServerConfig::new()?),
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
}

impl DbConfig {
    pub fn new() -> ChalkResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?
                .parse()
                .context(ParseNumberSnafu { name: "DB_PORT" })?,
            database: get_env_var("DB_NAME")?,
        })
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    pub server_ip: String,
    pub session_days: i64,
}

impl ServerConfig {
    const DEFAULT_SERVER_IP: &'static str = "127.0.0.1:8080";
    const DEFAULT_SESSION_DAYS: i64 = 5;

    pub fn new() -> ChalkResult<Self> {
        let server_ip = optional_var("CHALK_SERVER_IP")?
            .unwrap_or_else(|| Self::DEFAULT_SERVER_IP.to_string());
        let session_days = match optional_var("CHALK_SESSION_DAYS")? {
            Some(days) => days.parse().context(ParseNumberSnafu {
                name: "CHALK_SESSION_DAYS",
            })?,
            None => Self::DEFAULT_SESSION_DAYS,
        };

        Ok(Self {
            server_ip,
            session_days,
        })
    }
}

///missing vars are fine, anything else (eg. bad unicode) isn't
fn optional_var(name: &'static str) -> ChalkResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(source) => Err(ChalkError::BadEnvVar { source, name }),
    }
}
