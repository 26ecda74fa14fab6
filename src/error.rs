use crate::auth::backend::ChalkAuthBackend;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_login::tower_sessions::cookie::time::{OffsetDateTime, error::ComponentRange};
use chrono::{DateTime, Utc};
use maud::html;
use snafu::Snafu;
use std::num::ParseIntError;

pub type ChalkResult<T> = Result<T, ChalkError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ChalkError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Error converting {} to `chrono::DateTime`", odt))]
    InvalidSessionExpiry { odt: OffsetDateTime },
    #[snafu(display("Error converting {} to `time::OffsetDateTime`", utc_dt))]
    InvalidChronoDateTime {
        source: ComponentRange,
        utc_dt: DateTime<Utc>,
    },
    #[snafu(display("Error serialising with rmp_serde"))]
    RmpSerdeEncode { source: rmp_serde::encode::Error },
    #[snafu(display("Error deserialising with rmp_serde"))]
    RmpSerdeDecode { source: rmp_serde::decode::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to find incident with ID: {}", id))]
    MissingIncident { id: i32 },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i32 },
    #[snafu(display("Error with hashing/password verification"))]
    Bcrypt { source: bcrypt::BcryptError },
    #[snafu(display("Error joining blocking task"))]
    JoinTask { source: tokio::task::JoinError },
    #[snafu(display("Error with sessions"))]
    TowerSession {
        source: axum_login::tower_sessions::session::Error,
    },
}

impl From<axum_login::Error<ChalkAuthBackend>> for ChalkError {
    fn from(value: axum_login::Error<ChalkAuthBackend>) -> Self {
        match value {
            axum_login::Error::Session(source) => Self::TowerSession { source },
            axum_login::Error::Backend(backend) => backend,
        }
    }
}

impl ChalkError {
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => NF,
                _ => ISE,
            },
            Self::Migrate { .. } => ISE,
            Self::InvalidSessionExpiry { .. } | Self::InvalidChronoDateTime { .. } => ISE,
            Self::RmpSerdeEncode { .. } => ISE,
            Self::RmpSerdeDecode { .. } => BI,
            Self::BadEnvVar { .. } | Self::ParseNumber { .. } => ISE,
            Self::MissingIncident { .. } | Self::MissingStudent { .. } => NF,
            Self::Bcrypt { .. } | Self::JoinTask { .. } => ISE,
            Self::TowerSession { .. } => ISE,
        }
    }
}

impl IntoResponse for ChalkError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Erro: "}
                    span {(desc)}
                }
            }
        };

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, "Request failed");
        }
        (status_code, Html(basic_error(self.to_string()).into_string())).into_response()
    }
}
