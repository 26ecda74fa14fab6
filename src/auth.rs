use crate::{
    auth::backend::ChalkAuthBackend,
    data::user::User,
    error::{BcryptSnafu, ChalkResult, JoinTaskSnafu},
};
use axum_login::AuthSession;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;

pub mod backend;
pub mod postgres_store;

pub type ChalkSession = AuthSession<ChalkAuthBackend>;

pub const SIGN_IN_PATH: &str = "/users/sign_in";
pub const SIGN_IN_REQUIRED: &str = "Para continuar, efetue login ou registre-se.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    pub redirect_to: &'static str,
    pub alert: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Access<'a> {
    Allowed(&'a User),
    Denied(Denial),
}

///every signed-in user gets through, admin or not
pub const fn authorize(identity: Option<&User>) -> Access<'_> {
    match identity {
        Some(user) => Access::Allowed(user),
        None => Access::Denied(Denial {
            redirect_to: SIGN_IN_PATH,
            alert: SIGN_IN_REQUIRED,
        }),
    }
}

pub async fn hash_password(password: SecretString) -> ChalkResult<String> {
    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password.expose_secret().as_bytes(), bcrypt::DEFAULT_COST)
    })
    .await
    .context(JoinTaskSnafu)?
    .context(BcryptSnafu)
}

pub async fn verify_password(password: SecretString, hash: SecretString) -> ChalkResult<bool> {
    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password.expose_secret(), hash.expose_secret())
    })
    .await
    .context(JoinTaskSnafu)?
    .context(BcryptSnafu)
}
