use crate::{
    auth::verify_password,
    data::user::User,
    error::ChalkError,
    store::{UserStore, postgres::PostgresStore},
};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use secrecy::SecretString;

#[derive(Clone)]
pub struct ChalkAuthBackend {
    store: PostgresStore,
}

impl ChalkAuthBackend {
    pub const fn new(store: PostgresStore) -> Self {
        Self { store }
    }
}

pub enum ChalkAuthCredentials {
    EmailPassword {
        email: String,
        password: SecretString,
    },
}

#[async_trait]
impl AuthnBackend for ChalkAuthBackend {
    type User = User;
    type Credentials = ChalkAuthCredentials;
    type Error = ChalkError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        match creds {
            ChalkAuthCredentials::EmailPassword { email, password } => {
                let Some(user) = self.store.find_user_by_email(email.trim()).await? else {
                    return Ok(None);
                };

                let matches =
                    verify_password(password, user.bcrypt_hashed_password.clone()).await?;

                Ok(if matches { Some(user) } else { None })
            }
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        self.store.find_user(*user_id).await
    }
}
