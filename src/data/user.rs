use crate::data::FieldError;
use axum_login::AuthUser;
use bitflags::bitflags;
use email_address::EmailAddress;
use maud::Render;
use secrecy::{ExposeSecret, SecretString};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bcrypt_hashed_password: SecretString,
    pub admin: bool,
}

#[derive(FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bcrypt_hashed_password: String,
    pub admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            bcrypt_hashed_password: SecretString::from(row.bcrypt_hashed_password),
            admin: row.admin,
        }
    }
}

///an account ready to go into the database - the password is already hashed
pub struct NewUser {
    pub name: String,
    pub email: EmailAddress,
    pub bcrypt_hashed_password: String,
}

///accounts are the same account if they have the same id, whatever else has changed
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for User {}

impl Render for User {
    fn render_to(&self, buffer: &mut String) {
        self.name.render_to(buffer);
    }
}

impl AuthUser for User {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.bcrypt_hashed_password.expose_secret().as_bytes()
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct RegistrationValidationError: u8 {
        const NAME_BLANK =         0b0000_0001;
        const EMAIL_INVALID =      0b0000_0010;
        const EMAIL_TAKEN =        0b0000_0100;
        const PASSWORD_TOO_SHORT = 0b0000_1000;
        const DIDNT_MATCH =        0b0001_0000;
    }
}

impl RegistrationValidationError {
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.iter()
            .filter_map(|e| match e {
                Self::NAME_BLANK => Some(FieldError::blank("name", "Nome")),
                Self::EMAIL_INVALID => Some(FieldError::new("email", "E-mail", "não é válido")),
                Self::EMAIL_TAKEN => Some(FieldError::new("email", "E-mail", "já está em uso")),
                Self::PASSWORD_TOO_SHORT => Some(FieldError::new(
                    "password",
                    "Senha",
                    "é muito curta (mínimo: 6 caracteres)",
                )),
                Self::DIDNT_MATCH => Some(FieldError::new(
                    "password_confirmation",
                    "Confirmação de senha",
                    "não é igual a Senha",
                )),
                _ => None,
            })
            .collect()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.field_errors()
            .iter()
            .map(FieldError::full_message)
            .collect()
    }
}

///checks everything that doesn't need the database; whether the email is taken gets added on by the caller
pub fn check_registration(
    name: &str,
    email: &str,
    password: &SecretString,
    password_confirmation: &SecretString,
) -> Result<EmailAddress, RegistrationValidationError> {
    let mut errors = RegistrationValidationError::empty();

    if name.trim().is_empty() {
        errors |= RegistrationValidationError::NAME_BLANK;
    }
    let email = EmailAddress::from_str(email.trim()).ok();
    if email.is_none() {
        errors |= RegistrationValidationError::EMAIL_INVALID;
    }
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        errors |= RegistrationValidationError::PASSWORD_TOO_SHORT;
    }
    if password.expose_secret() != password_confirmation.expose_secret() {
        errors |= RegistrationValidationError::DIDNT_MATCH;
    }

    match email {
        Some(email) if errors.is_empty() => Ok(email),
        _ => Err(errors),
    }
}
