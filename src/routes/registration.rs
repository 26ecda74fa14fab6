use crate::{
    auth::{ChalkSession, hash_password},
    data::user::{NewUser, RegistrationValidationError, User, check_registration},
    error::ChalkResult,
    flash::Flash,
    maud_conveniences::{form_submit_button, simple_form_element, title},
    routes::outcome::{HxRequest, Outcome},
    state::ChalkState,
    store::UserStore,
};
use axum::{Form, extract::State, response::Response};
use axum_login::tower_sessions::Session;
use maud::{Markup, html};
use secrecy::SecretString;
use serde::Deserialize;
use std::future;

pub const WELCOME: &str = "Bem-vindo! Você se registrou com sucesso.";

#[derive(Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    password: SecretString,
    password_confirmation: SecretString,
}

///what gets put back into the form after a failed attempt - never the passwords
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpDraft {
    pub name: String,
    pub email: String,
}

///the first account ever made gets to be the admin
pub async fn register<S: UserStore>(
    store: &S,
    form: SignUpForm,
) -> ChalkResult<Result<User, (SignUpDraft, RegistrationValidationError)>> {
    let SignUpForm {
        name,
        email,
        password,
        password_confirmation,
    } = form;

    let checked = check_registration(&name, &email, &password, &password_confirmation);
    let taken = store.find_user_by_email(email.trim()).await?.is_some();

    let original_email = email.clone();
    let email = match checked {
        Ok(email) if !taken => email,
        Ok(_) => {
            return Ok(Err((
                SignUpDraft { name, email },
                RegistrationValidationError::EMAIL_TAKEN,
            )));
        }
        Err(mut errors) => {
            if taken {
                errors |= RegistrationValidationError::EMAIL_TAKEN;
            }
            return Ok(Err((SignUpDraft { name, email }, errors)));
        }
    };

    let bcrypt_hashed_password = hash_password(password).await?;
    let Some(user) = store
        .create_user(NewUser {
            name: name.trim().to_string(),
            email,
            bcrypt_hashed_password,
        })
        .await?
    else {
        return Ok(Err((
            SignUpDraft { name, email: original_email },
            RegistrationValidationError::EMAIL_TAKEN,
        )));
    };

    info!(id = ?user.id, admin = user.admin, "Registered new user");
    Ok(Ok(user))
}

fn render_sign_up(draft: &SignUpDraft) -> Markup {
    html! {
        div class="flex items-center justify-center" {
            div class="bg-gray-800 p-8 rounded-lg shadow-xl w-full max-w-md" {
                (title("Registrar-se"))
                form method="post" action="/users/sign_up" {
                    (simple_form_element("name", "Nome", true, None, Some(&draft.name)))
                    (simple_form_element("email", "E-mail", true, Some("email"), Some(&draft.email)))
                    (simple_form_element("password", "Senha", true, Some("password"), None))
                    (simple_form_element("password_confirmation", "Confirmação de senha", true, Some("password"), None))
                    (form_submit_button(Some("Registrar-se")))
                }
            }
        }
    }
}

pub async fn get_sign_up(
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    let outcome = if auth.user.is_some() {
        Outcome::redirect("/incidents")
    } else {
        Outcome::render(SignUpDraft::default())
    };

    outcome
        .respond(&session, auth.user.as_ref(), hx, |draft| {
            future::ready(Ok(render_sign_up(&draft)))
        })
        .await
}

pub async fn post_sign_up(
    State(state): State<ChalkState>,
    mut auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Form(form): Form<SignUpForm>,
) -> ChalkResult<Response> {
    let outcome = match register(&state.store(), form).await? {
        Ok(user) => {
            auth.login(&user).await?;
            Outcome::redirect_with("/incidents", Flash::success(WELCOME))
        }
        Err((draft, errors)) => {
            Outcome::render_with(draft, Flash::Error(errors.full_messages()))
        }
    };

    outcome
        .respond(&session, auth.user.as_ref(), hx, |draft| {
            future::ready(Ok(render_sign_up(&draft)))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    fn form(name: &str, email: &str, password: &str, confirmation: &str) -> SignUpForm {
        SignUpForm {
            name: name.into(),
            email: email.into(),
            password: SecretString::from(password),
            password_confirmation: SecretString::from(confirmation),
        }
    }

    #[tokio::test]
    async fn first_user_is_admin_and_the_rest_are_not() {
        let store = MemoryStore::default();

        let first = register(
            &store,
            form("Diretora", "diretora@escola.example", "segredo1", "segredo1"),
        )
        .await
        .unwrap()
        .unwrap();
        let second = register(
            &store,
            form("Professor", "prof@escola.example", "segredo2", "segredo2"),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(first.admin);
        assert!(!second.admin);
    }

    #[tokio::test]
    async fn taken_email_is_reported_in_order() {
        let store = MemoryStore::default();
        let existing = store.add_user("Ana", false).await;

        let Err((draft, errors)) = register(&store, form("", &existing.email, "curta", "curta"))
            .await
            .unwrap()
        else {
            panic!("registration should fail");
        };

        assert_eq!(draft.email, existing.email);
        assert_eq!(
            errors.full_messages(),
            vec![
                "Nome não pode ficar em branco".to_string(),
                "E-mail já está em uso".to_string(),
                "Senha é muito curta (mínimo: 6 caracteres)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn simultaneous_sign_ups_with_one_email_make_one_account() {
        let store = MemoryStore::default();

        let (a, b) = tokio::join!(
            register(&store, form("Ana", "ana@escola.example", "segredo1", "segredo1")),
            register(&store, form("Ana B", "ANA@escola.example", "segredo2", "segredo2")),
        );
        let mut results = vec![a.unwrap(), b.unwrap()];
        results.sort_by_key(Result::is_err);

        let [Ok(user), Err((_, errors))] = results.as_slice() else {
            panic!("exactly one sign up should win, got {results:?}");
        };
        assert!(user.admin);
        assert_eq!(*errors, RegistrationValidationError::EMAIL_TAKEN);
        assert!(
            store
                .find_user_by_email("ana@escola.example")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn store_turns_down_a_second_account_for_an_email() {
        let store = MemoryStore::default();
        let new_user = |name: &str| NewUser {
            name: name.into(),
            email: "ana@escola.example".parse().unwrap(),
            bcrypt_hashed_password: "$2b$04$not.a.real.hash".into(),
        };

        let first = store.create_user(new_user("Ana")).await.unwrap();
        let second = store.create_user(new_user("Outra Ana")).await.unwrap();

        assert!(first.is_some_and(|user| user.admin));
        assert_eq!(second, None);
    }

    #[test]
    fn passwords_never_come_back() {
        let markup = render_sign_up(&SignUpDraft {
            name: "Ana".into(),
            email: "ana@escola.example".into(),
        })
        .into_string();

        assert!(markup.contains(r#"value="ana@escola.example""#));
        assert!(!markup.contains(r#"name="password" value"#));
    }
}
