use crate::{
    auth::{ChalkSession, SIGN_IN_PATH, backend::ChalkAuthCredentials},
    error::ChalkResult,
    flash::Flash,
    maud_conveniences::{form_submit_button, simple_form_element, title},
    routes::outcome::{HxRequest, Outcome},
};
use axum::{Form, extract::Query, response::Response};
use axum_login::tower_sessions::Session;
use maud::html;
use secrecy::SecretString;
use serde::Deserialize;
use std::future;

pub const LOGIN_FAILED: &str = "E-mail ou senha inválidos.";
const AFTER_SIGN_IN: &str = "/incidents";

///only paths on this site, so the form can't be used to bounce people elsewhere
fn local_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => AFTER_SIGN_IN,
    }
}

#[derive(Deserialize)]
pub struct SignInQuery {
    next: Option<String>,
}

///where a failed sign in goes back to, keeping `next` intact even when it has its own query
fn sign_in_retry_path(next: Option<&str>) -> String {
    let Some(next) = next else {
        return SIGN_IN_PATH.to_string();
    };

    match serde_urlencoded::to_string([("next", local_next(Some(next)))]) {
        Ok(query) => format!("{SIGN_IN_PATH}?{query}"),
        Err(e) => {
            warn!(?e, "Couldn't encode next path");
            SIGN_IN_PATH.to_string()
        }
    }
}

pub async fn get_sign_in(
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Query(SignInQuery { next }): Query<SignInQuery>,
) -> ChalkResult<Response> {
    let outcome = if auth.user.is_some() {
        Outcome::redirect(local_next(next.as_deref()))
    } else {
        Outcome::render(next)
    };

    outcome
        .respond(&session, auth.user.as_ref(), hx, |next| {
            future::ready(Ok(html! {
                div class="flex items-center justify-center" {
                    div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-sm" {
                        (title("Entrar"))
                        form method="post" action=(SIGN_IN_PATH) {
                            @if let Some(next) = next {
                                input type="hidden" name="next" value=(next) {}
                            }
                            (simple_form_element("email", "E-mail", true, Some("email"), None))
                            (simple_form_element("password", "Senha", true, Some("password"), None))
                            (form_submit_button(Some("Entrar")))
                        }
                        p class="text-gray-400 text-sm mt-4" {
                            "Ainda não tem conta? "
                            a href="/users/sign_up" class="underline hover:text-blue-300" {"Registre-se"}
                        }
                    }
                }
            }))
        })
        .await
}

#[derive(Deserialize)]
pub struct SignInForm {
    email: String,
    password: SecretString,
    next: Option<String>,
}

pub async fn post_sign_in(
    mut auth: ChalkSession,
    session: Session,
    hx: HxRequest,
    Form(SignInForm {
        email,
        password,
        next,
    }): Form<SignInForm>,
) -> ChalkResult<Response> {
    let outcome = match auth
        .authenticate(ChalkAuthCredentials::EmailPassword { email, password })
        .await?
    {
        Some(user) => {
            auth.login(&user).await?;
            info!(id = ?user.id, "Signed in");
            Outcome::redirect(local_next(next.as_deref()))
        }
        None => {
            warn!("Failed sign in attempt");
            Outcome::redirect_with(
                sign_in_retry_path(next.as_deref()),
                Flash::alert(LOGIN_FAILED),
            )
        }
    };

    outcome
        .respond(&session, auth.user.as_ref(), hx, |()| future::ready(Ok(html! {})))
        .await
}

pub async fn post_sign_out(
    mut auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    if let Some(user) = auth.logout().await? {
        info!(id = ?user.id, "Signed out");
    }

    Outcome::redirect(SIGN_IN_PATH)
        .respond(&session, None, hx, |()| future::ready(Ok(html! {})))
        .await
}
