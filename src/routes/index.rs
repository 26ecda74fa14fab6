use crate::{
    auth::{ChalkSession, SIGN_IN_PATH},
    error::ChalkResult,
    maud_conveniences::link_button,
    routes::outcome::{HxRequest, Outcome},
};
use axum::response::Response;
use axum_login::tower_sessions::Session;
use maud::html;
use std::future;

pub async fn get_index_route(
    auth: ChalkSession,
    session: Session,
    hx: HxRequest,
) -> ChalkResult<Response> {
    let outcome = if auth.user.is_some() {
        Outcome::redirect("/incidents")
    } else {
        Outcome::render(())
    };

    outcome
        .respond(&session, auth.user.as_ref(), hx, |()| {
            future::ready(Ok(html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full mx-auto" {
                    h1 class="text-2xl font-semibold mb-6 text-center" {
                        "Chalk"
                    }
                    p class="text-gray-300 mb-6 text-center" {
                        "Registro de alunos e ocorrências escolares."
                    }

                    div class="flex flex-row space-x-4 justify-center" {
                        (link_button(SIGN_IN_PATH, "Entrar"))
                        (link_button("/users/sign_up", "Registrar-se"))
                    }
                }
            }))
        })
        .await
}
