use crate::{
    auth::Denial, data::user::User, error::ChalkResult, flash::Flash, maud_conveniences::layout,
};
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_login::tower_sessions::Session;
use maud::Markup;
use std::convert::Infallible;

///what a controller decided to do, before any HTML gets rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<P> {
    Render { page: P, flash: Option<Flash> },
    Redirect { to: String, flash: Option<Flash> },
}

impl<P> Outcome<P> {
    pub const fn render(page: P) -> Self {
        Self::Render { page, flash: None }
    }

    pub const fn render_with(page: P, flash: Flash) -> Self {
        Self::Render {
            page,
            flash: Some(flash),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            flash: None,
        }
    }

    pub fn redirect_with(to: impl Into<String>, flash: Flash) -> Self {
        Self::Redirect {
            to: to.into(),
            flash: Some(flash),
        }
    }

    #[cfg(test)]
    pub fn flash(&self) -> Option<&Flash> {
        match self {
            Self::Render { flash, .. } | Self::Redirect { flash, .. } => flash.as_ref(),
        }
    }

    ///redirects keep their flash in the session for the next page, renders show theirs (and anything pending) straight away
    pub async fn respond<F, Fut>(
        self,
        session: &Session,
        user: Option<&User>,
        HxRequest(is_htmx): HxRequest,
        render_page: F,
    ) -> ChalkResult<Response>
    where
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = ChalkResult<Markup>>,
    {
        match self {
            Self::Redirect { to, flash } => {
                if let Some(flash) = flash {
                    flash.store(session).await?;
                }

                Ok(if is_htmx {
                    (StatusCode::OK, [("HX-Redirect", to)]).into_response()
                } else {
                    Redirect::to(&to).into_response()
                })
            }
            Self::Render { page, flash } => {
                let flashes: Vec<Flash> = Flash::take(session)
                    .await?
                    .into_iter()
                    .chain(flash)
                    .collect();
                let markup = render_page(page).await?;

                Ok(layout(user, &flashes, markup).into_response())
            }
        }
    }
}

impl<P> From<Denial> for Outcome<P> {
    fn from(Denial { redirect_to, alert }: Denial) -> Self {
        Self::redirect_with(redirect_to, Flash::alert(alert))
    }
}

///whether htmx sent the request - those need `HX-Redirect` rather than a 303, as the XHR would follow it silently
#[derive(Debug, Clone, Copy)]
pub struct HxRequest(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for HxRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.headers.contains_key("hx-request")))
    }
}
