use crate::error::{ChalkResult, TowerSessionSnafu};
use axum_login::tower_sessions::Session;
use maud::{Markup, Render, html};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

const FLASH_KEY: &str = "chalk.flash";

///one-shot messages for whichever page gets rendered next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flash {
    Success(String),
    Error(Vec<String>),
    Alert(String),
}

impl Flash {
    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(vec![msg.into()])
    }

    pub fn alert(msg: impl Into<String>) -> Self {
        Self::Alert(msg.into())
    }

    pub async fn store(self, session: &Session) -> ChalkResult<()> {
        session
            .insert(FLASH_KEY, self)
            .await
            .context(TowerSessionSnafu)
    }

    ///removes the flash so it only ever shows once
    pub async fn take(session: &Session) -> ChalkResult<Option<Self>> {
        session.remove(FLASH_KEY).await.context(TowerSessionSnafu)
    }
}

impl Render for Flash {
    fn render(&self) -> Markup {
        match self {
            Self::Success(msg) => html! {
                div role="status" class="bg-green-100 border border-green-400 text-green-800 px-4 py-3 rounded relative mb-4" {
                    span {(msg)}
                }
            },
            Self::Error(msgs) => html! {
                div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
                    @if msgs.len() == 1 {
                        span {(msgs[0])}
                    } @else {
                        ul class="list-disc list-inside" {
                            @for msg in msgs {
                                li {(msg)}
                            }
                        }
                    }
                }
            },
            Self::Alert(msg) => html! {
                div role="alert" class="bg-yellow-100 border border-yellow-400 text-yellow-800 px-4 py-3 rounded relative mb-4" {
                    span {(msg)}
                }
            },
        }
    }
}
