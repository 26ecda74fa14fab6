#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    auth::{backend::ChalkAuthBackend, postgres_store::PostgresSessionStore},
    config::RuntimeConfiguration,
    routes::{
        incidents::{
            delete_incident, get_edit_incident, get_incident, get_incidents, get_new_incident,
            post_new_incident, put_incident,
        },
        index::get_index_route,
        login::{get_sign_in, post_sign_in, post_sign_out},
        registration::{get_sign_up, post_sign_up},
        students::{
            get_edit_student, get_new_student, get_student, get_students, post_new_student,
            put_student,
        },
    },
    state::ChalkState,
};
use axum::{
    Router,
    routing::{get, post},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer, cookie::time::Duration},
};
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod auth;
mod config;
mod data;
mod error;
mod flash;
mod maud_conveniences;
mod routes;
mod state;
mod store;

async fn shutdown_signal(state: ChalkState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv {
        warn!(?e, "No .env file loaded, relying on the environment");
    }

    let options = PgPoolOptions::new().max_connections(15);
    let config = RuntimeConfiguration::new().expect("unable to create config");
    let server_config = config.server_config();
    let state = ChalkState::new(options, config)
        .await
        .expect("unable to create state");

    let session_store = PostgresSessionStore::new(state.pool());
    if let Err(e) = session_store.delete_expired().await {
        warn!(?e, "Unable to remove expired sessions");
    }
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(server_config.session_days)));
    let auth_backend = ChalkAuthBackend::new(state.store());
    let auth_layer = AuthManagerLayerBuilder::new(auth_backend, session_layer).build();

    let app = Router::new()
        .route("/", get(get_index_route))
        .route("/incidents", get(get_incidents).post(post_new_incident))
        .route("/incidents/new", get(get_new_incident))
        .route(
            "/incidents/{id}",
            get(get_incident).put(put_incident).delete(delete_incident),
        )
        .route("/incidents/{id}/edit", get(get_edit_incident))
        .route("/students", get(get_students).post(post_new_student))
        .route("/students/new", get(get_new_student))
        .route("/students/{id}", get(get_student).put(put_student))
        .route("/students/{id}/edit", get(get_edit_student))
        .route("/users/sign_in", get(get_sign_in).post(post_sign_in))
        .route("/users/sign_out", post(post_sign_out))
        .route("/users/sign_up", get(get_sign_up).post(post_sign_up))
        .layer(auth_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state.clone());

    let listener = TcpListener::bind(&server_config.server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(server_ip = ?server_config.server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
