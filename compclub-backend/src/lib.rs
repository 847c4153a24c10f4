//! JSON API over the CompClub volunteering operations.

pub mod error;
pub mod identity;
pub mod mail;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post, put};
use axum::Router;
use compclub_config::MailConfig;
use compclub_volunteering::notifier::Mailer;
use compclub_volunteering::Store;
use error::AppError;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::info;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub mail: MailConfig,
}

pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/users", post(routes::users::create))
        .route(
            "/volunteers/:volunteer_id/position",
            put(routes::users::set_position),
        )
        .route(
            "/events",
            get(routes::events::upcoming).post(routes::events::create),
        )
        .route("/events/:event_id", get(routes::events::page))
        .route(
            "/events/:event_id/workshops",
            post(routes::events::create_workshops),
        )
        .route(
            "/events/:event_id/registrations",
            post(routes::events::register),
        )
        .route(
            "/events/:event_id/assignments",
            get(routes::assignments::event_overview),
        )
        .route(
            "/events/:event_id/status-emails",
            get(routes::status_emails::preview).post(routes::status_emails::send),
        )
        .route(
            "/workshops/:workshop_id/availability",
            post(routes::workshops::toggle_availability),
        )
        .route(
            "/workshops/:workshop_id/assignments",
            get(routes::assignments::workshop_overview).post(routes::assignments::apply),
        )
        .with_state(state);

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::default().include_headers(true))
                    .on_response(DefaultOnResponse::default().include_headers(true)),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::new()),
    )
}

pub async fn serve(listen_address: SocketAddr, state: AppState) -> Result<(), AppError> {
    let listener = TcpListener::bind(listen_address).await?;
    info!(address = %listen_address, "listening");
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[allow(clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutting down");
}
