use std::sync::Arc;

use compclub_backend::error::AppError;
use compclub_backend::mail::LogMailer;
use compclub_backend::{serve, AppState};
use compclub_config::get_config;
use compclub_database::{get_database_connection, PgStore};
use compclub_telemetry::setup_telemetry;

// RUST_LOG=tower_http::trace=TRACE cargo run --bin server

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_telemetry()?;
    let config = get_config()?;

    let pool = get_database_connection(&config.database_url)?;
    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        mailer: Arc::new(LogMailer),
        mail: config.mail,
    };

    serve(config.listen_address, state).await
}
