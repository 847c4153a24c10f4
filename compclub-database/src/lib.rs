//! PostgreSQL persistence for CompClub volunteering, built on diesel-async.

pub mod error;
pub mod models;
pub mod queries;
pub mod schema;
pub mod store;

use diesel_async::pooled_connection::deadpool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
pub use error::DatabaseError;
pub use store::PgStore;

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub type Pool = deadpool::Pool<AsyncPgConnection>;

pub fn get_database_connection(database_url: &str) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}
