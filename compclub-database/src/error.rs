use compclub_volunteering::{Entity, ValidationError};
use diesel_async::pooled_connection::deadpool;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to create database pool {0}")]
    PoolBuild(#[from] deadpool::BuildError),
    #[error("Database pool failed {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("Database query failed {0}")]
    Database(#[from] diesel::result::Error),
    #[error("{entity} {id} does not exist")]
    NotFound { entity: Entity, id: i32 },
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
    #[error("Database contains unknown assignment status {0:?}")]
    InvalidStatus(String),
}

impl From<DatabaseError> for compclub_volunteering::Error {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => Self::not_found(entity, id),
            DatabaseError::UsernameTaken(_) => {
                ValidationError::field("username", error.to_string()).into()
            }
            error => Self::Store(Box::new(error)),
        }
    }
}
