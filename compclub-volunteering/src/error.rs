use core::fmt::{self, Display};

use thiserror::Error;

/// Input that was well formed enough to reach us but cannot be accepted.
/// The message is meant to be shown to whoever submitted it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Volunteer,
    Event,
    Workshop,
}

impl Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Volunteer => "volunteer",
            Self::Event => "event",
            Self::Workshop => "workshop",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to deliver mail: {0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} does not exist")]
    NotFound { entity: Entity, id: i32 },
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub const fn not_found(entity: Entity, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
