use ens_meta::{KeyError, MetaError};
use ens_resolve::{HandlerError, ResolveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("metadata error: {0}")]
    Meta(#[from] MetaError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("no store for {entity} in {partition}")]
    NoStore { entity: String, partition: String },

    #[error("store for {entity} holds a different record type")]
    StoreTypeMismatch { entity: String },
}

impl RuntimeError {
    /// Whether the failure happened while keying a backend result.
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::Key(_))
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
