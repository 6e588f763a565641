use thiserror::Error;

/// Errors from descriptor registration and lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    /// The type was never registered. Fatal for that type.
    #[error("entity type not registered: {0}")]
    UnregisteredType(String),

    /// A different descriptor is already registered under this name.
    #[error("conflicting descriptor for entity type: {0}")]
    DescriptorConflict(String),

    /// The descriptor itself is unusable.
    #[error("invalid descriptor for {entity}: {reason}")]
    InvalidDescriptor { entity: String, reason: String },
}

/// Errors from key extraction.
///
/// Each one is fatal for the single record being keyed: the record must be
/// dropped, never stored under a guessed key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The record is absent, or one of its identity fields is absent or null.
    #[error("missing identity for {entity}{}", field_suffix(.field))]
    MissingIdentity {
        entity: String,
        field: Option<String>,
    },

    /// The descriptor declares no identity fields.
    #[error("entity type {0} declares no identity fields")]
    NoIdentityFields(String),

    /// A single identity field holds a value that cannot be a key.
    #[error("unsupported identity value for {entity}.{field}: {value}")]
    UnsupportedIdentity {
        entity: String,
        field: String,
        value: String,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_deref()
        .map(|f| format!(" (field `{f}`)"))
        .unwrap_or_default()
}

/// Result alias for metadata operations.
pub type MetaResult<T> = Result<T, MetaError>;
