use ens_types::Operation;
use thiserror::Error;

/// Errors raised while invoking a resolved handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler does not provide this operation.
    #[error("{method} is not implemented by the handler for {entity}")]
    NotImplemented { entity: String, method: Operation },

    /// The handler answered with something that does not fit the contract.
    #[error("malformed {method} response for {entity}: {reason}")]
    Malformed {
        entity: String,
        method: Operation,
        reason: String,
    },

    /// The backend itself reported a failure.
    #[error("backend error for {entity}: {message}")]
    Backend { entity: String, message: String },
}

impl HandlerError {
    pub fn not_implemented(entity: &str, method: Operation) -> Self {
        Self::NotImplemented {
            entity: entity.to_owned(),
            method,
        }
    }

    pub fn malformed(entity: &str, method: Operation, reason: impl Into<String>) -> Self {
        Self::Malformed {
            entity: entity.to_owned(),
            method,
            reason: reason.into(),
        }
    }

    pub fn backend(entity: &str, message: impl Into<String>) -> Self {
        Self::Backend {
            entity: entity.to_owned(),
            message: message.into(),
        }
    }
}

/// Why a single source could not supply a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("scope '{scope}' has no handler for {entity}")]
    NotRegistered { scope: String, entity: String },

    #[error("scope '{scope}' is unavailable: {reason}")]
    Unavailable { scope: String, reason: String },
}

/// Every source in the chain failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no handler for {entity} after {} lookup(s){}", .attempts.len(), last_cause(.attempts))]
    ResolutionFailure {
        entity: String,
        attempts: Vec<LookupError>,
    },
}

impl ResolveError {
    pub fn entity(&self) -> &str {
        match self {
            Self::ResolutionFailure { entity, .. } => entity,
        }
    }
}

fn last_cause(attempts: &[LookupError]) -> String {
    attempts
        .last()
        .map(|e| format!("; last: {e}"))
        .unwrap_or_default()
}

pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_implemented_names_method_and_type() {
        let err = HandlerError::not_implemented("customer", Operation::LoadPage);
        assert_eq!(
            err.to_string(),
            "load_page is not implemented by the handler for customer"
        );
    }

    #[test]
    fn resolution_failure_mentions_last_cause() {
        let err = ResolveError::ResolutionFailure {
            entity: "order".into(),
            attempts: vec![
                LookupError::NotRegistered {
                    scope: "sales".into(),
                    entity: "order".into(),
                },
                LookupError::NotRegistered {
                    scope: "root".into(),
                    entity: "order".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "no handler for order after 2 lookup(s); last: scope 'root' has no handler for order"
        );
        assert_eq!(err.entity(), "order");
    }
}
