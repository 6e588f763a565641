//! Key extraction: deriving a record's [`Identity`] from its descriptor.

use ens_types::{Identity, Keyed};

use crate::descriptor::EntityDescriptor;
use crate::error::KeyError;
use crate::record::Record;

/// Derive the identity of `record` under `descriptor`.
///
/// - one identity field: that field's value, uncoerced;
/// - several fields: every value string-coerced, joined with `_` in
///   declaration order.
///
/// A missing record, a missing or null identity field, and a descriptor
/// with no identity fields are all errors. Nothing is ever defaulted.
pub fn extract_identity<R>(descriptor: &EntityDescriptor, record: Option<&R>) -> Result<Identity, KeyError>
where
    R: Record + ?Sized,
{
    let entity = descriptor.name();
    let fields = descriptor.identity_fields();
    if fields.is_empty() {
        return Err(KeyError::NoIdentityFields(entity.to_owned()));
    }
    let record = record.ok_or_else(|| KeyError::MissingIdentity {
        entity: entity.to_owned(),
        field: None,
    })?;

    let missing = |field: &str| KeyError::MissingIdentity {
        entity: entity.to_owned(),
        field: Some(field.to_owned()),
    };

    if let [field] = fields {
        let value = record.field(field).ok_or_else(|| missing(field))?;
        let rendered = value.to_string();
        return Identity::from_scalar(value).ok_or_else(|| KeyError::UnsupportedIdentity {
            entity: entity.to_owned(),
            field: field.clone(),
            value: rendered,
        });
    }

    let parts = fields
        .iter()
        .map(|field| {
            record
                .field(field)
                .map(|v| v.to_string())
                .ok_or_else(|| missing(field))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Identity::composite(parts))
}

/// Pair a record with its identity.
pub fn keyed<R: Record>(descriptor: &EntityDescriptor, record: R) -> Result<Keyed<R>, KeyError> {
    let id = extract_identity(descriptor, Some(&record))?;
    Ok(Keyed { id, record })
}

/// Pair every record with its identity, failing on the first bad record.
pub fn keyed_all<R, I>(descriptor: &EntityDescriptor, records: I) -> Result<Vec<Keyed<R>>, KeyError>
where
    R: Record,
    I: IntoIterator<Item = R>,
{
    records
        .into_iter()
        .map(|record| keyed(descriptor, record))
        .collect()
}
