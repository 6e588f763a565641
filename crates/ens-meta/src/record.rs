use ens_types::Scalar;
use serde_json::Value;

/// Read access to the fields of a record.
///
/// This is the only thing the engine needs to know about a record type:
/// identity fields and comparer fields are looked up by name and surfaced as
/// [`Scalar`]s. An absent field and a `null` field both return `None`.
pub trait Record {
    fn field(&self, name: &str) -> Option<Scalar>;
}

/// JSON objects expose their top-level members.
///
/// Names starting with `/` are treated as JSON pointers, so nested members
/// can be used as identity or sort fields.
impl Record for Value {
    fn field(&self, name: &str) -> Option<Scalar> {
        let value = if name.starts_with('/') {
            self.pointer(name)?
        } else {
            self.as_object()?.get(name)?
        };
        Scalar::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_fields() {
        let v = json!({"id": 4, "name": "four", "gone": null});
        assert_eq!(v.field("id"), Some(Scalar::Integer(4)));
        assert_eq!(v.field("name"), Some(Scalar::Text("four".into())));
        assert_eq!(v.field("gone"), None);
        assert_eq!(v.field("missing"), None);
    }

    #[test]
    fn pointer_fields() {
        let v = json!({"meta": {"code": "x1"}});
        assert_eq!(v.field("/meta/code"), Some(Scalar::Text("x1".into())));
    }

    #[test]
    fn non_objects_have_no_fields() {
        assert_eq!(json!([1, 2]).field("0"), None);
        assert_eq!(json!("plain").field("id"), None);
    }
}
