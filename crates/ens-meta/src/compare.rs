use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::record::Record;

type CompareFn = Arc<dyn Fn(&dyn Record, &dyn Record) -> Ordering + Send + Sync>;

/// A named ordering over records of one entity type.
///
/// Comparers only feed read-side sorted views; the store's own `order` is
/// never re-sorted by them.
#[derive(Clone)]
pub struct Comparer {
    name: String,
    compare: CompareFn,
}

impl Comparer {
    pub fn new<F>(name: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&dyn Record, &dyn Record) -> Ordering + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            compare: Arc::new(compare),
        }
    }

    /// Ascending order of a single scalar field.
    ///
    /// Records missing the field sort after every record that has it.
    pub fn by_field(name: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(name, move |a, b| match (a.field(&field), b.field(&field)) {
            (Some(x), Some(y)) => x.compare(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    }

    /// The same ordering, descending.
    pub fn reversed(&self) -> Self {
        let inner = Arc::clone(&self.compare);
        Self {
            name: format!("{}:desc", self.name),
            compare: Arc::new(move |a, b| inner(a, b).reverse()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compare(&self, a: &dyn Record, b: &dyn Record) -> Ordering {
        (self.compare)(a, b)
    }
}

impl fmt::Debug for Comparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn by_field_orders_ascending() {
        let c = Comparer::by_field("by_age", "age");
        let young = json!({"age": 3});
        let old = json!({"age": 40});
        assert_eq!(c.compare(&young, &old), Ordering::Less);
        assert_eq!(c.compare(&old, &young), Ordering::Greater);
    }

    #[test]
    fn missing_field_sorts_last() {
        let c = Comparer::by_field("by_age", "age");
        assert_eq!(c.compare(&json!({"age": 1}), &json!({})), Ordering::Less);
        assert_eq!(c.compare(&json!({}), &json!({})), Ordering::Equal);
    }

    #[test]
    fn reversed_flips_order_and_name() {
        let c = Comparer::by_field("by_name", "name").reversed();
        assert_eq!(c.name(), "by_name:desc");
        assert_eq!(
            c.compare(&json!({"name": "a"}), &json!({"name": "b"})),
            Ordering::Greater
        );
    }
}
