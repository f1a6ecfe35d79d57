//! Filter sanitization.

use std::collections::BTreeMap;

use crate::model::{FieldKind, FilterValue, Value};

/// Reduces a filter snapshot to the fields that constrain a query.
///
/// | Kind | Kept when |
/// |------|-----------|
/// | Text | non-blank; the value is trimmed |
/// | Select | non-empty |
/// | MultiSelect | at least one item |
/// | Boolean | a boolean, `false` included |
/// | Number | a finite number |
///
/// A boolean that is `Null` is dropped while `false` is kept, so "unset"
/// and "set to false" stay distinguishable.
pub fn sanitize(filter: &FilterValue) -> BTreeMap<String, Value> {
    filter
        .schema()
        .fields()
        .iter()
        .zip(filter.iter().map(|(_, value)| value))
        .filter_map(|(field, value)| {
            let kept = match field.kind {
                FieldKind::Text => match value {
                    Value::Text(s) if !s.trim().is_empty() => {
                        Some(Value::Text(s.trim().to_string()))
                    }
                    _ => None,
                },
                FieldKind::Select => match value {
                    Value::Text(s) if !s.is_empty() => Some(value.clone()),
                    _ => None,
                },
                FieldKind::MultiSelect => match value {
                    Value::List(items) if !items.is_empty() => Some(value.clone()),
                    _ => None,
                },
                FieldKind::Boolean => match value {
                    Value::Bool(_) => Some(value.clone()),
                    _ => None,
                },
                FieldKind::Number => match value {
                    Value::Number(n) if n.is_finite() => Some(value.clone()),
                    _ => None,
                },
            };
            kept.map(|v| (field.name.clone(), v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{FieldDescriptor, FieldSchema, PartialFilter};

    fn schema() -> Arc<FieldSchema> {
        Arc::new(
            FieldSchema::new([
                FieldDescriptor::text("name", "Name"),
                FieldDescriptor::multi_select("type", "Type", ["Equity", "BankAccount"]),
                FieldDescriptor::boolean("isPrivate", "Private").with_default(Value::Null),
            ])
            .unwrap(),
        )
    }

    fn filter(entries: &[(&str, Value)]) -> FilterValue {
        let initial: PartialFilter = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        FilterValue::resolve(schema(), &initial).unwrap()
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let value = filter(&[
            ("name", Value::from("  ")),
            ("type", Value::List(vec![])),
            ("isPrivate", Value::Null),
        ]);
        assert!(sanitize(&value).is_empty());
    }

    #[test]
    fn test_false_is_kept() {
        let value = filter(&[
            ("name", Value::from("Ac")),
            ("type", Value::from(vec!["Equity"])),
            ("isPrivate", Value::from(false)),
        ]);
        let sanitized = sanitize(&value);
        assert_eq!(sanitized.len(), 3);
        assert_eq!(sanitized.get("name"), Some(&Value::from("Ac")));
        assert_eq!(sanitized.get("type"), Some(&Value::from(vec!["Equity"])));
        assert_eq!(sanitized.get("isPrivate"), Some(&Value::from(false)));
    }

    #[test]
    fn test_text_is_trimmed() {
        let value = filter(&[("name", Value::from("  Demo "))]);
        assert_eq!(sanitize(&value).get("name"), Some(&Value::from("Demo")));
    }

    #[test]
    fn test_select_and_number() {
        let schema = Arc::new(
            FieldSchema::new([
                FieldDescriptor::select("currency", "Currency", ["USD", "EUR"]),
                FieldDescriptor::number("minPrice", "Min price"),
            ])
            .unwrap(),
        );
        let empty = FilterValue::defaults(Arc::clone(&schema));
        assert!(sanitize(&empty).is_empty());

        let set = empty
            .with("currency", Value::from("EUR"))
            .and_then(|v| v.with("minPrice", Value::from(0)))
            .unwrap();
        let sanitized = sanitize(&set);
        assert_eq!(sanitized.get("currency"), Some(&Value::from("EUR")));
        assert_eq!(sanitized.get("minPrice"), Some(&Value::Number(0.0)));
    }
}
