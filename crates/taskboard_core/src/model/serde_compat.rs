//! Tolerant readers for list-shaped values in stored documents.
//!
//! The document store may return a list as a JSON array with `null` holes
//! (after an element was deleted by path) or as an object keyed by index or
//! generated key. Both shapes decode into an ordered `Vec`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) fn list_or_map<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => {
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|(left, _), (right, _)| compare_keys(left, right));
            entries.into_iter().map(|(_, item)| item).collect()
        }
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected list or keyed object, got `{other}`"
            )));
        }
    };

    items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
        .collect()
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Index keys sort numerically ("2" before "10"); generated keys sort lexically.
fn compare_keys(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

#[cfg(test)]
mod tests {
    use super::list_or_map;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "list_or_map")]
        items: Vec<u32>,
    }

    fn decode(value: serde_json::Value) -> Vec<u32> {
        serde_json::from_value::<Holder>(value).unwrap().items
    }

    #[test]
    fn reads_arrays_and_drops_holes() {
        assert_eq!(decode(json!({ "items": [1, null, 3] })), vec![1, 3]);
    }

    #[test]
    fn reads_index_keyed_objects_in_numeric_order() {
        let value = json!({ "items": { "10": 3, "2": 2, "0": 1 } });
        assert_eq!(decode(value), vec![1, 2, 3]);
    }

    #[test]
    fn missing_and_null_lists_are_empty() {
        assert!(decode(json!({})).is_empty());
        assert!(decode(json!({ "items": null })).is_empty());
    }

    #[test]
    fn rejects_scalar_list_values() {
        let err = serde_json::from_value::<Holder>(json!({ "items": 5 })).unwrap_err();
        assert!(err.to_string().contains("expected list"));
    }
}
