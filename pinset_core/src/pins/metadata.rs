use minicbor::{Decode, Encode};
use std::collections::BTreeMap;

/// A single metadata value attached to a pin.
///
/// The pipeline never looks inside; stores persist it as CBOR.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MetaValue {
    #[n(0)]
    Null,
    #[n(1)]
    Bool(#[n(0)] bool),
    #[n(2)]
    Int(#[n(0)] i64),
    #[n(3)]
    Text(#[n(0)] String),
    #[n(4)]
    List(#[n(0)] Vec<MetaValue>),
    #[n(5)]
    Map(#[n(0)] BTreeMap<String, MetaValue>),
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(value: Vec<T>) -> Self {
        MetaValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Caller-supplied metadata stored alongside a pin record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct PinMetadata {
    #[n(0)]
    entries: BTreeMap<String, MetaValue>,
}

impl PinMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for PinMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_cbor_roundtrip_nested() {
        let mut inner = BTreeMap::new();
        inner.insert("depth".to_string(), MetaValue::Int(-3));
        let meta = PinMetadata::new()
            .with("name", "backup")
            .with("tags", vec!["a", "b"])
            .with("keep", true)
            .with("nested", MetaValue::Map(inner))
            .with("none", MetaValue::Null);

        let bytes = minicbor::to_vec(&meta).unwrap();
        let decoded: PinMetadata = minicbor::decode(&bytes).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn test_metadata_from_iter() {
        let meta: PinMetadata = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        assert_eq!(meta.get("b"), Some(&MetaValue::Int(2)));
        assert_eq!(meta.iter().count(), 2);
        assert!(!meta.is_empty());
    }
}
