//! Style snapshots: the animatable property values of one visual state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property name -> value (opacity, x, y, scale, ...).
///
/// Ordered so frames serialize deterministically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSnapshot(BTreeMap<String, f32>);

impl StyleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, property: &str, value: f32) -> Self {
        self.0.insert(property.to_string(), value);
        self
    }

    pub fn set(&mut self, property: &str, value: f32) {
        self.0.insert(property.to_string(), value);
    }

    pub fn get(&self, property: &str) -> Option<f32> {
        self.0.get(property).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First property present in exactly one of the two snapshots.
    pub fn first_unpaired<'a>(&'a self, other: &'a StyleSnapshot) -> Option<&'a str> {
        self.properties()
            .find(|p| !other.0.contains_key(*p))
            .or_else(|| other.properties().find(|p| !self.0.contains_key(*p)))
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for StyleSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaired_property_is_reported_from_either_side() {
        let a = StyleSnapshot::new().with("opacity", 0.0).with("y", 50.0);
        let b = StyleSnapshot::new().with("opacity", 1.0);
        assert_eq!(a.first_unpaired(&b), Some("y"));
        assert_eq!(b.first_unpaired(&a), Some("y"));
        assert_eq!(a.first_unpaired(&a.clone()), None);
    }

    #[test]
    fn serializes_as_plain_object() {
        let s = StyleSnapshot::new().with("y", 0.0).with("opacity", 1.0);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"opacity":1.0,"y":0.0}"#);
    }
}
