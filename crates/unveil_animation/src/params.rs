//! Animation parameter maps
//!
//! A [`ParamMap`] is an ordered map of property name to value, used for
//! preset defaults, per-call overrides and the from/to states handed to the
//! tween engine. Merging is shallow and the override wins per key.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single animation parameter value
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Plain number (pixels, seconds, unitless factors)
    Number(f32),
    /// Percentage of the element's own size (`"100%"`)
    Percent(f32),
    /// Identifier or free text (ease names, suffixes, shadows)
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ParamValue::Number(n) | ParamValue::Percent(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Linear interpolation between two values of the same unit
    ///
    /// Text values do not interpolate: the start value is held until the
    /// end, then the end value is taken.
    pub fn lerp(&self, other: &ParamValue, t: f32) -> ParamValue {
        match (self, other) {
            (ParamValue::Number(a), ParamValue::Number(b)) => ParamValue::Number(a + (b - a) * t),
            (ParamValue::Percent(a), ParamValue::Percent(b)) => {
                ParamValue::Percent(a + (b - a) * t)
            }
            _ if t >= 1.0 => other.clone(),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Percent(n) => write!(f, "{}%", n),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(n: f32) -> Self {
        ParamValue::Number(n)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n as f32)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Number(n as f32)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Number(n as f32)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::parse(s)
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::parse(&s)
    }
}

impl ParamValue {
    /// Parse a textual value: `"100%"` is a percentage, anything else is text
    pub fn parse(s: &str) -> Self {
        s.trim()
            .strip_suffix('%')
            .and_then(|n| n.trim().parse::<f32>().ok())
            .map(ParamValue::Percent)
            .unwrap_or_else(|| ParamValue::Text(s.to_string()))
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Number(n) => serializer.serialize_f32(*n),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Float(f64),
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Float(n) => ParamValue::Number(n as f32),
            Raw::Int(n) => ParamValue::Number(n as f32),
            Raw::Text(s) => ParamValue::parse(&s),
        })
    }
}

/// Ordered map of animation parameters
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(IndexMap<String, ParamValue>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(ParamValue::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow merge; keys present in `overrides` replace ours
    pub fn merged(&self, overrides: &ParamMap) -> ParamMap {
        let mut out = self.clone();
        for (key, value) in overrides.iter() {
            out.0.insert(key.to_string(), value.clone());
        }
        out
    }

    /// Interpolate every key present in both maps
    pub fn lerp(&self, other: &ParamMap, t: f32) -> ParamMap {
        let mut out = ParamMap::new();
        for (key, to) in other.iter() {
            let value = match self.get(key) {
                Some(from) => from.lerp(to, t),
                None => to.clone(),
            };
            out.0.insert(key.to_string(), value);
        }
        out
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParamMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_per_key() {
        let defaults = ParamMap::new()
            .with("y", 50.0)
            .with("duration", 1.2)
            .with("ease", "power3.out");
        let overrides = ParamMap::new().with("y", 30.0).with("delay", 0.5);

        let merged = defaults.merged(&overrides);
        assert_eq!(merged.number("y"), Some(30.0));
        assert_eq!(merged.number("duration"), Some(1.2));
        assert_eq!(merged.number("delay"), Some(0.5));
        assert_eq!(merged.text("ease"), Some("power3.out"));
        // Defaults untouched
        assert_eq!(defaults.number("y"), Some(50.0));
    }

    #[test]
    fn test_percent_parsing() {
        assert_eq!(ParamValue::from("100%"), ParamValue::Percent(100.0));
        assert_eq!(
            ParamValue::from("power2.out"),
            ParamValue::Text("power2.out".to_string())
        );
        assert_eq!(ParamValue::Percent(0.0).to_string(), "0%");
    }

    #[test]
    fn test_lerp_units() {
        let from = ParamMap::new().with("opacity", 0.0).with("y", "100%");
        let to = ParamMap::new().with("opacity", 1.0).with("y", "0%");
        let mid = from.lerp(&to, 0.5);
        assert_eq!(mid.number("opacity"), Some(0.5));
        assert_eq!(mid.get("y"), Some(&ParamValue::Percent(50.0)));
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            params: ParamMap,
        }
        let holder: Holder =
            toml::from_str("[params]\ny = 30\nduration = 0.8\nease = \"power2.out\"\n").unwrap();
        assert_eq!(holder.params.number("y"), Some(30.0));
        assert_eq!(holder.params.number("duration"), Some(0.8));
        assert_eq!(holder.params.text("ease"), Some("power2.out"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let map = ParamMap::new().with("opacity", 0.0).with("y", 50.0);
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["opacity", "y"]);
        assert_eq!(map.to_string(), "{opacity: 0, y: 50}");
    }
}
