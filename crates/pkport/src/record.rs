//! SemanticRecord: the loosely typed pku document a conversion reads from.

use serde_json::{Map, Value};

use crate::errors::RecordError;

/// Key holding per-format overrides in a pku document.
pub const FORMAT_OVERRIDES: &str = "Format Overrides";

/// The state of one source value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceValue<T> {
    /// Absent or `null`.
    Unspecified,
    /// Present, but not of the expected shape. Holds the raw text.
    Invalid(String),
    Valid(T),
}

impl<T> SourceValue<T> {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, SourceValue::Unspecified)
    }

    pub fn valid(self) -> Option<T> {
        match self {
            SourceValue::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_valid(&self) -> Option<&T> {
        match self {
            SourceValue::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SourceValue<U> {
        match self {
            SourceValue::Unspecified => SourceValue::Unspecified,
            SourceValue::Invalid(raw) => SourceValue::Invalid(raw),
            SourceValue::Valid(v) => SourceValue::Valid(f(v)),
        }
    }
}

impl<T> From<Option<T>> for SourceValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(SourceValue::Unspecified, SourceValue::Valid)
    }
}

/// A pku document. Values are addressed by key paths such as
/// `["Game Info", "TID"]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticRecord {
    root: Map<String, Value>,
}

impl SemanticRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(RecordError::NotAnObject),
        }
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// The value at `path`. `null` reads as absent.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut map = &self.root;
        for key in parents {
            map = map.get(*key)?.as_object()?;
        }
        map.get(*last).filter(|v| !v.is_null())
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    pub fn int(&self, path: &[&str]) -> SourceValue<i128> {
        self.get(path).map_or(SourceValue::Unspecified, int_value)
    }

    pub fn string(&self, path: &[&str]) -> SourceValue<String> {
        self.get(path).map_or(SourceValue::Unspecified, string_value)
    }

    pub fn boolean(&self, path: &[&str]) -> SourceValue<bool> {
        match self.get(path) {
            None => SourceValue::Unspecified,
            Some(Value::Bool(b)) => SourceValue::Valid(*b),
            Some(other) => SourceValue::Invalid(raw(other)),
        }
    }

    /// A list of strings. A lone string reads as a one-element list; non-string
    /// entries make the whole value invalid.
    pub fn strings(&self, path: &[&str]) -> SourceValue<Vec<String>> {
        match self.get(path) {
            None => SourceValue::Unspecified,
            Some(Value::String(s)) => SourceValue::Valid(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map_or_else(
                    || SourceValue::Invalid(raw(&Value::Array(items.clone()))),
                    SourceValue::Valid,
                ),
            Some(other) => SourceValue::Invalid(raw(other)),
        }
    }

    /// The array at `path`, or an empty slice.
    pub fn array(&self, path: &[&str]) -> &[Value] {
        self.get(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sets the value at `path`, creating intermediate objects as needed.
    pub fn set(&mut self, path: &[&str], value: impl Into<Value>) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };

        let mut map = &mut self.root;
        for key in parents {
            let entry = map
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(next) = entry else {
                return;
            };
            map = next;
        }
        map.insert(last.to_string(), value.into());
    }

    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut map = &mut self.root;
        for key in parents {
            map = map.get_mut(*key)?.as_object_mut()?;
        }
        map.remove(*last)
    }

    /// A copy with `"Format Overrides"."<format>"` merged over the record and
    /// the overrides key dropped. Objects merge key-wise; anything else
    /// replaces the original value.
    pub fn with_format_override(&self, format: &str) -> SemanticRecord {
        let mut root = self.root.clone();
        let overrides = root.remove(FORMAT_OVERRIDES);

        if let Some(Value::Object(mut overrides)) = overrides {
            if let Some(Value::Object(patch)) = overrides.remove(format) {
                merge_into(&mut root, patch);
            }
        }

        SemanticRecord { root }
    }
}

fn merge_into(base: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(inner)), Value::Object(patch)) => merge_into(inner, patch),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Reads an integer. Integral floats are accepted; anything else is invalid.
pub fn int_value(value: &Value) -> SourceValue<i128> {
    match value {
        Value::Null => SourceValue::Unspecified,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SourceValue::Valid(i128::from(i))
            } else if let Some(u) = n.as_u64() {
                SourceValue::Valid(i128::from(u))
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => SourceValue::Valid(f as i128),
                    _ => SourceValue::Invalid(n.to_string()),
                }
            }
        }
        other => SourceValue::Invalid(raw(other)),
    }
}

pub fn string_value(value: &Value) -> SourceValue<String> {
    match value {
        Value::Null => SourceValue::Unspecified,
        Value::String(s) => SourceValue::Valid(s.clone()),
        other => SourceValue::Invalid(raw(other)),
    }
}

/// Text shown in alerts for a rejected value.
fn raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SemanticRecord {
        SemanticRecord::from_value(json!({
            "Species": "Bulbasaur",
            "Level": 5.0,
            "Friendship": "high",
            "Nature": null,
            "Game Info": { "TID": 12345, "OT": "ASH" },
            "IVs": { "Sp. Attack": 31 },
            "Ribbons": ["Champion", "Effort"],
            "Markings": ["Blue Circle", 3],
        }))
        .unwrap()
    }

    #[test]
    fn test_typed_reads() {
        let r = record();
        assert_eq!(r.int(&["Game Info", "TID"]), SourceValue::Valid(12345));
        assert_eq!(r.int(&["Level"]), SourceValue::Valid(5));
        assert_eq!(r.int(&["Friendship"]), SourceValue::Invalid("high".into()));
        assert_eq!(r.string(&["Nature"]), SourceValue::Unspecified);
        assert_eq!(r.int(&["Game Info", "SID"]), SourceValue::Unspecified);
        assert_eq!(r.int(&["IVs", "Sp. Attack"]), SourceValue::Valid(31));
        assert_eq!(r.string(&["Species", "Deeper"]), SourceValue::Unspecified);
    }

    #[test]
    fn test_string_lists() {
        let r = record();
        assert_eq!(
            r.strings(&["Ribbons"]),
            SourceValue::Valid(vec!["Champion".into(), "Effort".into()])
        );
        assert!(matches!(r.strings(&["Markings"]), SourceValue::Invalid(_)));
        assert_eq!(
            r.strings(&["Species"]),
            SourceValue::Valid(vec!["Bulbasaur".into()])
        );
    }

    #[test]
    fn test_set_creates_parents() {
        let mut r = SemanticRecord::new();
        r.set(&["Catch Info", "Met Level"], 5);
        r.set(&["Catch Info", "Ball"], "Poké Ball");
        assert_eq!(r.int(&["Catch Info", "Met Level"]), SourceValue::Valid(5));
        assert_eq!(
            r.into_value(),
            json!({ "Catch Info": { "Met Level": 5, "Ball": "Poké Ball" } })
        );
    }

    #[test]
    fn test_format_override_deep_merges() {
        let r = SemanticRecord::from_value(json!({
            "Nickname": "Bulby",
            "Game Info": { "TID": 1, "OT": "RED" },
            "Format Overrides": {
                "pk3": { "Nickname": "BULBY", "Game Info": { "OT": "ROJO" } },
                "Showdown": { "Nickname": "Leafy" }
            }
        }))
        .unwrap();

        let merged = r.with_format_override("pk3");
        assert_eq!(
            merged.into_value(),
            json!({ "Nickname": "BULBY", "Game Info": { "TID": 1, "OT": "ROJO" } })
        );

        let untouched = r.with_format_override("pk4");
        assert!(!untouched.contains(&[FORMAT_OVERRIDES]));
        assert_eq!(untouched.string(&["Nickname"]), SourceValue::Valid("Bulby".into()));
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            SemanticRecord::from_json("[1, 2]"),
            Err(RecordError::NotAnObject)
        ));
        assert!(matches!(
            SemanticRecord::from_json("{"),
            Err(RecordError::Json(_))
        ));
    }
}
