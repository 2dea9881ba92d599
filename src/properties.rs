use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A single custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool` property.
    Bool(bool),
    /// `int` and `object` properties.
    I64(i64),
    /// `float` property.
    F32(f32),
    /// `string`, `file`, `color` and `class` properties.
    String(String),
}

impl PropertyValue {
    /// Reads an untyped value as the first kind it fits: bool, integer,
    /// float, then string. Anything else (null, arrays, objects) is `None`.
    pub(crate) fn infer(value: &JsonValue) -> Option<Self> {
        [
            PropertyKind::Bool,
            PropertyKind::Int,
            PropertyKind::Float,
            PropertyKind::Text,
        ]
        .into_iter()
        .find_map(|kind| kind.read(value))
    }
}

/// A declared property type, folded onto the variant it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyKind {
    Bool,
    Int,
    Float,
    Text,
}

impl PropertyKind {
    /// Kind for a type name written by the editor.
    pub(crate) fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Bool),
            "int" | "object" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" | "file" | "color" | "class" => Some(Self::Text),
            _ => None,
        }
    }

    /// `None` when `value` is not of this kind.
    pub(crate) fn read(self, value: &JsonValue) -> Option<PropertyValue> {
        match self {
            Self::Bool => value.as_bool().map(PropertyValue::Bool),
            Self::Int => value.as_i64().map(PropertyValue::I64),
            Self::Float => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
            Self::Text => value.as_str().map(|s| PropertyValue::String(s.to_owned())),
        }
    }
}

/// Free-form key/value map attached to maps, layers, tiles and objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    /// Empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        self.0.insert(name.into(), value)
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Whether a key is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `bool` lookup.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer lookup.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer lookup that fails when the stored value does not fit in `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// Float lookup.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// String lookup.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// One-directional merge: copies entries of `defaults` whose key is not
    /// already present. Existing entries are never overwritten.
    pub fn fill_missing(&mut self, defaults: &Properties) {
        for (name, value) in &defaults.0 {
            self.0
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_missing_keeps_existing_entries() {
        let mut own = Properties::new();
        own.insert("damage", PropertyValue::I64(1));

        let mut defaults = Properties::new();
        defaults.insert("damage", PropertyValue::I64(10));
        defaults.insert("solid", PropertyValue::Bool(true));

        own.fill_missing(&defaults);

        assert_eq!(own.get_i64("damage"), Some(1));
        assert_eq!(own.get_bool("solid"), Some(true));
        assert_eq!(own.len(), 2);
    }

    #[test]
    fn kinds_read_only_matching_values() {
        let kind = PropertyKind::from_type_name("object").unwrap();
        assert_eq!(kind.read(&JsonValue::from(7)), Some(PropertyValue::I64(7)));
        assert_eq!(kind.read(&JsonValue::from("7")), None);
        assert_eq!(PropertyKind::from_type_name("color"), Some(PropertyKind::Text));
        assert_eq!(PropertyKind::from_type_name("vector"), None);

        assert_eq!(PropertyValue::infer(&JsonValue::from(2.5)), Some(PropertyValue::F32(2.5)));
        assert_eq!(PropertyValue::infer(&JsonValue::Null), None);
    }

    #[test]
    fn typed_getters_reject_other_variants() {
        let mut props = Properties::new();
        props.insert("name", PropertyValue::String("door".into()));
        props.insert("big", PropertyValue::I64(5_000_000_000));

        assert_eq!(props.get_string("name"), Some("door"));
        assert_eq!(props.get_bool("name"), None);
        assert_eq!(props.get_i64("big"), Some(5_000_000_000));
        assert_eq!(props.get_i32("big"), None);
    }
}
