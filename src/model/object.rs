//! Read/augment wrapper over the JSON shape of Activity Streams documents.

use std::borrow::Cow;
use std::fmt::Display;

use serde_json::{Map, Value};

/// A JSON document viewed as an Activity Streams object.
///
/// Reads are typed accessors tolerant of the `@`-prefixed JSON-LD keyword
/// forms; writes are functional and produce an owned copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Object<'a>(Cow<'a, Value>);

impl Object<'_> {
    pub(crate) fn id(&self) -> Option<&str> {
        self.get_str("id").or_else(|| self.get_str("@id"))
    }
    pub(crate) fn type_is(&self, ty: &str) -> bool {
        for prop in ["type", "@type"] {
            match self.0.get(prop) {
                Some(Value::String(object_type)) => return object_type == ty,
                Some(Value::Array(type_array)) => {
                    return type_array.iter().any(|v| v.as_str() == Some(ty));
                }
                _ => {}
            }
        }
        false
    }
    pub(crate) fn get_first_type(&self) -> Option<String> {
        for prop in ["type", "@type"] {
            match self.0.get(prop) {
                Some(Value::String(object_type)) => return Some(object_type.to_owned()),
                Some(Value::Array(type_array)) => {
                    return type_array
                        .iter()
                        .find_map(|v| v.as_str().map(|s| s.to_owned()));
                }
                _ => {}
            }
        }
        None
    }
    pub(crate) fn has_props(&self, props: &[&str]) -> bool {
        self.missing_props(props).is_empty()
    }
    pub(crate) fn missing_props(&self, props: &[&str]) -> Vec<String> {
        match self.0.as_object() {
            Some(map) => props
                .iter()
                .filter(|&&prop| !map.contains_key(prop))
                .map(|&prop| prop.to_string())
                .collect(),
            None => props.iter().map(|&prop| prop.to_string()).collect(),
        }
    }
    pub(crate) fn get_str(&self, prop: &str) -> Option<&str> {
        self.0.get(prop).and_then(Value::as_str)
    }
    pub(crate) fn get_value(&self, prop: &str) -> Option<Value> {
        self.0.get(prop).cloned()
    }
    /// A property that may be a single string or an array of strings.
    pub(crate) fn get_str_array(&self, prop: &str) -> Option<Vec<&str>> {
        if let Some(s) = self.get_str(prop) {
            return Some(vec![s]);
        }
        if let Some(Value::Array(array)) = self.0.get(prop) {
            if array.iter().all(Value::is_string) {
                return Some(array.iter().filter_map(Value::as_str).collect());
            }
        }
        None
    }
    pub(crate) fn get_node_object(&self, prop: &str) -> Option<Object<'_>> {
        match self.0.get(prop) {
            Some(v) if v.is_object() => Some(v.into()),
            _ => None,
        }
    }
    /// A node reference may be a bare IRI, an embedded object with an `id`,
    /// or an array of either; the first IRI wins.
    pub(crate) fn get_node_iri(&self, prop: &str) -> Option<&str> {
        match self.0.get(prop)? {
            Value::String(iri) => Some(iri),
            Value::Object(map) => map.get("id").and_then(Value::as_str),
            Value::Array(array) => array.iter().find_map(Value::as_str),
            _ => None,
        }
    }
    pub(crate) fn into_owned(self) -> Object<'static> {
        Object(Cow::Owned(self.0.into_owned()))
    }
    pub(crate) fn to_value(&self) -> Value {
        self.0.clone().into_owned()
    }
    pub(crate) fn strip_context(self) -> Object<'static> {
        let mut obj = self.0.into_owned();
        if let Some(map) = obj.as_object_mut() {
            map.remove("@context");
        }
        Object(Cow::Owned(obj))
    }
    pub(crate) fn ensure_id(self, iri: impl Into<String>) -> Object<'static> {
        let mut obj = self.0.into_owned();
        if let Some(map) = obj.as_object_mut() {
            map.entry("id").or_insert_with(|| Value::String(iri.into()));
        }
        Object(Cow::Owned(obj))
    }
    pub(crate) fn replace(self, property: &str, value: Value) -> Object<'static> {
        let mut obj = self.0.into_owned();
        if let Some(map) = obj.as_object_mut() {
            map.insert(property.to_string(), value);
        }
        Object(Cow::Owned(obj))
    }
    pub(crate) fn augment(self, property: &str, value: Value) -> Object<'static> {
        let mut obj = self.0.into_owned();
        if let Some(map) = obj.as_object_mut() {
            map.entry(property).or_insert(value);
        }
        Object(Cow::Owned(obj))
    }
    pub(crate) fn as_map(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }
}

impl From<Value> for Object<'static> {
    fn from(value: Value) -> Self {
        if !value.is_object() {
            // Only JSON objects are valid here; upper layers validate, and
            // anything that slips through becomes an empty object.
            Object(Cow::Owned(Value::Object(Map::new())))
        } else {
            Object(Cow::Owned(value))
        }
    }
}

impl<'a> From<&'a Value> for Object<'a> {
    fn from(value: &'a Value) -> Self {
        if !value.is_object() {
            Object(Cow::Owned(Value::Object(Map::new())))
        } else {
            Object(Cow::Borrowed(value))
        }
    }
}

impl From<Object<'_>> for Value {
    fn from(value: Object) -> Self {
        value.0.into_owned()
    }
}

impl AsRef<Value> for Object<'_> {
    fn as_ref(&self) -> &Value {
        &self.0
    }
}

impl Display for Object<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Object;

    #[test]
    fn type_checks_accept_arrays_and_keywords() {
        let object = Object::from(json!({"@type": ["Person", "Actor"]}));
        assert!(object.type_is("Person"));
        assert!(object.type_is("Actor"));
        assert!(!object.type_is("Note"));
        assert_eq!(object.get_first_type().as_deref(), Some("Person"));
    }

    #[test]
    fn node_iri_forms() {
        let object = Object::from(json!({
            "actor": "https://example.com/users/alice",
            "object": {"id": "https://example.com/notes/1", "type": "Note"},
            "tag": ["https://example.com/tags/a", {"type": "Hashtag"}],
        }));
        assert_eq!(object.get_node_iri("actor"), Some("https://example.com/users/alice"));
        assert_eq!(object.get_node_iri("object"), Some("https://example.com/notes/1"));
        assert_eq!(object.get_node_iri("tag"), Some("https://example.com/tags/a"));
        assert_eq!(object.get_node_iri("target"), None);
    }

    #[test]
    fn ensure_id_keeps_existing() {
        let object = Object::from(json!({"id": "https://example.com/notes/1"}))
            .ensure_id("https://example.com/notes/2");
        assert_eq!(object.id(), Some("https://example.com/notes/1"));
    }

    #[test]
    fn missing_props_lists_absent_names() {
        let object = Object::from(json!({"type": "Like"}));
        assert_eq!(object.missing_props(&["type", "id", "actor"]), vec!["id", "actor"]);
    }
}
