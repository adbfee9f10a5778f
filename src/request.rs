// src/request.rs
//
// Request data accumulated by the harness and the request the handler sees.

use log::debug;
use serde_json::{Map, Value};

pub const PARAMS: &str = "params";
pub const BODY: &str = "body";
pub const USER: &str = "user";

/// Shallow-merge the keys of `data` into `target`, overwriting on collision.
/// `null` is a no-op and any other non-object contributes nothing.
pub fn merge_into(target: &mut Map<String, Value>, data: Value) {
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                target.insert(key, value);
            }
        }
        Value::Null => {}
        other => debug!("Ignoring non-object merge data: {}", other),
    }
}

/// The synthetic request built up through the harness' chained calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingRequest {
    fields: Map<String, Value>,
}

impl PendingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `data` into the top level.
    pub fn merge(&mut self, data: Value) {
        merge_into(&mut self.fields, data);
    }

    /// Merge `data` into the sub-mapping stored under `key`.
    pub fn merge_section(&mut self, key: &str, data: Value) {
        merge_into(self.section_mut(key), data);
    }

    /// Overwrite whatever is stored under `key`.
    pub fn replace(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// Sub-mapping under `key`, created empty if missing or not an object.
    pub fn section_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        let slot = self
            .fields
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            debug!("Replacing non-object '{}' with an empty mapping", key);
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just set to an object"),
        }
    }

    pub fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.fields.get(key).and_then(Value::as_object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Copy of a section, empty when it was never configured.
    pub fn section_or_empty(&self, key: &str) -> Map<String, Value> {
        self.section(key).cloned().unwrap_or_default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The request handed to the handler under test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    params: Map<String, Value>,
    body: Map<String, Value>,
    extensions: Map<String, Value>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_params(&mut self, params: Map<String, Value>) {
        self.params = params;
    }

    pub fn set_body(&mut self, body: Map<String, Value>) {
        self.body = body;
    }

    /// Copy every top-level field of `fields` onto the request.
    /// `params` and `body` entries that are objects replace the current ones.
    pub fn extend(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            match value {
                Value::Object(map) if key == PARAMS => self.params = map,
                Value::Object(map) if key == BODY => self.body = map,
                value => {
                    self.extensions.insert(key, value);
                }
            }
        }
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Authenticated user data, if any was configured.
    pub fn user(&self) -> Option<&Map<String, Value>> {
        self.extensions.get(USER).and_then(Value::as_object)
    }

    pub fn user_field(&self, key: &str) -> Option<&Value> {
        self.user().and_then(|user| user.get(key))
    }

    /// Any other top-level field supplied through `req(...)` or `auth(...)`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            PARAMS | BODY => None,
            _ => self.extensions.get(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_later_values_win() {
        let mut pending = PendingRequest::new();
        pending.merge(json!({"a": 1, "b": 2}));
        pending.merge(json!({"b": 3, "c": 4}));

        assert_eq!(pending.get("a"), Some(&json!(1)));
        assert_eq!(pending.get("b"), Some(&json!(3)));
        assert_eq!(pending.get("c"), Some(&json!(4)));
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut pending = PendingRequest::new();
        pending.merge(json!({"nested": {"x": 1, "y": 2}}));
        pending.merge(json!({"nested": {"x": 9}}));

        assert_eq!(pending.get("nested"), Some(&json!({"x": 9})));
    }

    #[test]
    fn test_merge_ignores_non_objects() {
        let mut pending = PendingRequest::new();
        pending.merge(Value::Null);
        pending.merge(json!("text"));
        pending.merge(json!([1, 2]));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_sections_are_independent() {
        let mut pending = PendingRequest::new();
        pending.merge_section(PARAMS, json!({"id": 1}));
        pending.merge_section(BODY, json!({"id": 2}));
        pending.merge(json!({"id": 3}));

        assert_eq!(pending.section(PARAMS).unwrap().get("id"), Some(&json!(1)));
        assert_eq!(pending.section(BODY).unwrap().get("id"), Some(&json!(2)));
        assert_eq!(pending.get("id"), Some(&json!(3)));
    }

    #[test]
    fn test_section_merge_accumulates() {
        let mut pending = PendingRequest::new();
        pending.merge_section(PARAMS, json!({"a": 1}));
        pending.merge_section(PARAMS, json!({"b": 2, "a": 5}));

        assert_eq!(
            Value::Object(pending.section_or_empty(PARAMS)),
            json!({"a": 5, "b": 2})
        );
    }

    #[test]
    fn test_section_mut_replaces_non_object() {
        let mut pending = PendingRequest::new();
        pending.merge(json!({"params": "oops"}));
        pending.merge_section(PARAMS, json!({"a": 1}));
        assert_eq!(pending.get(PARAMS), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_section_or_empty_when_missing() {
        let pending = PendingRequest::new();
        assert!(pending.section_or_empty(BODY).is_empty());
    }

    #[test]
    fn test_request_extend_routes_sections() {
        let mut req = Request::new();
        let fields = json!({
            "params": {"id": 7},
            "body": {"name": "x"},
            "user": {"role": "admin"},
            "locale": "en"
        });
        req.extend(fields.as_object().unwrap().clone());

        assert_eq!(req.param("id"), Some(&json!(7)));
        assert_eq!(req.body_field("name"), Some(&json!("x")));
        assert_eq!(req.user_field("role"), Some(&json!("admin")));
        assert_eq!(req.field("locale"), Some(&json!("en")));
        assert_eq!(req.field("params"), None);
    }

    #[test]
    fn test_request_user_absent() {
        let req = Request::new();
        assert!(req.user().is_none());
        assert!(req.params().is_empty());
        assert!(req.body().is_empty());
    }
}
