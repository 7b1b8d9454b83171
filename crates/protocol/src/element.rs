//! Element-reference rewriting for the in-page atom transport.
//!
//! Script arguments may carry element handles in either wire form: the
//! legacy `{"ELEMENT": id}` or the W3C `{"element-6066-11e4-a52e-4f735466cecf":
//! id}`. The atoms only understand the legacy form, so arguments are
//! rewritten recursively before submission. Everything that is not an
//! element reference passes through untouched.

use serde_json::Value;

/// Legacy element-reference key, also the atoms' native representation.
pub const ELEMENT_KEY: &str = "ELEMENT";

/// W3C element-reference key.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Rewrites element references in `args` into the atom representation.
pub fn normalize_args_for_atoms(args: Value) -> Value {
    match args {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(normalize_args_for_atoms).collect())
        }
        Value::Object(map) => {
            if let Some(id) = element_id(&map) {
                let mut element = serde_json::Map::with_capacity(1);
                element.insert(ELEMENT_KEY.to_owned(), id);
                return Value::Object(element);
            }
            Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, normalize_args_for_atoms(value)))
                    .collect(),
            )
        }
        other => other,
    }
}

fn element_id(map: &serde_json::Map<String, Value>) -> Option<Value> {
    map.get(W3C_ELEMENT_KEY)
        .or_else(|| map.get(ELEMENT_KEY))
        .cloned()
}
