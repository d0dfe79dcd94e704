//! JSON rendering of results
//!
//! Locations render as `index [line:column]`. In the shallow form children and
//! properties are listed by kind only; the recursive form nests them fully.

use crate::astra::parsing::results::{ParseResult, Slot};
use serde_json::{json, Map, Value};

pub fn to_value(result: &ParseResult, recursive: bool) -> Value {
    let mut object = Map::new();
    object.insert("kind".into(), json!(result.kind.label()));
    object.insert("isSuccess".into(), json!(result.is_success()));
    object.insert("isError".into(), json!(result.is_error()));
    object.insert("name".into(), json!(result.name));
    object.insert("types".into(), json!(result.types));
    object.insert("start".into(), json!(result.start.to_string()));
    object.insert("end".into(), json!(result.end.to_string()));
    if let Some(parent) = &result.parent {
        object.insert("parent".into(), json!(parent));
    }
    if let Some(message) = &result.message {
        object.insert("message".into(), json!(message));
    }
    if let Some(found) = result.found() {
        object.insert("found".into(), json!(found));
    }
    if let Some(expected) = result.expected() {
        object.insert("expected".into(), json!(expected));
    }

    let nested = |child: &ParseResult| {
        if recursive {
            to_value(child, true)
        } else {
            json!(child.kind.label())
        }
    };

    let children: Vec<Value> = result.children().map(&nested).collect();
    if !children.is_empty() {
        object.insert("children".into(), Value::Array(children));
    }

    let mut properties = Map::new();
    for slot in result.elements.slots() {
        if let Slot::Named(key, value) = slot {
            properties.insert(key.clone(), nested(value));
        }
    }
    if !properties.is_empty() {
        object.insert("properties".into(), Value::Object(properties));
    }

    Value::Object(object)
}

/// Pretty-printed JSON
pub fn to_json(result: &ParseResult, recursive: bool) -> String {
    serde_json::to_string_pretty(&to_value(result, recursive)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astra::parsing::grammar::Grammar;
    use crate::astra::tokens::NamedEntry;

    #[test]
    fn shallow_form_lists_kinds() {
        let result = Grammar::standard().parse::<NamedEntry>("key: value").unwrap();
        let value = to_value(&result, false);
        assert_eq!(value["kind"], "Match");
        assert_eq!(value["start"], "0 [0:0]");
        assert_eq!(value["end"], "10 [0:10]");
        assert_eq!(value["properties"]["key"], "Match");
        assert!(value.get("children").is_none());
    }

    #[test]
    fn recursive_form_nests_results() {
        let result = Grammar::standard().parse::<NamedEntry>("key: value").unwrap();
        let value = to_value(&result, true);
        assert_eq!(value["properties"]["value"]["name"], "text");
        assert_eq!(value["properties"]["value"]["parent"], "value");
    }

    #[test]
    fn display_prefixes_the_kind() {
        let result = Grammar::standard().parse::<NamedEntry>("key value").unwrap();
        assert!(result.to_string().starts_with("Error: {"));
    }
}
