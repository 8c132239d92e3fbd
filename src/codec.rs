//! JSON wire codec for rule-group trees.
//!
//! The wire shape is `{"condition": "AND"|"OR", "rules": [...]}` where each
//! element of `rules` is either a nested group (marked by a `condition` key)
//! or a leaf rule (marked by an `id` key). Elements matching neither shape
//! are tolerated and dropped.

use serde_json::{json, Map, Value as Json};
use tracing::debug;

use crate::ast::{GroupMode, Rule, RuleGroup, RuleId, RuleValue};
use crate::error::ParseError;
use crate::value::{coerce, ValueType};

const RULE_KEYS: [&str; 5] = ["id", "field", "type", "operator", "value"];

/// Decode a JSON document into a rule-group tree.
pub fn deserialize(input: &str) -> Result<RuleGroup, ParseError> {
    let document: Json = serde_json::from_str(input).map_err(|_| ParseError::InvalidDocument)?;
    from_value(&document)
}

/// Decode an already-parsed JSON document into a rule-group tree.
pub fn from_value(document: &Json) -> Result<RuleGroup, ParseError> {
    if !document.is_object() && !document.is_array() {
        return Err(ParseError::InvalidDocument);
    }
    let group = deserialize_group(document)?;
    debug!(rules = group.rules().len(), groups = group.rule_groups().len(), "deserialized rule group");
    Ok(group)
}

fn deserialize_group(decoded: &Json) -> Result<RuleGroup, ParseError> {
    let condition = decoded.get("condition").ok_or(ParseError::MissingCondition)?;
    let mode = match condition.as_str() {
        Some("AND") => GroupMode::And,
        Some("OR") => GroupMode::Or,
        _ => return Err(ParseError::InvalidCondition(condition.clone())),
    };

    let mut group = RuleGroup::new(mode);
    let members = decoded.get("rules").and_then(Json::as_array).map(Vec::as_slice).unwrap_or_default();
    for member in members {
        let Some(shape) = member.as_object() else { continue };
        if shape.contains_key("condition") {
            group = group.add_rule_group(deserialize_group(member)?);
        } else if shape.contains_key("id") {
            group = group.add_rule(deserialize_rule(shape)?);
        }
    }
    Ok(group)
}

fn deserialize_rule(decoded: &Map<String, Json>) -> Result<Rule, ParseError> {
    // a key present with a null value still counts as given
    if RULE_KEYS.iter().any(|key| !decoded.contains_key(*key)) {
        return Err(ParseError::MissingRuleKeys { keys_given: decoded.keys().cloned().collect() });
    }

    let value_type = ValueType::from_name(&string_of(&decoded["type"]));
    let value = match &decoded["value"] {
        Json::Array(elements) => {
            RuleValue::Many(elements.iter().map(|element| coerce(&value_type, element)).collect::<Result<_, _>>()?)
        }
        scalar => RuleValue::Single(coerce(&value_type, scalar)?),
    };

    Ok(Rule {
        id: rule_id(&decoded["id"]),
        field: string_of(&decoded["field"]),
        value_type,
        operator: string_of(&decoded["operator"]),
        value,
    })
}

fn rule_id(raw: &Json) -> RuleId {
    match raw {
        Json::String(s) => RuleId::String(s.clone()),
        Json::Number(n) => RuleId::Number(n.clone()),
        other => RuleId::String(other.to_string()),
    }
}

fn string_of(raw: &Json) -> String {
    match raw {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a rule-group tree to JSON text.
pub fn serialize(group: &RuleGroup) -> String {
    to_json(group).to_string()
}

/// Render a rule-group tree to a JSON value. Child groups are emitted before
/// rules, each in insertion order, so output is stable.
pub fn to_json(group: &RuleGroup) -> Json {
    let mut members = Vec::with_capacity(group.rule_groups().len() + group.rules().len());
    members.extend(group.rule_groups().iter().map(to_json));
    members.extend(group.rules().iter().map(rule_to_json));
    json!({ "condition": group.mode().as_str(), "rules": members })
}

fn rule_to_json(rule: &Rule) -> Json {
    json!({
        "id": id_to_json(&rule.id),
        "field": rule.field,
        "type": rule.value_type.name(),
        "operator": rule.operator,
        "value": value_to_json(&rule.value),
    })
}

fn id_to_json(id: &RuleId) -> Json {
    match id {
        RuleId::String(s) => Json::String(s.clone()),
        RuleId::Number(n) => Json::Number(n.clone()),
    }
}

fn value_to_json(value: &RuleValue) -> Json {
    match value {
        RuleValue::Single(scalar) => scalar.to_json(),
        RuleValue::Many(scalars) => Json::Array(scalars.iter().map(|scalar| scalar.to_json()).collect()),
    }
}
