use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueType};

/// Logical combinator applied to all direct children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupMode {
    And,
    Or,
}

impl GroupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::And => "AND",
            GroupMode::Or => "OR",
        }
    }
}

/// Caller-supplied rule identifier, carried through uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleId {
    String(String),
    Number(serde_json::Number),
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self { RuleId::String(s.to_string()) }
}

impl From<String> for RuleId {
    fn from(s: String) -> Self { RuleId::String(s) }
}

impl From<i64> for RuleId {
    fn from(n: i64) -> Self { RuleId::Number(n.into()) }
}

impl From<i32> for RuleId {
    fn from(n: i32) -> Self { RuleId::Number(n.into()) }
}

/// A single field condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: RuleId,
    pub field: String,
    pub value_type: ValueType,
    pub operator: String,
    pub value: RuleValue,
}

impl Rule {
    pub fn new(
        id: impl Into<RuleId>,
        field: impl Into<String>,
        value_type: ValueType,
        operator: impl Into<String>,
        value: RuleValue,
    ) -> Self {
        Self { id: id.into(), field: field.into(), value_type, operator: operator.into(), value }
    }
}

/// A rule's coerced payload: one scalar, or an ordered sequence for
/// multi-value operators such as `between` and `in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleValue {
    Single(Value),
    Many(Vec<Value>),
}

/// Composite filter node: rules and nested groups combined under one mode.
///
/// Membership is set-like for translation purposes; insertion order is
/// preserved so serialized output stays stable. The mode is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleGroup {
    mode: GroupMode,
    rules: Vec<Rule>,
    groups: Vec<RuleGroup>,
}

impl RuleGroup {
    pub fn new(mode: GroupMode) -> Self {
        Self { mode, rules: Vec::new(), groups: Vec::new() }
    }

    pub fn mode(&self) -> GroupMode { self.mode }

    pub fn rules(&self) -> &[Rule] { &self.rules }

    pub fn rule_groups(&self) -> &[RuleGroup] { &self.groups }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() && self.groups.is_empty() }

    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Detach the first rule equal to `rule`. Absent rules are a no-op.
    pub fn remove_rule(mut self, rule: &Rule) -> Self {
        if let Some(position) = self.rules.iter().position(|candidate| candidate == rule) {
            self.rules.remove(position);
        }
        self
    }

    pub fn add_rule_group(mut self, group: RuleGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Detach the first child group equal to `group`, without touching its
    /// descendants. Absent groups are a no-op.
    pub fn remove_rule_group(mut self, group: &RuleGroup) -> Self {
        if let Some(position) = self.groups.iter().position(|candidate| candidate == group) {
            self.groups.remove(position);
        }
        self
    }
}

/// Backend-agnostic expression produced by translation. `True` and `False`
/// are the identity expressions empty groups collapse to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    Condition { field: String, operator: String, value: RuleValue },
    Combinator { mode: GroupMode, children: Vec<FilterExpr> },
    True,
    False,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_rule() -> Rule {
        Rule::new("r1", "name", ValueType::String, "equal", RuleValue::Single(Value::String("Alice".into())))
    }

    fn age_rule() -> Rule {
        Rule::new("r2", "age", ValueType::Integer, "greater", RuleValue::Single(Value::Integer(30)))
    }

    #[test]
    fn chained_construction() {
        let group = RuleGroup::new(GroupMode::And).add_rule(name_rule()).add_rule_group(RuleGroup::new(GroupMode::Or));
        assert_eq!(group.mode(), GroupMode::And);
        assert_eq!(group.rules().len(), 1);
        assert_eq!(group.rule_groups().len(), 1);
        assert!(!group.is_empty());
    }

    #[test]
    fn removal_matches_structurally() {
        let group = RuleGroup::new(GroupMode::And).add_rule(name_rule()).remove_rule(&name_rule());
        assert!(group.rules().is_empty());
    }

    #[test]
    fn removing_an_absent_element_is_a_no_op() {
        let group = RuleGroup::new(GroupMode::And)
            .add_rule(name_rule())
            .remove_rule(&age_rule())
            .remove_rule_group(&RuleGroup::new(GroupMode::Or));
        assert_eq!(group.rules().len(), 1);
    }

    #[test]
    fn equal_rules_are_removed_one_at_a_time() {
        let group = RuleGroup::new(GroupMode::Or).add_rule(name_rule()).add_rule(name_rule());
        let group = group.remove_rule(&name_rule());
        assert_eq!(group.rules().len(), 1);
    }

    #[test]
    fn removal_does_not_cascade() {
        let inner = RuleGroup::new(GroupMode::Or).add_rule(name_rule());
        let group = RuleGroup::new(GroupMode::And).add_rule_group(inner.clone()).remove_rule_group(&inner);
        assert!(group.rule_groups().is_empty());
        // the detached group itself is untouched
        assert_eq!(inner.rules().len(), 1);
    }
}
