//! Translate rule-group trees into backend-agnostic filter expressions,
//! resolving dotted field paths through join metadata. The resulting
//! [`Translation`] is what the external query backend renders.

pub mod join;
pub mod sql;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{FilterExpr, GroupMode, RuleGroup, RuleValue};
use crate::error::TranslateError;
use crate::value::Value;

pub use join::{JoinDirective, JoinResolver};

/// What an empty group (no rules, no subgroups) translates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyGroupPolicy {
    /// Empty AND-groups collapse to `True`, empty OR-groups to `False`.
    #[default]
    ModeIdentity,
    /// Every empty group collapses to `True`.
    MatchAll,
    /// Every empty group collapses to `False`.
    MatchNone,
}

/// Walks a rule-group tree and emits a filter expression plus the join
/// directives needed to reach every referenced field prefix.
pub struct Translator {
    resolver: JoinResolver,
    empty_groups: EmptyGroupPolicy,
}

impl Translator {
    pub fn new(resolver: JoinResolver) -> Self {
        Self { resolver, empty_groups: EmptyGroupPolicy::default() }
    }

    pub fn with_empty_group_policy(mut self, policy: EmptyGroupPolicy) -> Self {
        self.empty_groups = policy;
        self
    }

    pub fn translate(&self, group: &RuleGroup) -> Result<Translation, TranslateError> {
        let expr = self.translate_group(group)?;
        debug!(joins = self.resolver.directives().len(), "translated rule group");
        Ok(Translation {
            root_alias: self.resolver.root_alias().to_string(),
            joins: self.resolver.directives().to_vec(),
            expr,
        })
    }

    fn translate_group(&self, group: &RuleGroup) -> Result<FilterExpr, TranslateError> {
        if group.is_empty() {
            return Ok(match self.empty_groups {
                EmptyGroupPolicy::ModeIdentity => match group.mode() {
                    GroupMode::And => FilterExpr::True,
                    GroupMode::Or => FilterExpr::False,
                },
                EmptyGroupPolicy::MatchAll => FilterExpr::True,
                EmptyGroupPolicy::MatchNone => FilterExpr::False,
            });
        }

        let mut children = Vec::with_capacity(group.rule_groups().len() + group.rules().len());
        for child in group.rule_groups() {
            children.push(self.translate_group(child)?);
        }
        for rule in group.rules() {
            children.push(FilterExpr::Condition {
                field: self.resolver.resolve_field(&rule.field)?,
                operator: rule.operator.clone(),
                value: rule.value.clone(),
            });
        }
        Ok(FilterExpr::Combinator { mode: group.mode(), children })
    }
}

/// A translated tree: the expression, the joins it needs, and the root alias
/// they hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub root_alias: String,
    pub joins: Vec<JoinDirective>,
    pub expr: FilterExpr,
}

impl Translation {
    /// Condition scalars in depth-first order, for backends that bind
    /// positional parameters.
    pub fn bindings(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        collect_bindings(&self.expr, &mut out);
        out
    }
}

fn collect_bindings<'a>(expr: &'a FilterExpr, out: &mut Vec<&'a Value>) {
    match expr {
        FilterExpr::Condition { value, .. } => match value {
            RuleValue::Single(scalar) => out.push(scalar),
            RuleValue::Many(scalars) => out.extend(scalars.iter()),
        },
        FilterExpr::Combinator { children, .. } => {
            for child in children {
                collect_bindings(child, out);
            }
        }
        FilterExpr::True | FilterExpr::False => {}
    }
}

/// Rendering seam for the external query backend: turns a translation into
/// an executable query, or whatever the backend calls one.
pub trait QueryBackend {
    type Query;
    type Error;

    fn render(&self, translation: &Translation) -> Result<Self::Query, Self::Error>;
}
