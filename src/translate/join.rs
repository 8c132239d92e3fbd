//! Derive join directives from dotted field-prefix associations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TranslateError;

/// One join clause: connect `parent_alias` to `child_alias` via `relation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinDirective {
    pub parent_alias: String,
    pub relation: String,
    pub child_alias: String,
    /// Association identifier for prefixes named in the caller's mapping;
    /// `None` for joins implied only by a longer dotted key.
    pub association: Option<String>,
}

/// Derives the join clauses needed to reach every dotted field prefix, and
/// rewrites rule fields to aliased column references.
#[derive(Debug, Clone)]
pub struct JoinResolver {
    root_alias: String,
    directives: Vec<JoinDirective>,
    prefixes: HashSet<String>,
}

impl JoinResolver {
    /// Build a resolver from an ordered `(prefix, association)` mapping.
    ///
    /// Each key splits on `.`: the first segment joins from the root alias,
    /// each later segment from the alias of the path so far, so a dotted key
    /// also emits the intermediate joins it implies. An alias is its path
    /// with `.` replaced by `_`. Directives deduplicate by child alias,
    /// first seen wins, which keeps the list deterministic for a given key
    /// order and idempotent across duplicate-implied joins.
    pub fn new<I, K, V>(root_alias: impl Into<String>, associations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let root_alias = root_alias.into();
        let associations: Vec<(String, String)> =
            associations.into_iter().map(|(prefix, class)| (prefix.into(), class.into())).collect();

        let mut directives: Vec<JoinDirective> = Vec::new();
        let mut prefixes = HashSet::new();
        let mut seen_aliases = HashSet::new();
        for (key, _) in &associations {
            if key.is_empty() {
                continue;
            }
            let mut path = String::new();
            for segment in key.split('.') {
                let parent_alias = if path.is_empty() { root_alias.clone() } else { derive_alias(&path) };
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(segment);
                prefixes.insert(path.clone());

                let child_alias = derive_alias(&path);
                if seen_aliases.insert(child_alias.clone()) {
                    let association =
                        associations.iter().find(|(prefix, _)| *prefix == path).map(|(_, class)| class.clone());
                    directives.push(JoinDirective {
                        parent_alias,
                        relation: segment.to_string(),
                        child_alias,
                        association,
                    });
                }
            }
        }

        Self { root_alias, directives, prefixes }
    }

    /// Resolver with no associations: every field resolves against the root
    /// alias and dotted fields fail.
    pub fn root_only(root_alias: impl Into<String>) -> Self {
        Self::new(root_alias, Vec::<(String, String)>::new())
    }

    pub fn root_alias(&self) -> &str { &self.root_alias }

    pub fn directives(&self) -> &[JoinDirective] { &self.directives }

    /// Alias of a known prefix.
    pub fn alias_of(&self, prefix: &str) -> Option<String> {
        self.prefixes.contains(prefix).then(|| derive_alias(prefix))
    }

    /// Rewrite a rule field to its aliased column reference: a dotted field
    /// becomes `<prefixAlias>.<leaf>`, a plain field `<root>.<field>`.
    pub fn resolve_field(&self, field: &str) -> Result<String, TranslateError> {
        match field.rsplit_once('.') {
            None => Ok(format!("{}.{}", self.root_alias, field)),
            Some((prefix, leaf)) => {
                if !self.prefixes.contains(prefix) {
                    return Err(TranslateError::UnresolvedFieldPrefix(prefix.to_string()));
                }
                Ok(format!("{}.{}", derive_alias(prefix), leaf))
            }
        }
    }
}

fn derive_alias(path: &str) -> String {
    path.replace('.', "_")
}
