use thiserror::Error;

use crate::value::ValueType;

/// Errors raised while decoding the JSON wire format. All are terminal for
/// the deserialize call; no partial tree is returned.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("invalid JSON document")]
    InvalidDocument,
    #[error("missing condition in rule group")]
    MissingCondition,
    #[error("invalid condition {0} in rule group")]
    InvalidCondition(serde_json::Value),
    #[error("keys given: {}. Expecting id, field, type, operator, value", .keys_given.join(", "))]
    MissingRuleKeys { keys_given: Vec<String> },
    #[error("cannot coerce {raw} to {ty}")]
    ValueCoercionFailed { ty: ValueType, raw: serde_json::Value },
}

/// Errors raised while translating a rule-group tree against join metadata.
#[derive(Debug, Error, PartialEq)]
pub enum TranslateError {
    #[error("no join mapping for field prefix {0:?}")]
    UnresolvedFieldPrefix(String),
}

/// Errors raised by the reference SQL rendering.
#[derive(Debug, Error, PartialEq)]
pub enum SqlGenerationError {
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    #[error("unsupported value in SQL rendering: {0}")]
    UnsupportedValue(String),
}
