use std::convert::TryFrom;

use crate::ast::RuleGroup;
use crate::codec;
use crate::error::ParseError;

impl<'a> TryFrom<&'a str> for RuleGroup {
    type Error = ParseError;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> { codec::deserialize(value) }
}

impl TryFrom<String> for RuleGroup {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> { codec::deserialize(&value) }
}

impl TryFrom<serde_json::Value> for RuleGroup {
    type Error = ParseError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> { codec::from_value(&value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::GroupMode;
    use serde_json::json;

    #[test]
    fn try_from_covers_text_and_structured_inputs() {
        let group = RuleGroup::try_from(r#"{"condition": "AND", "rules": []}"#).unwrap();
        assert_eq!(group.mode(), GroupMode::And);

        let group = RuleGroup::try_from(json!({"condition": "OR", "rules": []})).unwrap();
        assert_eq!(group.mode(), GroupMode::Or);

        assert!(RuleGroup::try_from(json!("scalar")).is_err());
    }
}
