//! Reference SQL rendering for translated filter expressions and join
//! directives. This is one possible query backend; anything implementing
//! [`QueryBackend`] can consume a [`Translation`] instead.

use crate::ast::{FilterExpr, GroupMode, RuleValue};
use crate::error::SqlGenerationError;
use crate::translate::{JoinDirective, QueryBackend, Translation};
use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};

/// Render join directives as ` JOIN parent.relation child_alias` fragments,
/// in directive order.
pub fn generate_join_sql(joins: &[JoinDirective]) -> String {
    let mut buffer = String::new();
    for join in joins {
        buffer.push_str(" JOIN ");
        buffer.push_str(&join.parent_alias);
        buffer.push('.');
        buffer.push_str(&join.relation);
        buffer.push(' ');
        buffer.push_str(&join.child_alias);
    }
    buffer
}

/// Render a filter expression as a SQL boolean expression.
pub fn generate_filter_sql(expr: &FilterExpr) -> Result<String, SqlGenerationError> {
    let mut buffer = String::new();
    generate_filter_sql_inner(expr, &mut buffer)?;
    Ok(buffer)
}

fn generate_filter_sql_inner(expr: &FilterExpr, buffer: &mut String) -> Result<(), SqlGenerationError> {
    match expr {
        FilterExpr::True => buffer.push_str("TRUE"),
        FilterExpr::False => buffer.push_str("FALSE"),
        FilterExpr::Combinator { mode, children } => {
            if children.is_empty() {
                return Err(SqlGenerationError::InvalidExpression("combinator with no children".to_string()));
            }
            // AND binds tighter than OR in SQL, so only OR needs parentheses
            let parenthesize = *mode == GroupMode::Or;
            if parenthesize {
                buffer.push('(');
            }
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    buffer.push(' ');
                    buffer.push_str(mode.as_str());
                    buffer.push(' ');
                }
                generate_filter_sql_inner(child, buffer)?;
            }
            if parenthesize {
                buffer.push(')');
            }
        }
        FilterExpr::Condition { field, operator, value } => {
            generate_condition_sql(field, operator, value, buffer)?;
        }
    }
    Ok(())
}

fn generate_condition_sql(
    field: &str,
    operator: &str,
    value: &RuleValue,
    buffer: &mut String,
) -> Result<(), SqlGenerationError> {
    match operator {
        "is_null" => {
            buffer.push_str(field);
            buffer.push_str(" IS NULL");
        }
        "is_not_null" => {
            buffer.push_str(field);
            buffer.push_str(" IS NOT NULL");
        }
        "in" | "not_in" => {
            let scalars = match value {
                RuleValue::Many(scalars) => scalars.as_slice(),
                RuleValue::Single(scalar) => std::slice::from_ref(scalar),
            };
            buffer.push_str(field);
            buffer.push_str(if operator == "not_in" { " NOT IN (" } else { " IN (" });
            for (i, scalar) in scalars.iter().enumerate() {
                if i > 0 {
                    buffer.push_str(", ");
                }
                push_value_sql(scalar, buffer)?;
            }
            buffer.push(')');
        }
        "between" | "not_between" => {
            let RuleValue::Many(scalars) = value else {
                return Err(SqlGenerationError::InvalidExpression(format!("{operator} expects two values")));
            };
            let [low, high] = scalars.as_slice() else {
                return Err(SqlGenerationError::InvalidExpression(format!("{operator} expects two values")));
            };
            buffer.push_str(field);
            buffer.push_str(if operator == "not_between" { " NOT BETWEEN " } else { " BETWEEN " });
            push_value_sql(low, buffer)?;
            buffer.push_str(" AND ");
            push_value_sql(high, buffer)?;
        }
        "begins_with" | "contains" | "ends_with" => {
            let text = match value {
                RuleValue::Single(Value::String(text)) => text,
                _ => {
                    return Err(SqlGenerationError::InvalidExpression(format!("{operator} expects a string value")));
                }
            };
            buffer.push_str(field);
            buffer.push_str(" LIKE '");
            if matches!(operator, "contains" | "ends_with") {
                buffer.push('%');
            }
            push_escaped(text, buffer);
            if matches!(operator, "contains" | "begins_with") {
                buffer.push('%');
            }
            buffer.push('\'');
        }
        plain => {
            let sql_operator = match plain {
                "equal" => "=",
                "not_equal" => "<>",
                "less" => "<",
                "less_or_equal" => "<=",
                "greater" => ">",
                "greater_or_equal" => ">=",
                unknown => return Err(SqlGenerationError::UnsupportedOperator(unknown.to_string())),
            };
            let RuleValue::Single(scalar) = value else {
                return Err(SqlGenerationError::InvalidExpression(format!("{plain} expects a single value")));
            };
            buffer.push_str(field);
            buffer.push(' ');
            buffer.push_str(sql_operator);
            buffer.push(' ');
            push_value_sql(scalar, buffer)?;
        }
    }
    Ok(())
}

fn push_value_sql(value: &Value, buffer: &mut String) -> Result<(), SqlGenerationError> {
    match value {
        Value::Null => buffer.push_str("NULL"),
        Value::Integer(i) => buffer.push_str(&i.to_string()),
        Value::Double(f) => buffer.push_str(&f.to_string()),
        Value::Boolean(b) => buffer.push_str(if *b { "true" } else { "false" }),
        Value::String(s) => push_quoted(s, buffer),
        Value::Date(d) => push_quoted(&d.format(DATE_FORMAT).to_string(), buffer),
        Value::Time(t) => push_quoted(&t.format(TIME_FORMAT).to_string(), buffer),
        Value::DateTime(dt) => push_quoted(&dt.format(DATETIME_FORMAT).to_string(), buffer),
        Value::Raw(raw) => match raw {
            serde_json::Value::Null => buffer.push_str("NULL"),
            serde_json::Value::Bool(b) => buffer.push_str(if *b { "true" } else { "false" }),
            serde_json::Value::Number(n) => buffer.push_str(&n.to_string()),
            serde_json::Value::String(s) => push_quoted(s, buffer),
            other => return Err(SqlGenerationError::UnsupportedValue(other.to_string())),
        },
    }
    Ok(())
}

fn push_quoted(s: &str, buffer: &mut String) {
    buffer.push('\'');
    push_escaped(s, buffer);
    buffer.push('\'');
}

fn push_escaped(s: &str, buffer: &mut String) {
    for c in s.chars() {
        match c {
            '\'' => buffer.push_str("''"),
            // NUL bytes can truncate strings in C-based drivers
            '\0' => continue,
            _ => buffer.push(c),
        }
    }
}

/// Rendered query fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub joins: String,
    pub filter: String,
}

/// Reference backend rendering translations into SQL fragments.
pub struct SqlBackend;

impl QueryBackend for SqlBackend {
    type Query = SqlQuery;
    type Error = SqlGenerationError;

    fn render(&self, translation: &Translation) -> Result<SqlQuery, SqlGenerationError> {
        Ok(SqlQuery {
            joins: generate_join_sql(&translation.joins),
            filter: generate_filter_sql(&translation.expr)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::deserialize;
    use crate::translate::{JoinResolver, Translator};
    use anyhow::Result;

    fn condition(field: &str, operator: &str, value: RuleValue) -> FilterExpr {
        FilterExpr::Condition { field: field.to_string(), operator: operator.to_string(), value }
    }

    #[test]
    fn renders_simple_comparisons() -> Result<()> {
        let sql = generate_filter_sql(&condition(
            "object.name",
            "equal",
            RuleValue::Single(Value::String("Alice".into())),
        ))?;
        assert_eq!(sql, "object.name = 'Alice'");
        Ok(())
    }

    #[test]
    fn escapes_quotes_and_drops_nul_bytes() -> Result<()> {
        let sql = generate_filter_sql(&condition(
            "object.name",
            "equal",
            RuleValue::Single(Value::String("O'Bri\0en".into())),
        ))?;
        assert_eq!(sql, "object.name = 'O''Brien'");
        Ok(())
    }

    #[test]
    fn renders_in_lists_and_between_ranges() -> Result<()> {
        let sql = generate_filter_sql(&condition(
            "object.tag",
            "in",
            RuleValue::Many(vec![Value::String("a".into()), Value::Null, Value::Integer(3)]),
        ))?;
        assert_eq!(sql, "object.tag IN ('a', NULL, 3)");

        let sql = generate_filter_sql(&condition(
            "object.age",
            "between",
            RuleValue::Many(vec![Value::Integer(30), Value::Integer(40)]),
        ))?;
        assert_eq!(sql, "object.age BETWEEN 30 AND 40");
        Ok(())
    }

    #[test]
    fn between_requires_exactly_two_values() {
        let expr = condition("object.age", "between", RuleValue::Many(vec![Value::Integer(30)]));
        match generate_filter_sql(&expr) {
            Err(SqlGenerationError::InvalidExpression(_)) => {}
            other => panic!("Expected InvalidExpression, got {other:?}"),
        }
    }

    #[test]
    fn renders_null_checks_and_like_operators() -> Result<()> {
        let sql = generate_filter_sql(&condition("object.name", "is_null", RuleValue::Single(Value::Null)))?;
        assert_eq!(sql, "object.name IS NULL");

        let sql = generate_filter_sql(&condition(
            "object.name",
            "contains",
            RuleValue::Single(Value::String("li".into())),
        ))?;
        assert_eq!(sql, "object.name LIKE '%li%'");

        let sql = generate_filter_sql(&condition(
            "object.name",
            "begins_with",
            RuleValue::Single(Value::String("Al".into())),
        ))?;
        assert_eq!(sql, "object.name LIKE 'Al%'");
        Ok(())
    }

    #[test]
    fn unknown_operators_are_rejected() {
        let expr = condition("object.name", "sounds_like", RuleValue::Single(Value::String("x".into())));
        match generate_filter_sql(&expr) {
            Err(SqlGenerationError::UnsupportedOperator(op)) => assert_eq!(op, "sounds_like"),
            other => panic!("Expected UnsupportedOperator, got {other:?}"),
        }
    }

    #[test]
    fn or_combinators_parenthesize() -> Result<()> {
        let expr = FilterExpr::Combinator {
            mode: GroupMode::And,
            children: vec![
                FilterExpr::Combinator {
                    mode: GroupMode::Or,
                    children: vec![
                        condition("object.name", "equal", RuleValue::Single(Value::String("Alice".into()))),
                        condition("object.name", "equal", RuleValue::Single(Value::String("Bob".into()))),
                    ],
                },
                condition("object.age", "greater_or_equal", RuleValue::Single(Value::Integer(30))),
            ],
        };
        assert_eq!(
            generate_filter_sql(&expr)?,
            "(object.name = 'Alice' OR object.name = 'Bob') AND object.age >= 30"
        );
        Ok(())
    }

    #[test]
    fn renders_join_fragments_in_directive_order() {
        let resolver = JoinResolver::new(
            "object",
            [("labels", "A"), ("specification", "B"), ("labels.specification", "C")],
        );
        assert_eq!(
            generate_join_sql(resolver.directives()),
            " JOIN object.labels labels JOIN object.specification specification \
             JOIN labels.specification labels_specification"
        );
    }

    #[test]
    fn renders_a_deserialized_document_end_to_end() -> Result<()> {
        let tree = deserialize(
            r#"{
                "condition": "AND",
                "rules": [
                    {"id": "l", "field": "labels.name", "type": "string", "operator": "equal", "value": "urgent"},
                    {"id": "c", "field": "created", "type": "date", "operator": "greater", "value": "2024-01-01"}
                ]
            }"#,
        )?;
        let translation = Translator::new(JoinResolver::new("object", [("labels", "App\\Label")])).translate(&tree)?;
        let query = SqlBackend.render(&translation)?;
        assert_eq!(query.joins, " JOIN object.labels labels");
        assert_eq!(query.filter, "labels.name = 'urgent' AND object.created > '2024-01-01'");
        Ok(())
    }
}
