//! Rule-builder filter trees: an AND/OR rule-group model, a JSON wire codec
//! with type-directed value coercion, and translation into backend-agnostic
//! filter expressions plus the join directives implied by dotted field paths.

pub mod ast;
pub mod codec;
mod conversion;
pub mod error;
pub mod translate;
pub mod value;

pub use ast::{FilterExpr, GroupMode, Rule, RuleGroup, RuleId, RuleValue};
pub use codec::{deserialize, serialize};
pub use error::{ParseError, SqlGenerationError, TranslateError};
pub use translate::{EmptyGroupPolicy, JoinDirective, JoinResolver, QueryBackend, Translation, Translator};
pub use value::{Value, ValueType};
