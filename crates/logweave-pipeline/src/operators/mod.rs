//! Built-in operator types. Every built-in builds exactly one operator.

use crate::{BuilderRegistry, DecodeContext, OperatorBuilder, OperatorError, OutputIds};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod input;
pub mod output;
pub mod router;
pub mod transformer;

pub fn register_builtins(registry: &mut BuilderRegistry) {
    registry.register_type("noop", decode::<transformer::NoopConfig>);
    registry.register_type("json_parser", decode::<transformer::JsonParserConfig>);
    registry.register_type("regex_parser", decode::<transformer::RegexParserConfig>);
    registry.register_type("filter", decode::<transformer::FilterConfig>);
    registry.register_type("router", decode::<router::RouterConfig>);
    registry.register_type("generate_input", decode::<input::GenerateInputConfig>);
    registry.register_type("stdout", decode::<output::StdoutConfig>);
    registry.register_type("file_output", decode::<output::FileOutputConfig>);
    registry.register_type("drop_output", decode::<output::DropOutputConfig>);
}

fn decode<T>(_ctx: &DecodeContext<'_>, value: Value) -> Result<Box<dyn OperatorBuilder>, OperatorError>
where
    T: OperatorBuilder + DeserializeOwned + 'static,
{
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

/// Fields shared by every operator.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BasicConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub operator_type: String,
}

/// Fields shared by operators that forward entries.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WriterConfig {
    #[serde(flatten)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub output: OutputIds,
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), OperatorError> {
    if value.trim().is_empty() {
        return Err(OperatorError::invalid_field(field, "must not be empty"));
    }
    Ok(())
}

/// Implements the identity half of [`OperatorBuilder`] for a config with a
/// `basic: BasicConfig` path.
macro_rules! builder_identity {
    ($($basic:ident).+) => {
        fn id(&self) -> &str {
            &self.$($basic).+.id
        }

        fn operator_type(&self) -> &str {
            &self.$($basic).+.operator_type
        }
    };
}

pub(crate) use builder_identity;
