use super::{WriterConfig, builder_identity, require_non_empty};
use crate::{BuildContext, Operator, OperatorBuilder, OperatorError, OperatorKind, StageOperator};
use serde::Deserialize;

fn build_transformer(writer: &WriterConfig, bc: &BuildContext) -> Vec<Box<dyn Operator>> {
    let op = StageOperator::new(
        bc.prepend_namespace(&writer.basic.id),
        writer.basic.operator_type.clone(),
        OperatorKind::Transformer,
    )
    .with_outputs(writer.output.with_namespace(bc));
    vec![Box::new(op) as Box<dyn Operator>]
}

#[derive(Clone, Debug, Deserialize)]
pub struct NoopConfig {
    #[serde(flatten)]
    pub writer: WriterConfig,
}

impl OperatorBuilder for NoopConfig {
    builder_identity!(writer.basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        Ok(build_transformer(&self.writer, bc))
    }
}

fn default_parse_from() -> String {
    "body".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct JsonParserConfig {
    #[serde(flatten)]
    pub writer: WriterConfig,
    #[serde(default = "default_parse_from")]
    pub parse_from: String,
}

impl OperatorBuilder for JsonParserConfig {
    builder_identity!(writer.basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        require_non_empty("parse_from", &self.parse_from)?;
        Ok(build_transformer(&self.writer, bc))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegexParserConfig {
    #[serde(flatten)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub regex: String,
    #[serde(default = "default_parse_from")]
    pub parse_from: String,
}

impl OperatorBuilder for RegexParserConfig {
    builder_identity!(writer.basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        if self.regex.is_empty() {
            return Err(OperatorError::MissingField("regex".to_string()));
        }
        regex::Regex::new(&self.regex)
            .map_err(|e| OperatorError::invalid_field("regex", e.to_string()))?;
        require_non_empty("parse_from", &self.parse_from)?;
        Ok(build_transformer(&self.writer, bc))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FilterConfig {
    #[serde(flatten)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub expr: String,
}

impl OperatorBuilder for FilterConfig {
    builder_identity!(writer.basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        if self.expr.is_empty() {
            return Err(OperatorError::MissingField("expr".to_string()));
        }
        require_non_empty("expr", &self.expr)?;
        Ok(build_transformer(&self.writer, bc))
    }
}
