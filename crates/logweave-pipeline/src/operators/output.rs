use super::{BasicConfig, builder_identity, require_non_empty};
use crate::{BuildContext, Operator, OperatorBuilder, OperatorError, OperatorKind, StageOperator};
use serde::Deserialize;

fn build_output(basic: &BasicConfig, bc: &BuildContext) -> Vec<Box<dyn Operator>> {
    let op = StageOperator::new(
        bc.prepend_namespace(&basic.id),
        basic.operator_type.clone(),
        OperatorKind::Output,
    );
    vec![Box::new(op) as Box<dyn Operator>]
}

#[derive(Clone, Debug, Deserialize)]
pub struct StdoutConfig {
    #[serde(flatten)]
    pub basic: BasicConfig,
}

impl OperatorBuilder for StdoutConfig {
    builder_identity!(basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        Ok(build_output(&self.basic, bc))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct FileOutputConfig {
    #[serde(flatten)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub path: String,
}

impl OperatorBuilder for FileOutputConfig {
    builder_identity!(basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        if self.path.is_empty() {
            return Err(OperatorError::MissingField("path".to_string()));
        }
        require_non_empty("path", &self.path)?;
        Ok(build_output(&self.basic, bc))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DropOutputConfig {
    #[serde(flatten)]
    pub basic: BasicConfig,
}

impl OperatorBuilder for DropOutputConfig {
    builder_identity!(basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        Ok(build_output(&self.basic, bc))
    }
}
