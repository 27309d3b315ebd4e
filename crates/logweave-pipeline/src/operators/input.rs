use super::{WriterConfig, builder_identity};
use crate::{BuildContext, Operator, OperatorBuilder, OperatorError, OperatorKind, StageOperator};
use serde::Deserialize;

/// Builds a pipeline entry point: an operator that forwards but can not be
/// forwarded to.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerateInputConfig {
    #[serde(flatten)]
    pub writer: WriterConfig,
}

impl OperatorBuilder for GenerateInputConfig {
    builder_identity!(writer.basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        let op = StageOperator::new(
            bc.prepend_namespace(&self.writer.basic.id),
            self.writer.basic.operator_type.clone(),
            OperatorKind::Input,
        )
        .with_outputs(self.writer.output.with_namespace(bc));
        Ok(vec![Box::new(op) as Box<dyn Operator>])
    }
}
