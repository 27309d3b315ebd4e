use super::{BasicConfig, builder_identity, require_non_empty};
use crate::{
    BuildContext, Operator, OperatorBuilder, OperatorError, OperatorKind, OutputIds,
    StageOperator,
};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub expr: String,
    #[serde(default)]
    pub output: OutputIds,
}

/// Sends each entry to the outputs of the first matching route.
///
/// The router's forwarding targets are every route's outputs followed by the
/// `default` outputs. Without an explicit `default`, unmatched entries go to
/// the pipeline's default output when one is installed.
#[derive(Clone, Debug, Deserialize)]
pub struct RouterConfig {
    #[serde(flatten)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
    #[serde(default)]
    pub default: OutputIds,
}

impl OperatorBuilder for RouterConfig {
    builder_identity!(basic);

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        if self.routes.is_empty() {
            return Err(OperatorError::MissingField("routes".to_string()));
        }

        let mut outputs = Vec::new();
        for (i, route) in self.routes.iter().enumerate() {
            require_non_empty(&format!("routes[{i}].expr"), &route.expr)?;
            if route.output.is_empty() {
                return Err(OperatorError::MissingField(format!("routes[{i}].output")));
            }
            outputs.extend(route.output.with_namespace(bc));
        }

        if self.default.is_empty() {
            outputs.extend(bc.default_output_ids.iter().cloned());
        } else {
            outputs.extend(self.default.with_namespace(bc));
        }

        let op = StageOperator::new(
            bc.prepend_namespace(&self.basic.id),
            self.basic.operator_type.clone(),
            OperatorKind::Router,
        )
        .with_outputs(outputs);
        Ok(vec![Box::new(op) as Box<dyn Operator>])
    }
}
