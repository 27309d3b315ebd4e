use crate::{
    BuildContext, DecodeContext, Operator, OperatorBuilder, OperatorError, OutputIds,
    PipelineConfig,
};
use serde::Deserialize;
use serde_json::Value;

pub const INLINE_PLUGIN_TYPE: &str = "plugin";
pub const MAX_PLUGIN_DEPTH: usize = 10;

/// A spec that expands into a whole sub-pipeline.
///
/// Inner operators live in the plugin's own namespace (`$.<plugin id>.<inner
/// id>`). Other operators address the plugin by its id and are routed to its
/// first inner operator during assembly.
#[derive(Debug)]
pub struct PluginConfig {
    id: String,
    operator_type: String,
    output: OutputIds,
    pipeline: PipelineConfig,
}

impl PluginConfig {
    pub fn new(
        id: impl Into<String>,
        operator_type: impl Into<String>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            id: id.into(),
            operator_type: operator_type.into(),
            output: OutputIds::default(),
            pipeline,
        }
    }

    pub fn with_output(mut self, output: OutputIds) -> Self {
        self.output = output;
        self
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }
}

impl OperatorBuilder for PluginConfig {
    fn id(&self) -> &str {
        &self.id
    }

    fn operator_type(&self) -> &str {
        &self.operator_type
    }

    fn builds_multiple_ops(&self) -> bool {
        true
    }

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        if bc.plugin_depth >= MAX_PLUGIN_DEPTH {
            return Err(OperatorError::MaxPluginDepth(MAX_PLUGIN_DEPTH));
        }

        let plugin_bc = bc.with_sub_namespace(&self.id).with_incremented_depth();
        let mut operators = self
            .pipeline
            .build_operators(&plugin_bc)
            .map_err(Box::new)?;

        // The tail leaves the plugin through its declared output, if any.
        // Otherwise it stays unrouted and assembly chains it to whatever
        // follows the plugin.
        let Some(tail) = operators.last_mut() else {
            return Err(OperatorError::NoOperators);
        };
        if !self.output.is_empty() && tail.output_ids().is_empty() {
            tail.set_output_ids(self.output.with_namespace(bc));
        }

        Ok(operators)
    }
}

#[derive(Deserialize)]
struct PluginFields {
    id: String,
    #[serde(rename = "type")]
    operator_type: String,
    #[serde(default)]
    output: OutputIds,
    pipeline: Option<Vec<Value>>,
}

/// Decodes `{"type": "plugin", "pipeline": [...]}`.
pub fn decode_inline_plugin(
    ctx: &DecodeContext<'_>,
    value: Value,
) -> Result<Box<dyn OperatorBuilder>, OperatorError> {
    let fields: PluginFields = serde_json::from_value(value)?;
    let Some(entries) = fields.pipeline else {
        return Err(OperatorError::MissingField("pipeline".to_string()));
    };
    decode_plugin(ctx, fields.id, fields.operator_type, fields.output, entries)
}

/// Decodes an operator whose type names a registered plugin template.
pub fn decode_template_plugin(
    ctx: &DecodeContext<'_>,
    value: Value,
    template: &[Value],
) -> Result<Box<dyn OperatorBuilder>, OperatorError> {
    let fields: PluginFields = serde_json::from_value(value)?;
    decode_plugin(
        ctx,
        fields.id,
        fields.operator_type,
        fields.output,
        template.to_vec(),
    )
}

fn decode_plugin(
    ctx: &DecodeContext<'_>,
    id: String,
    operator_type: String,
    output: OutputIds,
    entries: Vec<Value>,
) -> Result<Box<dyn OperatorBuilder>, OperatorError> {
    let pipeline = ctx.nested()?.decode_pipeline(entries).map_err(Box::new)?;
    Ok(Box::new(
        PluginConfig::new(id, operator_type, pipeline).with_output(output),
    ))
}
