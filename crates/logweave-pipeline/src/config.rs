use crate::{
    BuildContext, DirectedPipeline, EntryPointIndex, Operator, OperatorBuilder, OperatorError,
    PipelineError, set_output_ids,
};
use tracing::{debug, info};

/// Operators built from a config, in config order, before routing.
#[derive(Debug)]
pub struct BuiltStages {
    pub operators: Vec<Box<dyn Operator>>,
    pub entry_points: EntryPointIndex,
}

/// The ordered operator specifications of one pipeline.
#[derive(Debug, Default)]
pub struct PipelineConfig {
    builders: Vec<Box<dyn OperatorBuilder>>,
}

impl PipelineConfig {
    pub fn new(builders: Vec<Box<dyn OperatorBuilder>>) -> Self {
        Self { builders }
    }

    pub fn push(&mut self, builder: Box<dyn OperatorBuilder>) {
        self.builders.push(builder);
    }

    pub fn builders(&self) -> &[Box<dyn OperatorBuilder>] {
        &self.builders
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Builds every spec in order and flattens the results. Stops at the first
    /// builder failure.
    pub fn build_stages(&self, bc: &BuildContext) -> Result<BuiltStages, PipelineError> {
        let mut entry_points = EntryPointIndex::new();
        let mut operators: Vec<Box<dyn Operator>> = Vec::with_capacity(self.builders.len());

        for builder in &self.builders {
            let spec_id = bc.prepend_namespace(builder.id());
            let built = builder
                .build(bc)
                .map_err(|source| PipelineError::build(spec_id.clone(), source))?;

            let Some(first) = built.first() else {
                return Err(PipelineError::build(spec_id, OperatorError::NoOperators));
            };
            if builder.builds_multiple_ops() {
                entry_points.insert(spec_id.clone(), first.id());
            }

            debug!(
                id = %spec_id,
                operator_type = builder.operator_type(),
                built = built.len(),
                "built operator spec"
            );
            operators.extend(built);
        }

        Ok(BuiltStages {
            operators,
            entry_points,
        })
    }

    /// Builds and routes the operators without a trailing default operator.
    pub fn build_operators(
        &self,
        bc: &BuildContext,
    ) -> Result<Vec<Box<dyn Operator>>, PipelineError> {
        let BuiltStages {
            mut operators,
            entry_points,
        } = self.build_stages(bc)?;
        set_output_ids(&mut operators, &entry_points);
        Ok(operators)
    }

    /// Builds and routes the operators, appending `default_operator` as the
    /// final stage. The default operator's id is made available to builders
    /// through [`BuildContext::default_output_ids`].
    pub fn assemble(
        &self,
        bc: &BuildContext,
        default_operator: Option<Box<dyn Operator>>,
    ) -> Result<Vec<Box<dyn Operator>>, PipelineError> {
        let bc = match &default_operator {
            Some(op) => bc.with_default_output_ids(vec![op.id().to_string()]),
            None => bc.clone(),
        };

        let BuiltStages {
            mut operators,
            entry_points,
        } = self.build_stages(&bc)?;
        if let Some(op) = default_operator {
            operators.push(op);
        }
        set_output_ids(&mut operators, &entry_points);

        info!(
            operators = operators.len(),
            plugins = entry_points.len(),
            "assembled pipeline"
        );
        Ok(operators)
    }

    pub fn build_pipeline(
        &self,
        bc: &BuildContext,
        default_operator: Option<Box<dyn Operator>>,
    ) -> Result<DirectedPipeline, PipelineError> {
        let operators = self.assemble(bc, default_operator)?;
        DirectedPipeline::new(operators)
    }
}
