#![allow(dead_code)]

use logweave_pipeline::{
    BuildContext, Operator, OperatorBuilder, OperatorError, OperatorKind, PipelineConfig,
    StageOperator,
};
use std::sync::{Arc, Mutex};

pub type BuildLog = Arc<Mutex<Vec<String>>>;

pub fn build_log() -> BuildLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &BuildLog) -> Vec<String> {
    log.lock().expect("build log mutex").clone()
}

/// Builds one operator per entry of `produced`, each with the given declared
/// outputs, and records every build call.
#[derive(Debug)]
pub struct MockBuilder {
    pub id: String,
    pub produced: Vec<(String, Vec<String>)>,
    pub multi: bool,
    pub log: BuildLog,
}

impl MockBuilder {
    pub fn single(id: &str, log: &BuildLog) -> Self {
        Self {
            id: id.to_string(),
            produced: vec![(id.to_string(), Vec::new())],
            multi: false,
            log: log.clone(),
        }
    }

    pub fn plugin(id: &str, inner: &[&str], log: &BuildLog) -> Self {
        Self {
            id: id.to_string(),
            produced: inner
                .iter()
                .map(|inner_id| (format!("{id}.{inner_id}"), Vec::new()))
                .collect(),
            multi: true,
            log: log.clone(),
        }
    }

    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        if let Some((_, declared)) = self.produced.first_mut() {
            *declared = outputs.iter().map(|s| s.to_string()).collect();
        }
        self
    }

    pub fn boxed(self) -> Box<dyn OperatorBuilder> {
        Box::new(self)
    }
}

impl OperatorBuilder for MockBuilder {
    fn id(&self) -> &str {
        &self.id
    }

    fn operator_type(&self) -> &str {
        "mock"
    }

    fn builds_multiple_ops(&self) -> bool {
        self.multi
    }

    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        self.log
            .lock()
            .expect("build log mutex")
            .push(self.id.clone());
        Ok(self
            .produced
            .iter()
            .map(|(id, outputs)| {
                let outputs = outputs.iter().map(|o| bc.prepend_namespace(o)).collect();
                Box::new(
                    StageOperator::new(bc.prepend_namespace(id), "mock", OperatorKind::Transformer)
                        .with_outputs(outputs),
                ) as Box<dyn Operator>
            })
            .collect())
    }
}

#[derive(Debug)]
pub struct FailingBuilder {
    pub id: String,
    pub log: BuildLog,
}

impl OperatorBuilder for FailingBuilder {
    fn id(&self) -> &str {
        &self.id
    }

    fn operator_type(&self) -> &str {
        "failing"
    }

    fn build(&self, _bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError> {
        self.log
            .lock()
            .expect("build log mutex")
            .push(self.id.clone());
        Err(OperatorError::invalid_field("setting", "always fails"))
    }
}

pub fn pipeline(builders: Vec<Box<dyn OperatorBuilder>>) -> PipelineConfig {
    PipelineConfig::new(builders)
}

pub fn sink(id: &str) -> Box<dyn Operator> {
    Box::new(StageOperator::new(id, "stdout", OperatorKind::Output))
}

pub fn ids(operators: &[Box<dyn Operator>]) -> Vec<String> {
    operators.iter().map(|op| op.id().to_string()).collect()
}

pub fn outputs_of<'a>(operators: &'a [Box<dyn Operator>], id: &str) -> &'a [String] {
    operators
        .iter()
        .find(|op| op.id() == id)
        .map(|op| op.output_ids())
        .unwrap_or_else(|| panic!("operator '{id}' should exist"))
}
