use crate::{BuildContext, OperatorError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Input,
    Transformer,
    Router,
    Output,
}

impl OperatorKind {
    pub fn can_process(self) -> bool {
        !matches!(self, Self::Input)
    }

    pub fn can_output(self) -> bool {
        !matches!(self, Self::Output)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Transformer => "transformer",
            Self::Router => "router",
            Self::Output => "output",
        }
    }
}

/// A built pipeline stage. Only its identity and forwarding targets are
/// visible to assembly.
pub trait Operator: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;
    fn operator_type(&self) -> &str;
    fn kind(&self) -> OperatorKind;
    fn output_ids(&self) -> &[String];
    fn set_output_ids(&mut self, ids: Vec<String>);

    fn can_process(&self) -> bool {
        self.kind().can_process()
    }

    fn can_output(&self) -> bool {
        self.kind().can_output()
    }
}

/// One entry of a pipeline config, turned into operators at build time.
pub trait OperatorBuilder: fmt::Debug + Send + Sync {
    /// The id as authored, not yet namespaced.
    fn id(&self) -> &str;
    fn operator_type(&self) -> &str;
    fn build(&self, bc: &BuildContext) -> Result<Vec<Box<dyn Operator>>, OperatorError>;

    fn builds_multiple_ops(&self) -> bool {
        false
    }
}

/// Declared forwarding targets. Authored either as a single id or a list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OutputIdsRepr", into = "Vec<String>")]
pub struct OutputIds(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OutputIdsRepr {
    One(String),
    Many(Vec<String>),
}

impl From<OutputIdsRepr> for OutputIds {
    fn from(repr: OutputIdsRepr) -> Self {
        match repr {
            OutputIdsRepr::One(id) => Self(vec![id]),
            OutputIdsRepr::Many(ids) => Self(ids),
        }
    }
}

impl From<OutputIds> for Vec<String> {
    fn from(ids: OutputIds) -> Self {
        ids.0
    }
}

impl OutputIds {
    pub fn new(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn with_namespace(&self, bc: &BuildContext) -> Vec<String> {
        self.0.iter().map(|id| bc.prepend_namespace(id)).collect()
    }
}

/// Operator value produced by every built-in builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageOperator {
    id: String,
    operator_type: String,
    kind: OperatorKind,
    outputs: Vec<String>,
}

impl StageOperator {
    pub fn new(id: impl Into<String>, operator_type: impl Into<String>, kind: OperatorKind) -> Self {
        Self {
            id: id.into(),
            operator_type: operator_type.into(),
            kind,
            outputs: Vec::new(),
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<String>) -> Self {
        self.set_output_ids(outputs);
        self
    }
}

impl Operator for StageOperator {
    fn id(&self) -> &str {
        &self.id
    }

    fn operator_type(&self) -> &str {
        &self.operator_type
    }

    fn kind(&self) -> OperatorKind {
        self.kind
    }

    fn output_ids(&self) -> &[String] {
        &self.outputs
    }

    fn set_output_ids(&mut self, ids: Vec<String>) {
        // Outputs are sinks; whatever routing assigns them is dropped.
        if self.kind.can_output() {
            self.outputs = ids;
        }
    }
}
