use crate::{Diagnostic, Operator, PipelineError, ValidationError};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A validated, wired set of operators ready to be handed to an executor.
#[derive(Debug)]
pub struct DirectedPipeline {
    operators: Vec<Box<dyn Operator>>,
    positions: BTreeMap<String, usize>,
    order: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl DirectedPipeline {
    pub fn new(operators: Vec<Box<dyn Operator>>) -> Result<Self, PipelineError> {
        let diagnostics = validate_operators(&operators);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Err(ValidationError::new(diagnostics).into());
        }

        let positions = operators
            .iter()
            .enumerate()
            .map(|(i, op)| (op.id().to_string(), i))
            .collect();
        // Validation has already rejected cycles, so every operator is ordered.
        let order = topological_order(&operators).unwrap_or_default();

        Ok(Self {
            operators,
            positions,
            order,
            diagnostics,
        })
    }

    /// Operators in assembly order.
    pub fn operators(&self) -> &[Box<dyn Operator>] {
        &self.operators
    }

    pub fn operator(&self, id: &str) -> Option<&dyn Operator> {
        self.positions.get(id).map(|&i| self.operators[i].as_ref())
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.operators.iter().flat_map(|op| {
            op.output_ids()
                .iter()
                .map(move |target| (op.id(), target.as_str()))
        })
    }

    pub fn topological_order(&self) -> Vec<&dyn Operator> {
        self.order
            .iter()
            .map(|&i| self.operators[i].as_ref())
            .collect()
    }

    /// Non-fatal findings from validation.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

pub fn validate_operators(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    diagnostics.extend(rule_unique_ids(operators));
    diagnostics.extend(rule_output_exists(operators));
    diagnostics.extend(rule_target_can_process(operators));
    diagnostics.extend(rule_can_output(operators));
    diagnostics.extend(rule_acyclic(operators));
    diagnostics.extend(rule_dangling_output(operators));

    diagnostics
}

fn index_by_id(operators: &[Box<dyn Operator>]) -> BTreeMap<&str, &dyn Operator> {
    operators
        .iter()
        .map(|op| (op.id(), op.as_ref()))
        .collect()
}

fn rule_unique_ids(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    let mut seen = BTreeSet::new();
    let mut diagnostics = Vec::new();
    for op in operators {
        if !seen.insert(op.id()) {
            diagnostics.push(
                Diagnostic::error(
                    "unique_ids",
                    format!("operator id '{}' is used more than once", op.id()),
                )
                .at_operator(op.id()),
            );
        }
    }
    diagnostics
}

fn rule_output_exists(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    let by_id = index_by_id(operators);
    let mut diagnostics = Vec::new();
    for op in operators {
        for target in op.output_ids() {
            if !by_id.contains_key(target.as_str()) {
                diagnostics.push(
                    Diagnostic::error(
                        "output_exists",
                        format!("operator '{target}' does not exist"),
                    )
                    .at_edge(op.id(), target.clone()),
                );
            }
        }
    }
    diagnostics
}

fn rule_target_can_process(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    let by_id = index_by_id(operators);
    let mut diagnostics = Vec::new();
    for op in operators {
        for target in op.output_ids() {
            let Some(target_op) = by_id.get(target.as_str()) else {
                continue;
            };
            if !target_op.can_process() {
                diagnostics.push(
                    Diagnostic::error(
                        "target_can_process",
                        format!("operator '{target}' can not process entries"),
                    )
                    .at_edge(op.id(), target.clone()),
                );
            }
        }
    }
    diagnostics
}

fn rule_can_output(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    operators
        .iter()
        .filter(|op| !op.can_output() && !op.output_ids().is_empty())
        .map(|op| {
            Diagnostic::error(
                "can_output",
                format!("operator '{}' can not output entries", op.id()),
            )
            .at_operator(op.id())
        })
        .collect()
}

fn rule_acyclic(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    match topological_order(operators) {
        Ok(_) => Vec::new(),
        Err(remaining) => vec![Diagnostic::error(
            "acyclic",
            format!(
                "pipeline has a circular dependency through: {}",
                remaining.join(", ")
            ),
        )],
    }
}

fn rule_dangling_output(operators: &[Box<dyn Operator>]) -> Vec<Diagnostic> {
    operators
        .iter()
        .filter(|op| op.can_output() && op.output_ids().is_empty())
        .map(|op| {
            Diagnostic::warning(
                "dangling_output",
                format!(
                    "operator '{}' has no outputs; its entries will be discarded",
                    op.id()
                ),
            )
            .at_operator(op.id())
        })
        .collect()
}

/// Kahn's algorithm over the forwarding edges. Ties are broken by assembly
/// order. Unknown targets are ignored. On a cycle, returns the ids that could
/// not be ordered.
fn topological_order(operators: &[Box<dyn Operator>]) -> Result<Vec<usize>, Vec<String>> {
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, op) in operators.iter().enumerate() {
        positions.entry(op.id()).or_insert(i);
    }

    let mut in_degree = vec![0usize; operators.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); operators.len()];
    for (i, op) in operators.iter().enumerate() {
        let targets: BTreeSet<usize> = op
            .output_ids()
            .iter()
            .filter_map(|target| positions.get(target.as_str()).copied())
            .collect();
        for target in targets {
            successors[i].push(target);
            in_degree[target] += 1;
        }
    }

    let mut ready: VecDeque<usize> = (0..operators.len())
        .filter(|&i| in_degree[i] == 0)
        .collect();
    let mut order = Vec::with_capacity(operators.len());
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &next in &successors[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() == operators.len() {
        return Ok(order);
    }

    let ordered: BTreeSet<usize> = order.into_iter().collect();
    Err((0..operators.len())
        .filter(|i| !ordered.contains(i))
        .map(|i| operators[i].id().to_string())
        .collect())
}
