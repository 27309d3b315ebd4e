use crate::Operator;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Maps the namespaced id of a specification that built several operators to
/// the id of the first operator it built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryPointIndex {
    entries: BTreeMap<String, String>,
}

impl EntryPointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec_id: impl Into<String>, entry_id: impl Into<String>) {
        self.entries.insert(spec_id.into(), entry_id.into());
    }

    pub fn entry_for(&self, spec_id: &str) -> Option<&str> {
        self.entries.get(spec_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wires the flattened operator sequence.
///
/// Every operator except the last one either gets its successor as the single
/// output, when it declared none, or has each declared output that names a
/// multi-operator spec swapped for that spec's entry operator. Operators whose
/// outputs reference no such spec are left untouched.
pub fn set_output_ids(operators: &mut [Box<dyn Operator>], index: &EntryPointIndex) {
    for i in 0..operators.len().saturating_sub(1) {
        if operators[i].output_ids().is_empty() {
            let next_id = operators[i + 1].id().to_string();
            trace!(operator = operators[i].id(), output = %next_id, "default output");
            operators[i].set_output_ids(vec![next_id]);
            continue;
        }

        let op = &mut operators[i];
        let mut plugin_found = false;
        let resolved: Vec<String> = op
            .output_ids()
            .iter()
            .map(|id| match index.entry_for(id) {
                Some(entry_id) => {
                    plugin_found = true;
                    debug!(operator = op.id(), plugin = %id, entry = entry_id, "resolved plugin output");
                    entry_id.to_string()
                }
                None => id.clone(),
            })
            .collect();

        if plugin_found {
            op.set_output_ids(resolved);
        }
    }
}
