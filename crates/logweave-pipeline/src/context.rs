pub const ROOT_NAMESPACE: &str = "$";
const ABSOLUTE_PREFIX: &str = "$.";

/// Values shared by every builder during one assembly.
///
/// The context is never mutated once handed to a builder. Nested builds derive
/// a new context through the `with_*` methods, which copy every other field,
/// so a default output installed at the top is seen unchanged by all plugins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    pub namespace: String,
    pub default_output_ids: Vec<String>,
    pub plugin_depth: usize,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    pub fn new() -> Self {
        Self {
            namespace: ROOT_NAMESPACE.to_string(),
            default_output_ids: Vec::new(),
            plugin_depth: 0,
        }
    }

    /// Qualifies `id` with the current namespace. Ids that already start at
    /// the root (`$.`) are returned as-is.
    pub fn prepend_namespace(&self, id: &str) -> String {
        if id.starts_with(ABSOLUTE_PREFIX) {
            return id.to_string();
        }
        format!("{}.{}", self.namespace, id)
    }

    pub fn with_sub_namespace(&self, namespace: &str) -> Self {
        Self {
            namespace: self.prepend_namespace(namespace),
            ..self.clone()
        }
    }

    pub fn with_default_output_ids(&self, ids: Vec<String>) -> Self {
        Self {
            default_output_ids: ids,
            ..self.clone()
        }
    }

    pub fn with_incremented_depth(&self) -> Self {
        Self {
            plugin_depth: self.plugin_depth + 1,
            ..self.clone()
        }
    }
}
