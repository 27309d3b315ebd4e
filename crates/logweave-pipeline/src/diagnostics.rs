use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// What part of the wired pipeline a finding refers to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Pipeline,
    Operator { id: String },
    Edge { from: String, to: String },
}

/// One finding of pipeline validation, rendered as
/// `severity[rule] location: message`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn error(rule: &'static str, message: impl Into<String>) -> Self {
        Self::at_pipeline(rule, Severity::Error, message.into())
    }

    pub fn warning(rule: &'static str, message: impl Into<String>) -> Self {
        Self::at_pipeline(rule, Severity::Warning, message.into())
    }

    fn at_pipeline(rule: &'static str, severity: Severity, message: String) -> Self {
        Self {
            rule,
            severity,
            location: Location::Pipeline,
            message,
        }
    }

    pub fn at_operator(self, id: impl Into<String>) -> Self {
        Self {
            location: Location::Operator { id: id.into() },
            ..self
        }
    }

    pub fn at_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            location: Location::Edge {
                from: from.into(),
                to: to.into(),
            },
            ..self
        }
    }

    /// The operator the finding is reported against; for edges, the source.
    pub fn operator_id(&self) -> Option<&str> {
        match &self.location {
            Location::Pipeline => None,
            Location::Operator { id } => Some(id),
            Location::Edge { from, .. } => Some(from),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.rule)?;
        match &self.location {
            Location::Pipeline => {}
            Location::Operator { id } => write!(f, " {id}")?,
            Location::Edge { from, to } => write!(f, " {from} -> {to}")?,
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_operator_location_expected_id_before_message() {
        let diagnostic = Diagnostic::warning("dangling_output", "no outputs").at_operator("$.tail");
        assert_eq!(
            diagnostic.to_string(),
            "warning[dangling_output] $.tail: no outputs"
        );
    }

    #[test]
    fn display_edge_location_expected_arrow() {
        let diagnostic = Diagnostic::error("output_exists", "missing").at_edge("$.a", "$.b");
        assert_eq!(diagnostic.to_string(), "error[output_exists] $.a -> $.b: missing");
        assert_eq!(diagnostic.operator_id(), Some("$.a"));
    }

    #[test]
    fn display_pipeline_location_expected_no_subject() {
        let diagnostic = Diagnostic::error("acyclic", "cycle");
        assert_eq!(diagnostic.to_string(), "error[acyclic]: cycle");
        assert_eq!(diagnostic.operator_id(), None);
    }
}
