use crate::plugin::{self, MAX_PLUGIN_DEPTH};
use crate::{OperatorBuilder, OperatorError, PipelineConfig, PipelineError, operators};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub type BuilderFactory =
    fn(&DecodeContext<'_>, Value) -> Result<Box<dyn OperatorBuilder>, OperatorError>;

/// A pipeline document: a bare list of operator objects or `{"pipeline": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PipelineDocument {
    List(Vec<Value>),
    Wrapped { pipeline: Vec<Value> },
}

impl PipelineDocument {
    fn into_entries(self) -> Vec<Value> {
        match self {
            Self::List(entries) | Self::Wrapped { pipeline: entries } => entries,
        }
    }
}

/// Maps operator type names to the factories that decode them.
#[derive(Clone, Debug, Default)]
pub struct BuilderRegistry {
    factories: BTreeMap<String, BuilderFactory>,
    plugins: BTreeMap<String, Vec<Value>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(
        &mut self,
        operator_type: impl Into<String>,
        factory: BuilderFactory,
    ) -> Option<BuilderFactory> {
        self.factories.insert(operator_type.into(), factory)
    }

    /// Registers a reusable sub-pipeline addressable as `type: <name>`.
    /// Names already taken by a registered operator type are rejected.
    pub fn register_plugin(
        &mut self,
        name: impl Into<String>,
        template: Vec<Value>,
    ) -> Result<Option<Vec<Value>>, PipelineError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(PipelineError::Config(format!(
                "plugin '{name}' conflicts with the operator type of the same name"
            )));
        }
        Ok(self.plugins.insert(name, template))
    }

    pub fn register_plugin_source(
        &mut self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<(), PipelineError> {
        let template = parse_document(source)?;
        self.register_plugin(name, template)?;
        Ok(())
    }

    pub fn plugin_template(&self, name: &str) -> Option<&[Value]> {
        self.plugins.get(name).map(Vec::as_slice)
    }

    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .factories
            .keys()
            .chain(self.plugins.keys())
            .map(String::as_str)
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    pub fn decoder(&self) -> DecodeContext<'_> {
        DecodeContext {
            registry: self,
            depth: 0,
        }
    }

    pub fn parse_pipeline(&self, source: &str) -> Result<PipelineConfig, PipelineError> {
        self.decoder().decode_pipeline(parse_document(source)?)
    }

    pub fn pipeline_from_value(&self, value: Value) -> Result<PipelineConfig, PipelineError> {
        let entries = PipelineDocument::deserialize(value)
            .map_err(|e| PipelineError::Config(e.to_string()))?
            .into_entries();
        self.decoder().decode_pipeline(entries)
    }

    pub fn decode_operator(&self, value: Value) -> Result<Box<dyn OperatorBuilder>, OperatorError> {
        self.decoder().decode_operator(value)
    }
}

/// Registry access while decoding, tracking how many plugin templates deep
/// the current entry sits.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext<'a> {
    pub registry: &'a BuilderRegistry,
    pub depth: usize,
}

impl<'a> DecodeContext<'a> {
    pub fn nested(&self) -> Result<Self, OperatorError> {
        if self.depth >= MAX_PLUGIN_DEPTH {
            return Err(OperatorError::MaxPluginDepth(MAX_PLUGIN_DEPTH));
        }
        Ok(Self {
            registry: self.registry,
            depth: self.depth + 1,
        })
    }

    pub fn decode_pipeline(&self, entries: Vec<Value>) -> Result<PipelineConfig, PipelineError> {
        let mut config = PipelineConfig::default();
        for (position, entry) in entries.into_iter().enumerate() {
            let label = entry_label(&entry, position);
            let builder = self
                .decode_operator(entry)
                .map_err(|source| PipelineError::build(label, source))?;
            config.push(builder);
        }
        Ok(config)
    }

    /// Decodes one operator object. A missing `id` defaults to the type name.
    pub fn decode_operator(&self, value: Value) -> Result<Box<dyn OperatorBuilder>, OperatorError> {
        let Value::Object(mut fields) = value else {
            return Err(OperatorError::invalid_field(
                "operator",
                "expected a JSON object",
            ));
        };

        let operator_type = match fields.get("type") {
            Some(Value::String(operator_type)) if !operator_type.trim().is_empty() => {
                operator_type.trim().to_string()
            }
            Some(_) => {
                return Err(OperatorError::invalid_field(
                    "type",
                    "expected a non-empty string",
                ));
            }
            None => return Err(OperatorError::MissingField("type".to_string())),
        };
        fields
            .entry("id")
            .or_insert_with(|| Value::String(operator_type.clone()));
        let value = Value::Object(fields);

        if let Some(factory) = self.registry.factories.get(&operator_type) {
            return factory(self, value);
        }
        if let Some(template) = self.registry.plugins.get(&operator_type) {
            return plugin::decode_template_plugin(self, value, template);
        }
        Err(OperatorError::UnknownType(operator_type))
    }
}

/// Registry with every built-in operator type and the inline `plugin` type.
pub fn builtin_registry() -> BuilderRegistry {
    let mut registry = BuilderRegistry::new();
    operators::register_builtins(&mut registry);
    registry.register_type(plugin::INLINE_PLUGIN_TYPE, plugin::decode_inline_plugin);
    registry
}

fn parse_document(source: &str) -> Result<Vec<Value>, PipelineError> {
    serde_json::from_str::<PipelineDocument>(source)
        .map(PipelineDocument::into_entries)
        .map_err(|e| PipelineError::Config(e.to_string()))
}

fn entry_label(entry: &Value, position: usize) -> String {
    entry
        .get("id")
        .or_else(|| entry.get("type"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| format!("#{position}"))
}
