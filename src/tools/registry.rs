//! Ordered, name-indexed collection of tools exposed to one conversation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::tool::ToolDescriptor;
use crate::convert::Record;
use crate::error::{BoxError, GenbindError, Result};
use crate::provider::ToolDefinition;

/// Tools available to the model, in registration order.
///
/// Names are unique; registering a second tool under an existing name is a
/// configuration error. Cloning is cheap and shares the descriptors.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<ToolDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bound tool.
    pub fn register(&mut self, tool: ToolDescriptor) -> Result<()> {
        if self.by_name.contains_key(tool.name()) {
            return Err(GenbindError::Configuration(format!(
                "tool '{}' is already registered",
                tool.name()
            )));
        }
        self.by_name.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(Arc::new(tool));
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, tool: ToolDescriptor) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Bind and register an async function.
    pub fn add_function<I, O, E, F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        function: F,
    ) -> Result<()>
    where
        I: Record,
        O: Record,
        E: Into<BoxError>,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        self.register(ToolDescriptor::bind(name, description, function)?)
    }

    /// Bind and register a synchronous, possibly blocking function.
    pub fn add_blocking_function<I, O, E, F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        function: F,
    ) -> Result<()>
    where
        I: Record,
        O: Record,
        E: Into<BoxError>,
        F: Fn(I) -> std::result::Result<O, E> + Send + Sync + 'static,
    {
        self.register(ToolDescriptor::bind_blocking(name, description, function)?)
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<ToolDescriptor>> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ToolDescriptor>> {
        self.tools.iter()
    }

    /// Transport-facing declarations, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.input_schema().clone(),
                response: Some(tool.output_schema().clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[derive(Debug, Default)]
    struct Msg {
        msg: String,
    }

    record! { Msg { msg } }

    fn echo(input: Msg) -> std::result::Result<Msg, BoxError> {
        Ok(input)
    }

    #[test]
    fn preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.add_blocking_function("b", "second letter", echo).unwrap();
        registry.add_blocking_function("a", "first letter", echo).unwrap();

        let names: Vec<_> = registry.iter().map(|tool| tool.name().to_string()).collect();

        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().description(), "first letter");
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected_at_registration() {
        let mut registry = ToolRegistry::new();
        registry.add_blocking_function("echo", "", echo).unwrap();

        let err = registry.add_blocking_function("echo", "", echo).unwrap_err();

        assert!(matches!(err, GenbindError::Configuration(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn definitions_carry_both_schemas() {
        let registry = ToolRegistry::new()
            .with(ToolDescriptor::bind_blocking("echo", "Echo a message", echo).unwrap())
            .unwrap();

        let definitions = registry.definitions();

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "echo");
        assert_eq!(definitions[0].parameters["properties"]["msg"]["type"], "string");
        assert!(definitions[0].response.is_some());
    }
}
