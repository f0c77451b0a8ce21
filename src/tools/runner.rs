//! Tool runner - manages and executes tools

use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use crate::Result;
use crate::error::Error;
use super::Tool;
use super::school::{
    ClassScheduleTool, SchoolRecords, StudentAttendanceTool, StudentDataTool, StudentResultTool,
};
use super::weather::WeatherTool;

/// Tool definition for LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool runner manages registered tools and executes them
pub struct ToolRunner {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRunner {
    /// Create an empty tool runner
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a tool runner with the school lookups and the weather tool
    pub fn new_with_defaults() -> Self {
        let records = Arc::new(SchoolRecords::demo());
        let mut runner = Self::new();

        runner.register(ClassScheduleTool::new(records.clone()));
        runner.register(StudentAttendanceTool::new(records.clone()));
        runner.register(StudentDataTool::new(records.clone()));
        runner.register(StudentResultTool::new(records));
        runner.register(WeatherTool);

        runner
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    /// Get tool definitions for LLM, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values()
            .map(|t| t.to_definition())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, params: Value) -> Result<String> {
        let tool = self.tools.get(name)
            .ok_or_else(|| Error::Tool(format!("Unknown tool: {}", name)))?;

        info!("Calling tool {} with {}", name, params);
        tool.execute(params).await
    }

    /// Step label for a tool, falling back to the name
    pub fn label(&self, name: &str) -> String {
        self.tools
            .get(name)
            .map(|t| t.step_label().to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// Check if a tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List registered tool names, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::DummyTool;

    #[tokio::test]
    async fn test_tool_runner_register_and_execute() {
        let mut runner = ToolRunner::new();
        runner.register(DummyTool {
            name: "test_tool".to_string(),
            result: "success".to_string(),
        });

        assert!(runner.has("test_tool"));

        let result = runner.execute("test_tool", serde_json::json!({})).await.unwrap();
        assert_eq!(result, "success");
    }

    #[tokio::test]
    async fn test_tool_runner_unknown_tool() {
        let runner = ToolRunner::new();
        let result = runner.execute("unknown", serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::Tool(_))));
    }

    #[test]
    fn test_default_tools() {
        let runner = ToolRunner::new_with_defaults();
        assert_eq!(
            runner.tool_names(),
            vec![
                "get_class_schedule",
                "get_student_attendance",
                "get_student_data",
                "get_student_result",
                "get_weather",
            ]
        );

        let defs = runner.definitions();
        assert_eq!(defs.len(), 5);
        assert_eq!(defs[0].name, "get_class_schedule");
        assert_eq!(defs[2].parameters["required"][0], "student_id");
    }

    #[test]
    fn test_labels() {
        let runner = ToolRunner::new_with_defaults();
        assert_eq!(runner.label("get_weather"), "weather tool");
        assert_eq!(runner.label("get_student_data"), "student data tool");
        assert_eq!(runner.label("nope"), "nope");
    }
}
