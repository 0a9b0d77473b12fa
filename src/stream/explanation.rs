use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionType {
    StreamSource,
    Datastore,
}

impl ExpressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionType::StreamSource => "stream_source",
            ExpressionType::Datastore => "datastore",
        }
    }
}

/// Human-readable description of a stream node and what it sends downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub node_id: String,
    pub function_name: String,
    pub implementing_class: String,
    pub expression_type: ExpressionType,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Explanation>,
}

impl Explanation {
    pub fn new(node_id: impl Into<String>, expression_type: ExpressionType) -> Self {
        Self {
            node_id: node_id.into(),
            function_name: String::new(),
            implementing_class: String::new(),
            expression_type,
            expression: String::new(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: Explanation) {
        self.children.push(child);
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{}- {} [{}] ({})", pad, self.function_name, self.expression_type.as_str(), self.node_id)?;
        writeln!(f, "{}  implementation: {}", pad, self.implementing_class)?;
        writeln!(f, "{}  expression: {}", pad, self.expression)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
