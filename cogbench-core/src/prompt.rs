//! Prompt template loading and rendering.

use crate::error::ConfigError;
use std::path::Path;
use tokio::fs;

/// A prompt template with `{premise}` and `{statement}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Create a template from raw text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Load a template from a file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::TemplateNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).await?;
        Ok(Self { text })
    }

    /// Render the template for one example.
    pub fn render(&self, premise: &str, statement: &str) -> String {
        self.text
            .replace("{premise}", premise)
            .replace("{statement}", statement)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
