use serde::{Deserialize, Serialize};

pub const DEFAULT_FORMAT: &str = "email";

// POST /api/generate request body
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl GenerateRequest {
    // Input text, None when missing or empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    pub fn format_name(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }
}

// POST /api/generate success body
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerateResponse {
    pub output: Vec<String>,
}
