use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Path of the history file; `~` and `${VAR}` are expanded.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub max_turns: Option<usize>,
    #[serde(default)]
    pub context_turns: Option<usize>,
    #[serde(default)]
    pub refusal_marker: Option<String>,
    #[serde(default)]
    pub recall: Option<bool>,
}
