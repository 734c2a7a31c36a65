use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::content::Content;

/// `GenerateContent` 配置（不含 contents）。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// `GenerateContent` 请求体。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// 由 contents 与配置组装请求体。
    #[must_use]
    pub fn new(contents: Vec<Content>, config: GenerateContentConfig) -> Self {
        Self {
            contents,
            generation_config: config.generation_config,
        }
    }
}
