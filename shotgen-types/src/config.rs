use serde::{Deserialize, Serialize};

/// 生成配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

/// 图像生成配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

impl ImageConfig {
    /// 固定宽高比（如 `"1:1"`）。
    pub fn with_aspect_ratio(aspect_ratio: impl Into<String>) -> Self {
        Self {
            aspect_ratio: Some(aspect_ratio.into()),
        }
    }
}
