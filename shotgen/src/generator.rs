//! Shot image generation on top of the Models API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use shotgen_types::config::{GenerationConfig, ImageConfig};
use shotgen_types::content::{Content, Part, Role};
use shotgen_types::models::GenerateContentConfig;
use shotgen_types::response::GenerateContentResponse;
use shotgen_types::shots::ShotKind;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::prompts;
use crate::reference::ReferenceImage;

/// 默认图像模型。
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// 所有镜头统一使用方图。
pub const SQUARE_ASPECT_RATIO: &str = "1:1";

const IMAGE_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// 单张镜头的生成输入（调用发起时的快照）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateShot {
    pub kind: ShotKind,
    pub product_name: String,
    pub reference: Option<ReferenceImage>,
}

impl GenerateShot {
    pub fn new(
        kind: ShotKind,
        product_name: impl Into<String>,
        reference: Option<ReferenceImage>,
    ) -> Self {
        Self {
            kind,
            product_name: product_name.into(),
            reference,
        }
    }

    /// 最终发送的提示词。
    #[must_use]
    pub fn prompt(&self) -> String {
        prompts::render(self.kind, &self.product_name, self.reference.is_some())
    }
}

/// 生成结果图像。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Bytes,
}

impl GeneratedImage {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// 编码为可直接展示的 data URL。
    ///
    /// 始终标记为 `image/png`；接口返回的原始类型保留在 `mime_type` 上。
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("{IMAGE_DATA_URL_PREFIX}{}", STANDARD.encode(&self.data))
    }
}

/// 图像生成接口：一个输入，一张图或一个错误。
///
/// 实现方不做内部重试。
pub trait ImageGenerator: Send + Sync {
    fn generate<'a>(&'a self, request: &'a GenerateShot) -> BoxFuture<'a, Result<GeneratedImage>>;
}

/// 基于 Gemini `generateContent` 的生成器。
#[derive(Clone)]
pub struct GeminiImageGenerator {
    client: Client,
    model: String,
}

impl GeminiImageGenerator {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// 从环境变量创建；`SHOTGEN_MODEL` 可覆盖模型。
    ///
    /// # Errors
    /// 当客户端配置缺失或无效时返回错误。
    pub fn from_env() -> Result<Self> {
        let generator = Self::new(Client::from_env()?);
        Ok(match std::env::var("SHOTGEN_MODEL") {
            Ok(model) if !model.trim().is_empty() => generator.with_model(model.trim()),
            _ => generator,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_shot(&self, request: &GenerateShot) -> Result<GeneratedImage> {
        tracing::debug!(
            kind = %request.kind,
            model = %self.model,
            reference = request.reference.is_some(),
            "requesting shot image"
        );
        let response = self
            .client
            .models()
            .generate_content_with_config(
                self.model.as_str(),
                vec![build_contents(request)],
                image_config(),
            )
            .await?;
        extract_image(&response)
    }
}

impl ImageGenerator for GeminiImageGenerator {
    fn generate<'a>(&'a self, request: &'a GenerateShot) -> BoxFuture<'a, Result<GeneratedImage>> {
        Box::pin(self.generate_shot(request))
    }
}

/// 参考图在前、提示词在后。
fn build_contents(request: &GenerateShot) -> Content {
    let mut parts = Vec::with_capacity(2);
    if let Some(reference) = &request.reference {
        parts.push(Part::inline_data(
            reference.data().to_vec(),
            reference.mime_type(),
        ));
    }
    parts.push(Part::text(request.prompt()));
    Content::from_parts(parts, Role::User)
}

fn image_config() -> GenerateContentConfig {
    GenerateContentConfig {
        generation_config: Some(GenerationConfig {
            image_config: Some(ImageConfig::with_aspect_ratio(SQUARE_ASPECT_RATIO)),
        }),
    }
}

fn extract_image(response: &GenerateContentResponse) -> Result<GeneratedImage> {
    if let Some(blob) = response.first_inline_image() {
        return Ok(GeneratedImage::new(blob.data.clone(), blob.mime_type.clone()));
    }

    let mut detail = String::new();
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason)
    {
        detail = format!(" (prompt blocked: {reason:?})");
    } else if let Some(reason) = response.finish_reason() {
        detail = format!(" (finish reason: {reason:?})");
    }
    Err(Error::NoImage { detail })
}
