//! Models API surface.

use std::sync::Arc;

use serde_json::Value;
use shotgen_types::content::Content;
use shotgen_types::models::{GenerateContentConfig, GenerateContentRequest};
use shotgen_types::response::GenerateContentResponse;

use crate::client::ClientInner;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct Models {
    pub(crate) inner: Arc<ClientInner>,
}

impl Models {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 生成内容（默认配置）。
    pub async fn generate_content(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
    ) -> Result<GenerateContentResponse> {
        self.generate_content_with_config(model, contents, GenerateContentConfig::default())
            .await
    }

    /// 生成内容（自定义配置）。
    pub async fn generate_content_with_config(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
        config: GenerateContentConfig,
    ) -> Result<GenerateContentResponse> {
        let model = model.into();
        if contents.is_empty() {
            return Err(Error::InvalidConfig {
                message: "contents must not be empty".into(),
            });
        }
        let request = GenerateContentRequest::new(contents, config);
        let url = build_model_method_url(&self.inner, &model, "generateContent");

        let request = self.inner.http.post(url).json(&request);
        let response = self.inner.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(status, response.text().await.unwrap_or_default()));
        }
        let value = response.json::<Value>().await?;
        serde_json::from_value(value).map_err(|err| Error::Parse {
            message: format!("GenerateContentResponse parse failed: {err}"),
        })
    }
}

fn transform_model_name(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn build_model_method_url(inner: &ClientInner, model: &str, method: &str) -> String {
    let model = transform_model_name(model);
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    format!("{base}{version}/{model}:{method}")
}
