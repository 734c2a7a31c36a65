//! Reference photo loading.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::error::{Error, Result};

/// 未识别类型时使用的 MIME。
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// 用户提供的产品参考图。
///
/// 数据以 [`Bytes`] 保存，批量生成时每个请求克隆的是同一份缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    mime_type: String,
    data: Bytes,
}

impl ReferenceImage {
    /// 从原始字节创建。
    pub fn from_bytes(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// 解析 `data:<mime>;base64,<payload>` 形式的 data URL。
    ///
    /// # Errors
    /// 当不是 base64 data URL 或载荷无法解码时返回错误。
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url.trim().strip_prefix("data:").ok_or_else(|| Error::Parse {
            message: "reference image is not a data URL".into(),
        })?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| Error::Parse {
            message: "data URL has no payload".into(),
        })?;

        let mut params = header.split(';');
        let mime_type = params
            .next()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
            return Err(Error::Parse {
                message: "only base64 data URLs are supported".into(),
            });
        }

        let data = STANDARD
            .decode(payload.trim().as_bytes())
            .map_err(|err| Error::Parse {
                message: format!("invalid base64 in data URL: {err}"),
            })?;
        Ok(Self::from_bytes(data, mime_type))
    }

    /// 从文件读取，MIME 类型按扩展名推断。
    ///
    /// # Errors
    /// 当文件无法读取时返回错误。
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or(DEFAULT_MIME_TYPE);
        Ok(Self::from_bytes(data, mime_type))
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 编码为 data URL。
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}
