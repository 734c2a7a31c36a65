use serde::{Deserialize, Serialize};

use crate::content::{Blob, Content};
use crate::enums::{BlockedReason, FinishReason};

/// 生成内容响应。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl GenerateContentResponse {
    /// 提取第一个候选的文本。
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.first_content()
            .and_then(Content::first_text)
            .map(ToString::to_string)
    }

    /// 提取第一个候选中第一段内联图像数据。
    #[must_use]
    pub fn first_inline_image(&self) -> Option<&Blob> {
        self.first_content().and_then(Content::first_inline_data)
    }

    /// 第一个候选的结束原因。
    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason)
    }

    fn first_content(&self) -> Option<&Content> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
    }
}

/// 响应候选。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// Prompt 反馈。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockedReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason_message: Option<String>,
}

/// Token 用量。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates_token_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_comes_from_first_candidate_only() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "no picture, sorry"}]},
                 "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "AAE="}}
                ]}}
            ]
        }))
        .unwrap();
        assert!(response.first_inline_image().is_none());
        assert_eq!(response.text().as_deref(), Some("no picture, sorry"));
        assert_eq!(response.finish_reason(), Some(FinishReason::Stop));
    }

    #[test]
    fn empty_response_has_no_image() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(response.first_inline_image().is_none());
        assert_eq!(
            response.prompt_feedback.unwrap().block_reason,
            Some(BlockedReason::Safety)
        );
    }
}
