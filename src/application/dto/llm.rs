//! Free-form generation and connection test payloads
//!
//! Provider failures are reported in the body (`success: false`) rather than
//! through the HTTP status.

use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::TokenUsage;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTextRequestDto {
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateTextResponseDto {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateTextResponseDto {
    pub fn ok(text: String, usage: TokenUsage) -> Self {
        Self {
            success: true,
            text: Some(text),
            usage: Some(usage),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            usage: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionTestResponseDto {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionTestResponseDto {
    pub fn ok(message: String, tokens_used: u32) -> Self {
        Self {
            success: true,
            message: Some(message),
            tokens_used: Some(tokens_used),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            tokens_used: None,
            error: Some(error.into()),
        }
    }
}
