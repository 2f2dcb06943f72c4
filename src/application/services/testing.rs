//! Test doubles shared by the service tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::outbound::{LlmPort, LlmRequest, LlmResponse, TokenUsage};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ScriptedLlmError(pub String);

/// LLM that answers from a fixed script and records every request
#[derive(Default)]
pub struct ScriptedLlm {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    type Error = ScriptedLlmError;

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, Self::Error> {
        let model = request.model.clone().unwrap_or_else(|| "scripted".to_string());
        self.requests.lock().unwrap().push(request);

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));

        next.map(|content| LlmResponse {
            content,
            model,
            finish_reason: Some("stop".to_string()),
            usage: TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 30,
            },
        })
        .map_err(ScriptedLlmError)
    }
}
