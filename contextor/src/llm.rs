//! Chat model seam: the pipeline only needs "prompt in, completion out".

use std::{future::Future, pin::Pin};

use ai_llm_service::LlmServiceProfiles;

use crate::error::ContextorError;

/// A language model that completes a single prompt.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>>;

    /// Model identifier shown by status reports.
    fn model_name(&self) -> String;
}

impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>> {
        Box::pin(async move {
            self.generate(prompt, None)
                .await
                .map_err(|e| ContextorError::Generation(e.to_string()))
        })
    }

    fn model_name(&self) -> String {
        self.chat_model().to_string()
    }
}
