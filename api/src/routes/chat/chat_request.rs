use serde::{Deserialize, Serialize};

/// Request payload for /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Visitor's question. Missing and blank are both rejected.
    #[serde(default)]
    pub question: String,
    /// Stream the answer as paced plain text instead of one JSON payload.
    #[serde(default, alias = "wantsStreaming")]
    pub stream: bool,
}

/// Non-streaming response payload for /api/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_flag_accepts_both_names() {
        let a: ChatRequest = serde_json::from_str(r#"{"question":"hi","stream":true}"#).unwrap();
        let b: ChatRequest = serde_json::from_str(r#"{"question":"hi","wantsStreaming":true}"#).unwrap();
        let c: ChatRequest = serde_json::from_str(r#"{"question":"hi"}"#).unwrap();
        assert!(a.stream && b.stream && !c.stream);
    }

    #[test]
    fn missing_question_deserializes_empty() {
        let r: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(r.question.is_empty());
    }
}
