//! Tax Assistant
//!
//! One question in, one answer out. The answer comes from an
//! OpenAI-compatible chat completions endpoint; failures are reported once
//! and never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AssistantConfig;
use crate::error::DomainError;

pub const SYSTEM_PROMPT: &str = "Answer this tax question clearly and simply.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
}

impl Question {
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssistantError {
    #[error("Digite uma pergunta")]
    EmptyQuestion,

    #[error("Assistente não configurado: chave de API ausente")]
    MissingApiKey,

    #[error("Falha na comunicação com o assistente: {0}")]
    Network(String),

    #[error("Serviço do assistente respondeu {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Resposta inesperada do assistente: {0}")]
    InvalidResponse(String),
}

impl From<AssistantError> for DomainError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyQuestion => {
                DomainError::InvalidInput(crate::validation::FieldErrors::single("question", err.to_string()))
            }
            other => DomainError::ExternalService(other.to_string()),
        }
    }
}

/// Anything that can answer a tax question
#[async_trait(?Send)]
pub trait AnswerService {
    async fn answer(&self, question: &Question) -> Result<Answer, AssistantError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, question: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: question,
            },
        ],
    }
}

fn parse_response(body: &str) -> Result<Answer, AssistantError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| Answer {
            answer: content.trim().to_string(),
        })
        .filter(|answer| !answer.answer.is_empty())
        .ok_or_else(|| AssistantError::InvalidResponse("no answer in response".into()))
}

/// Trimmed question text, or `EmptyQuestion`
pub fn check_question(question: &Question) -> Result<&str, AssistantError> {
    let text = question.question.trim();
    if text.is_empty() {
        Err(AssistantError::EmptyQuestion)
    } else {
        Ok(text)
    }
}

pub struct HttpAnswerService {
    client: Client,
    config: AssistantConfig,
}

impl HttpAnswerService {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait(?Send)]
impl AnswerService for HttpAnswerService {
    async fn answer(&self, question: &Question) -> Result<Answer, AssistantError> {
        let text = check_question(question)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AssistantError::MissingApiKey)?;

        log::info!("Asking assistant ({} chars)", text.len());
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&build_request(&self.config.model, text))
            .send()
            .await
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Network(e.to_string()))?;
        if !status.is_success() {
            log::warn!("Assistant returned {}", status);
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_prompt_template() {
        let request = build_request("gpt-4o-mini", "O que é DIFAL?");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["content"], "O que é DIFAL?");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" DIFAL é a diferença. "}}]}"#;
        assert_eq!(parse_response(body).unwrap().answer, "DIFAL é a diferença.");
        assert!(matches!(
            parse_response(r#"{"choices":[]}"#),
            Err(AssistantError::InvalidResponse(_))
        ));
        assert!(matches!(parse_response("oops"), Err(AssistantError::InvalidResponse(_))));
    }

    #[test]
    fn test_empty_question_rejected() {
        assert_eq!(check_question(&Question::new("   ")), Err(AssistantError::EmptyQuestion));
        assert_eq!(check_question(&Question::new(" ICMS? ")), Ok("ICMS?"));
    }

    #[tokio::test]
    async fn test_empty_question_never_reaches_network() {
        let service = HttpAnswerService::new(AssistantConfig {
            endpoint: "http://127.0.0.1:9/unreachable".into(),
            api_key: Some("sk-test".into()),
            ..AssistantConfig::default()
        });
        let result = service.answer(&Question::new("")).await;
        assert_eq!(result, Err(AssistantError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let service = HttpAnswerService::new(AssistantConfig::default());
        let result = service.answer(&Question::new("O que é ISS?")).await;
        assert_eq!(result, Err(AssistantError::MissingApiKey));
    }
}
