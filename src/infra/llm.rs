use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::{CompletionRequest, CompletionService};

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn completions_endpoint(base_url: &str) -> String {
        format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(
        &self,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> AppResult<Option<String>> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        };

        debug!(model = %request.model, "requesting chat completion");
        let response = self
            .http
            .post(Self::completions_endpoint(&self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call provider: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "provider responded with {status}: {body}"
            )));
        }

        let payload: ChatResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse provider response: {err}"))
        })?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".to_string(),
            system: "JSON only".to_string(),
            user: "extract this".to_string(),
            temperature: 0.1,
        }
    }

    #[tokio::test]
    async fn sends_messages_and_returns_first_choice() {
        let captured: Arc<Mutex<Option<(String, Value)>>> = Arc::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(captured): State<Arc<Mutex<Option<(String, Value)>>>>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        let auth = headers["authorization"].to_str().unwrap().to_string();
                        *captured.lock().unwrap() = Some((auth, body));
                        Json(json!({
                            "choices": [
                                {"message": {"role": "assistant", "content": "[]"}},
                                {"message": {"role": "assistant", "content": "ignored"}}
                            ]
                        }))
                    },
                ),
            )
            .with_state(captured.clone());
        let client = OpenAiClient::new(serve(router).await);

        let content = client
            .complete(&SecretString::from("sk-test"), &request())
            .await
            .unwrap();

        assert_eq!(content.as_deref(), Some("[]"));
        let (auth, body) = captured.lock().unwrap().take().unwrap();
        assert_eq!(auth, "Bearer sk-test");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "JSON only");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_content_is_none() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let client = OpenAiClient::new(serve(router).await);

        let content = client
            .complete(&SecretString::from("sk-test"), &request())
            .await
            .unwrap();
        assert_eq!(content, None);
    }

    #[tokio::test]
    async fn provider_error_status_is_reported() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let client = OpenAiClient::new(serve(router).await);

        let error = client
            .complete(&SecretString::from("sk-bad"), &request())
            .await
            .unwrap_err();
        match error {
            AppError::LanguageModel(message) => assert!(message.contains("invalid api key")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
