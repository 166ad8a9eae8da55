use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatRequest, CompletionProvider};
use crate::errors::{GatewayError, GatewayResult};

/// Any endpoint speaking the OpenAI chat-completions dialect (Groq, OpenAI).
pub struct OpenAiCompatible {
    label: String,
    base_url: String,
    client: Client,
}

impl OpenAiCompatible {
    pub fn new(label: &str, base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            label: label.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: [Msg<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[async_trait]
impl CompletionProvider for OpenAiCompatible {
    async fn complete(&self, api_key: &str, req: &ChatRequest) -> GatewayResult<String> {
        let body = ChatBody {
            model: &req.model,
            messages: [
                Msg { role: "system", content: &req.system },
                Msg { role: "user", content: &req.user },
            ],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            response_format: req.json_mode.then_some(ResponseFormat { r#type: "json_object" }),
        };

        tracing::debug!(provider = %self.label, model = %req.model, "POST {}", self.endpoint());

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            tracing::error!(provider = %self.label, %status, body = %text, "upstream API error");
            return Err(GatewayError::upstream(status.as_u16(), &self.label));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Content(format!("failed to parse {} response: {e}", self.label)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::Content(format!("{} response has no message content", self.label)))
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Seen {
        body: Arc<Mutex<Option<Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    /// Spins up a local upstream answering every call with `status` + `reply`.
    async fn stub_upstream(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        *seen.body.lock().unwrap() = Some(body);
                        *seen.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        (status, Json(reply))
                    }
                }),
            )
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), seen)
    }

    fn chat(json_mode: bool) -> ChatRequest {
        ChatRequest {
            model: "llama-3.3-70b-versatile".into(),
            system: "sys".into(),
            user: "usr".into(),
            temperature: 0.7,
            max_tokens: 4096,
            json_mode,
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content_and_sends_expected_body() {
        let (base, seen) = stub_upstream(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": "{\"ok\":true}" } }] }),
        )
        .await;
        let p = OpenAiCompatible::new("Groq", &base, None).unwrap();

        let content = p.complete("secret", &chat(true)).await.unwrap();
        assert_eq!(content, "{\"ok\":true}");

        let body = seen.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(seen.auth.lock().unwrap().as_deref(), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn response_format_omitted_without_json_mode() {
        let (base, seen) = stub_upstream(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "content": "[]" } }] }),
        )
        .await;
        let p = OpenAiCompatible::new("Groq", &base, None).unwrap();
        p.complete("k", &chat(false)).await.unwrap();
        let body = seen.body.lock().unwrap().clone().unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn non_success_status_becomes_upstream_error() {
        let (base, _) = stub_upstream(StatusCode::UNAUTHORIZED, json!({ "error": "bad key" })).await;
        let p = OpenAiCompatible::new("Groq", &base, None).unwrap();
        match p.complete("k", &chat(true)).await {
            Err(GatewayError::Upstream { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Groq API Error: 401");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_a_content_error() {
        let (base, _) = stub_upstream(StatusCode::OK, json!({ "choices": [] })).await;
        let p = OpenAiCompatible::new("Groq", &base, None).unwrap();
        assert!(matches!(p.complete("k", &chat(true)).await, Err(GatewayError::Content(_))));
    }
}
