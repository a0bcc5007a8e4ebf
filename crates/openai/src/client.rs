//! Chat-completions client.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use spellcheck_core::{CompletionRequest, Error, Result, TextCorrectionProvider};

use crate::config::OpenAiConfig;

/// [`TextCorrectionProvider`] backed by the OpenAI chat-completions API.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::ProviderError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

impl TextCorrectionProvider for OpenAiProvider {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_request(&self.config, request);

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .map_err(|e| Error::ProviderError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::ProviderError(format!("HTTP {}: {}", status, body)));
        }

        let text = response
            .text()
            .map_err(|e| Error::ProviderError(e.to_string()))?;
        reply_content(&text)
    }

    fn name(&self) -> &str {
        self.config.model()
    }
}

fn build_request<'a>(config: &'a OpenAiConfig, request: &'a CompletionRequest) -> ChatRequest<'a> {
    ChatRequest {
        model: config.model(),
        messages: [
            ChatMessage {
                role: "system",
                content: &request.system,
            },
            ChatMessage {
                role: "user",
                content: &request.user,
            },
        ],
        temperature: config.temperature(),
        max_tokens: config.max_tokens(),
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

/// Extract the first choice's message content from a response body.
fn reply_content(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| Error::InvalidReply(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::InvalidReply("response has no message content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Serve one canned HTTP response on a local port and return its base URL.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/v1", addr)
    }

    /// Read the request head and its body, as announced by Content-Length.
    fn read_request(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + body_len {
                    return;
                }
            }
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&chunk[..n]);
        }
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[test]
    fn test_request_body() {
        let config = OpenAiConfig::new("sk-test").with_max_tokens(500);
        let request = CompletionRequest {
            system: "sys".into(),
            user: "검사".into(),
        };

        let value = serde_json::to_value(build_request(&config, &request)).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "검사"}
                ],
                "temperature": 0.1f32,
                "max_tokens": 500,
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_reply_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"corrections\":[]}"},"finish_reason":"stop"}]}"#;
        assert_eq!(reply_content(body).unwrap(), r#"{"corrections":[]}"#);
    }

    #[test]
    fn test_reply_without_content() {
        assert!(matches!(
            reply_content(r#"{"choices":[]}"#),
            Err(Error::InvalidReply(_))
        ));
        assert!(matches!(
            reply_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(Error::InvalidReply(_))
        ));
        assert!(matches!(
            reply_content("<html>"),
            Err(Error::InvalidReply(_))
        ));
    }

    #[test]
    fn test_error_status_is_provider_error() {
        let base = serve_once(http_response("500 Internal Server Error", r#"{"error":"overloaded"}"#));
        let provider = OpenAiProvider::new(OpenAiConfig::new("k").with_base_url(base)).unwrap();

        match provider.complete(&CompletionRequest::spell_check("글자")) {
            Err(Error::ProviderError(message)) => {
                assert!(message.contains("500"), "{}", message);
                assert!(message.contains("overloaded"), "{}", message);
            }
            other => panic!("expected a provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_completion() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"corrections\":[]}"}}]
        })
        .to_string();
        let base = serve_once(http_response("200 OK", &body));
        let provider = OpenAiProvider::new(OpenAiConfig::new("k").with_base_url(base)).unwrap();

        let reply = provider.complete(&CompletionRequest::spell_check("글자")).unwrap();
        assert_eq!(reply, r#"{"corrections":[]}"#);
    }

    #[test]
    fn test_provider_name_is_model() {
        let provider = OpenAiProvider::new(OpenAiConfig::new("k").with_model("gpt-4o")).unwrap();
        assert_eq!(provider.name(), "gpt-4o");
    }
}
