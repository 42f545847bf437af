//! Mock Telegram API Server for testing
//!
//! A wiremock server answering the few Bot API methods the transport uses,
//! so [`TelegramTransport`] can be exercised over real HTTP.

use serde_json::{json, Value};
use teloxide::Bot;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};
use MenuGate::services::TelegramTransport;
use super::TEST_TOKEN;

/// Mock Telegram API server for testing
pub struct TelegramMockServer {
    pub server: MockServer,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockResponseConfig {
    pub success: bool,
    pub delay_ms: Option<u64>,
    pub custom_response: Option<Value>,
}

impl Default for MockResponseConfig {
    fn default() -> Self {
        Self {
            success: true,
            delay_ms: None,
            custom_response: None,
        }
    }
}

impl TelegramMockServer {
    /// Create a new mock Telegram API server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Transport whose bot talks to this server
    pub fn transport(&self) -> TelegramTransport {
        let api_url = url::Url::parse(&self.server.uri()).expect("Mock server uri is a valid url");
        TelegramTransport::new(Bot::new(TEST_TOKEN).set_api_url(api_url))
    }

    fn method_path(name: &str) -> String {
        // teloxide requests methods by their PascalCase payload name (`SendMessage`)
        let mut chars = name.chars();
        let name: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("/bot{}/{}", TEST_TOKEN, name)
    }

    async fn mount(&self, api_method: &str, body: Value, delay_ms: Option<u64>) {
        let mut response = ResponseTemplate::new(200).set_body_json(body);
        if let Some(delay) = delay_ms {
            response = response.set_delay(std::time::Duration::from_millis(delay));
        }

        Mock::given(method("POST"))
            .and(path(Self::method_path(api_method)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Setup mock for sendMessage endpoint
    pub async fn mock_send_message(&self, config: MockResponseConfig) {
        let body = config.custom_response.unwrap_or_else(|| {
            if config.success {
                json!({ "ok": true, "result": private_message(123, 42, "Test message") })
            } else {
                api_error(400, "Bad Request: chat not found")
            }
        });
        self.mount("sendMessage", body, config.delay_ms).await;
    }

    /// editMessageText answering "message is not modified"
    pub async fn mock_edit_not_modified(&self) {
        let body = api_error(
            400,
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same as a current content and reply markup of the message",
        );
        self.mount("editMessageText", body, None).await;
    }

    pub async fn mock_edit_error(&self, description: &str) {
        self.mount("editMessageText", api_error(400, description), None).await;
    }

    /// getChatMember reporting the given status (`member`, `left`)
    pub async fn mock_chat_member(&self, user_id: i64, status: &str) {
        let body = json!({
            "ok": true,
            "result": {
                "user": { "id": user_id, "is_bot": false, "first_name": "Test" },
                "status": status
            }
        });
        self.mount("getChatMember", body, None).await;
    }

    pub async fn mock_chat_member_error(&self, description: &str) {
        self.mount("getChatMember", api_error(400, description), None).await;
    }

    pub async fn mock_copy_message(&self, message_id: i32) {
        let body = json!({ "ok": true, "result": { "message_id": message_id } });
        self.mount("copyMessage", body, None).await;
    }

    /// Number of requests the server received for a method
    pub async fn request_count(&self, api_method: &str) -> usize {
        let wanted = Self::method_path(api_method);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == wanted)
            .count()
    }

    /// JSON body of the last request for a method
    pub async fn last_request_body(&self, api_method: &str) -> Option<Value> {
        let wanted = Self::method_path(api_method);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .rev()
            .find(|r| r.url.path() == wanted)
            .and_then(|r| serde_json::from_slice(&r.body).ok())
    }
}

fn private_message(message_id: i32, chat_id: i64, text: &str) -> Value {
    json!({
        "message_id": message_id,
        "from": { "id": chat_id, "is_bot": false, "first_name": "Test", "username": "testuser" },
        "chat": { "id": chat_id, "first_name": "Test", "username": "testuser", "type": "private" },
        "date": 1_640_995_200,
        "text": text
    })
}

fn api_error(code: u16, description: &str) -> Value {
    json!({ "ok": false, "error_code": code, "description": description })
}
