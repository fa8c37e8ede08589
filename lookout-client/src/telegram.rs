//! Telegram bot client used for operator alerts

use crate::error_from_response;
use crate::error::Result;
use lookout_core::dto::alert::SendMessage;
use reqwest::Client;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Sends plain text messages to one Telegram chat
#[derive(Debug, Clone)]
pub struct TelegramClient {
    base_url: String,
    bot_token: String,
    chat_id: String,
    client: Client,
}

impl TelegramClient {
    /// Create a client for the public Telegram API
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>, client: Client) -> Self {
        Self::with_base_url(TELEGRAM_API_URL, bot_token, chat_id, client)
    }

    /// Create a client against a custom API endpoint (self-hosted bot API, tests)
    pub fn with_base_url(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        }
    }

    /// Post a message to the configured chat
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: self.chat_id.clone(),
                text: text.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_message_posts_chat_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(json!({ "chat_id": "42", "text": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url(server.uri(), "123:abc", "42", Client::new());
        client.send_message("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_message_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url(server.uri(), "t", "42", Client::new());
        let err = client.send_message("hello").await.unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 403, .. }));
    }
}
