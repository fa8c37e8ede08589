//! Lookout HTTP Clients
//!
//! Small, typed HTTP clients for the two remote systems the profile service
//! talks to:
//! - the scraping actor API (start a run, poll its status, read its dataset)
//! - the Telegram bot API (operator alerts)
//!
//! # Example
//!
//! ```no_run
//! use lookout_client::ActorClient;
//!
//! #[tokio::main]
//! async fn main() -> lookout_client::Result<()> {
//!     let client = ActorClient::new("https://api.apify.com", "token", "actor~id");
//!
//!     let run = client.start_run("nasa").await?;
//!     let status = client.run_status(&run.run_id).await?;
//!     println!("run {} is {}", run.run_id, status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod datasets;
mod runs;
mod telegram;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use telegram::TelegramClient;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the scraping actor API
///
/// Cheap to clone; the underlying `reqwest::Client` is shared between clones
/// and safe to use from concurrent lookups.
#[derive(Debug, Clone)]
pub struct ActorClient {
    /// Base URL of the actor platform (e.g., "https://api.apify.com")
    base_url: String,
    /// API token sent as the `token` query parameter
    token: String,
    /// Actor to start runs of
    actor_id: String,
    /// HTTP client instance
    client: Client,
}

impl ActorClient {
    /// Create a new actor client with a default HTTP client
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self::with_client(base_url, token, actor_id, Client::new())
    }

    /// Create a new actor client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        actor_id: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            actor_id: actor_id.into(),
            client,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Any non-2xx status becomes `ClientError::ApiError` carrying the body text.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        parse_json(response).await
    }
}

/// Turns a rejected response into an `ApiError`
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ClientError::api_error(status.as_u16(), error_text)
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
