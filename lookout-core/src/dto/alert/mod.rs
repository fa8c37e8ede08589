//! Alert channel DTOs

use serde::{Deserialize, Serialize};

/// Telegram `sendMessage` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessage {
    pub chat_id: String,
    pub text: String,
}
