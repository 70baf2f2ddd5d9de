//! Chat message DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solace_core::conversation::{ChatMessage, Sender};

/// Persisted sender. `"ai"` is what earlier builds wrote for agent replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderDto {
    User,
    #[serde(alias = "ai")]
    Agent,
}

impl From<SenderDto> for Sender {
    fn from(sender: SenderDto) -> Self {
        match sender {
            SenderDto::User => Sender::User,
            SenderDto::Agent => Sender::Agent,
        }
    }
}

impl From<Sender> for SenderDto {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => SenderDto::User,
            Sender::Agent => SenderDto::Agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub text: String,
    pub sender: SenderDto,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessageDto {
    pub fn into_domain(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            text: self.text,
            sender: self.sender.into(),
            timestamp: self.timestamp,
        }
    }
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        ChatMessageDto {
            id: message.id.clone(),
            text: message.text.clone(),
            sender: message.sender.into(),
            timestamp: message.timestamp,
        }
    }
}
