use crate::error::Result;
use async_trait::async_trait;

/// Handle to a previously sent message, as issued by the transport.
pub type MessageId = i64;

/// The narrow seam to whatever chat system delivers messages.
///
/// The transport (webhook wiring, command parsing, delivery) lives outside
/// this crate; the core only needs to send a message and later edit it.
/// Implementations are expected to deliver inbound messages one at a time
/// per chat, in arrival order.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `text` to the chat, returning a handle usable for edits.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<MessageId>;

    /// Replaces the text of a previously sent message.
    async fn edit_message(&self, chat_id: i64, message_id: MessageId, text: &str) -> Result<()>;
}
