use crate::chat::attachments::Attachment;
use crate::chat::message::MessageId;

/// Emitted when the composer sends a message.
///
/// Carries the draft text and the ordered attachment snapshot taken at
/// send time; the composer clears both before this event is observed.
#[derive(Debug, Clone)]
pub struct Submit {
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub voice: bool,
}

impl Submit {
    pub fn new(content: impl Into<String>, attachments: Vec<Attachment>, voice: bool) -> Self {
        Self {
            content: content.into(),
            attachments,
            voice,
        }
    }
}

/// Emitted when the user asks for a message to be read aloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadAloudRequested {
    pub message_id: MessageId,
}
