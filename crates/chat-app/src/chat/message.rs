use chrono::{DateTime, Local};

use crate::chat::attachments::Attachment;

/// Stable identifier for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Author {
    User,
    Bot,
}

/// One chat turn. Immutable once appended to the log.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub content: String,
    pub sent_at: DateTime<Local>,
    pub voice: bool,
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a message with explicit author and attachment payload.
    pub fn new(
        id: MessageId,
        author: Author,
        content: impl Into<String>,
        voice: bool,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            sent_at: Local::now(),
            voice,
            attachments,
        }
    }

    /// Creates a user message snapshotting the composer state at send time.
    pub fn user(
        id: MessageId,
        content: impl Into<String>,
        voice: bool,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self::new(id, Author::User, content, voice, attachments)
    }

    /// Creates a bot reply with no attachments.
    pub fn bot(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Author::Bot, content, false, Vec::new())
    }

    /// Formats the creation time the way the transcript header shows it.
    pub fn time_label(&self) -> String {
        self.sent_at.format("%H:%M").to_string()
    }
}

/// Append-only ordered sequence of chat turns.
///
/// The only mutation besides `append` is a full clear; individual messages
/// are never edited or removed.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<Message>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Looks up one message by identifier.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Appends one turn. Identifiers must arrive in allocation order.
    pub fn append(&mut self, message: Message) {
        debug_assert!(
            self.messages
                .last()
                .is_none_or(|previous| previous.id < message.id),
            "message identifiers must be appended in increasing order"
        );
        self.messages.push(message);
    }

    /// Drops every turn. Composer state is not this type's concern.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns a snapshot for the transcript view.
    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(id: u64, author: Author, content: &str) -> Message {
        Message::new(MessageId::new(id), author, content, false, Vec::new())
    }

    #[test]
    fn append_keeps_creation_order_and_ids_unique() {
        let mut log = ChatLog::new();
        log.append(text_message(1, Author::User, "hello"));
        log.append(text_message(2, Author::Bot, "You said: hello"));
        log.append(text_message(3, Author::User, "more"));

        let ids = log
            .messages()
            .iter()
            .map(|message| message.id)
            .collect::<Vec<_>>();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();

        assert_eq!(ids.len(), 3);
        assert_eq!(ids, sorted);
    }

    #[test]
    fn reply_timestamp_is_not_before_the_user_turn() {
        let mut log = ChatLog::new();
        log.append(text_message(1, Author::User, "ping"));
        log.append(text_message(2, Author::Bot, "You said: ping"));

        let user_sent_at = log.messages()[0].sent_at;
        let bot_sent_at = log.messages()[1].sent_at;
        assert!(bot_sent_at >= user_sent_at);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = ChatLog::new();
        log.append(text_message(1, Author::User, "hello"));
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn get_finds_messages_by_id() {
        let mut log = ChatLog::new();
        log.append(text_message(1, Author::User, "first"));
        log.append(text_message(2, Author::Bot, "second"));

        assert_eq!(
            log.get(MessageId::new(2)).map(|message| message.content.as_str()),
            Some("second")
        );
        assert!(log.get(MessageId::new(9)).is_none());
    }

    #[test]
    fn time_label_is_hours_and_minutes() {
        let message = text_message(1, Author::User, "hello");
        let label = message.time_label();
        assert_eq!(label.len(), 5);
        assert_eq!(label.as_bytes()[2], b':');
    }
}
