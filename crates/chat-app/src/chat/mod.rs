/// Attachment classification and the pending-attachment set.
pub mod attachments;
/// Text/attachment composer and its send gate.
pub mod composer;
/// Reentrant drag-over state behind the drop overlay.
pub mod drop_zone;
/// Event contracts for chat module wiring.
pub mod events;
/// Domain entities: messages and the append-only log.
pub mod message;
pub mod message_list;
pub mod scroll_manager;
pub mod view;

pub use attachments::{Attachment, AttachmentId, AttachmentKind, AttachmentSet};
pub use composer::Composer;
pub use drop_zone::{DragState, DropRegion};
pub use events::{ReadAloudRequested, Submit};
pub use message::{Author, ChatLog, Message, MessageId};
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use view::ChatView;
