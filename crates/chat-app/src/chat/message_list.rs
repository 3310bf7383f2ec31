use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;
use std::ops::Range;
use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex, v_virtual_list,
};

use crate::chat::attachments::{Attachment, AttachmentKind};
use crate::chat::events::ReadAloudRequested;
use crate::chat::message::{Author, Message, MessageId};
use crate::chat::scroll_manager::ScrollManager;

const DEFAULT_CONTENT_WIDTH: Pixels = px(680.);
const LIST_HORIZONTAL_PADDING: Pixels = px(16.);
const CONTENT_WIDTH_CHANGE_EPSILON: f32 = 1.0;
const USER_BUBBLE_MAX_WIDTH: Pixels = px(540.);
const BUBBLE_PADDING_X: Pixels = px(14.);
const BUBBLE_PADDING_Y: Pixels = px(10.);
const HEADER_ROW_HEIGHT: Pixels = px(20.);
const HEADER_ROW_GAP: Pixels = px(4.);
const ACTIONS_ROW_HEIGHT: Pixels = px(24.);
const ACTIONS_ROW_GAP: Pixels = px(4.);
const VOICE_BADGE_HEIGHT: Pixels = px(18.);
const IMAGE_PREVIEW_HEIGHT: Pixels = px(148.);
const FILE_CHIP_HEIGHT: Pixels = px(36.);
const ATTACHMENT_GAP: Pixels = px(8.);
const ESTIMATED_TEXT_LINE_HEIGHT: Pixels = px(18.);
const ESTIMATED_CHAR_WIDTH: f32 = 7.0;

struct SizeCacheEntry {
    layout_hash: u64,
    height: Pixels,
    measured: bool,
}

/// Virtualized transcript of user/bot turns.
pub struct MessageList {
    messages: Vec<Message>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_manager: ScrollManager,
    size_cache: HashMap<MessageId, SizeCacheEntry>,
    content_width: Option<Pixels>,
    /// Display name shown over bot turns; comes from configuration.
    bot_label: SharedString,
    speaking: bool,
}

impl EventEmitter<ReadAloudRequested> for MessageList {}

impl MessageList {
    pub fn new(bot_label: impl Into<SharedString>, _cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            item_sizes: Rc::new(Vec::new()),
            scroll_manager: ScrollManager::new(),
            size_cache: HashMap::new(),
            content_width: None,
            bot_label: bot_label.into(),
            speaking: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn set_messages(&mut self, messages: Vec<Message>, cx: &mut Context<Self>) {
        let should_request_follow = messages.len() > self.messages.len();

        self.messages = messages;
        self.rebuild_item_sizes();

        if should_request_follow {
            self.scroll_manager.request_scroll_to_bottom_if_following();
        }

        cx.notify();
    }

    /// Flips the read-aloud affordance on bot rows.
    pub fn set_speaking(&mut self, speaking: bool, cx: &mut Context<Self>) {
        if self.speaking != speaking {
            self.speaking = speaking;
            cx.notify();
        }
    }

    pub fn request_scroll_to_bottom(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.request_scroll_to_bottom();
        cx.notify();
    }

    pub fn reset_scroll_tracking(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.reset();
        cx.notify();
    }

    fn update_content_width(&mut self, cx: &mut Context<Self>) {
        let list_width = self.scroll_manager.bounds().size.width;
        if list_width <= Pixels::ZERO {
            return;
        }

        let next_content_width = max_pixels(px(1.), list_width - LIST_HORIZONTAL_PADDING * 2);
        let width_changed = self.content_width.is_none_or(|current| {
            (f32::from(current) - f32::from(next_content_width)).abs()
                > CONTENT_WIDTH_CHANGE_EPSILON
        });

        if width_changed {
            self.content_width = Some(next_content_width);

            // Cached measurements are only valid for one width.
            for entry in self.size_cache.values_mut() {
                entry.measured = false;
            }

            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn rebuild_item_sizes(&mut self) {
        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let mut active_ids = HashSet::with_capacity(self.messages.len());
        let mut sizes = Vec::with_capacity(self.messages.len());

        for message in &self.messages {
            let next_hash = layout_hash(message);
            let estimated_height = estimate_message_height(message, content_width);

            let entry = self.size_cache.entry(message.id).or_insert(SizeCacheEntry {
                layout_hash: next_hash,
                height: estimated_height,
                measured: false,
            });

            // Entries stay keyed by message id and invalidate only when the
            // rendered content actually changed.
            if entry.layout_hash != next_hash {
                entry.layout_hash = next_hash;
                entry.height = estimated_height;
                entry.measured = false;
            } else if !entry.measured {
                entry.height = estimated_height;
            }

            sizes.push(size(px(0.), entry.height));
            active_ids.insert(message.id);
        }

        self.size_cache.retain(|id, _| active_ids.contains(id));
        self.item_sizes = Rc::new(sizes);
    }

    fn measure_visible_items(
        &mut self,
        visible_range: Range<usize>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.messages.is_empty() {
            return;
        }

        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let available_space = size(
            AvailableSpace::Definite(content_width),
            AvailableSpace::MinContent,
        );
        let mut updated = false;

        for index in visible_range {
            let Some(message) = self.messages.get(index).cloned() else {
                continue;
            };

            let next_hash = layout_hash(&message);
            let estimated_height = estimate_message_height(&message, content_width);

            {
                let entry = self.size_cache.entry(message.id).or_insert(SizeCacheEntry {
                    layout_hash: next_hash,
                    height: estimated_height,
                    measured: false,
                });

                if entry.layout_hash != next_hash {
                    entry.layout_hash = next_hash;
                    entry.height = estimated_height;
                    entry.measured = false;
                }
            }

            let mut row = self.render_message_row(&message, index, cx);
            let measured_height = row.layout_as_root(available_space, window, cx).height;
            let Some(entry) = self.size_cache.get_mut(&message.id) else {
                continue;
            };
            let height_changed = !entry.measured || pixels_changed(entry.height, measured_height);
            if height_changed {
                entry.height = measured_height;
                updated = true;
            }
            entry.measured = true;
        }

        if updated {
            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn render_attachment(
        &self,
        attachment: &Attachment,
        on_user_bubble: bool,
        cx: &Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();

        if let (Some(preview), AttachmentKind::Image) = (&attachment.preview, attachment.kind) {
            return img(preview.clone())
                .h(IMAGE_PREVIEW_HEIGHT)
                .rounded_md()
                .into_any_element();
        }

        let chip_bg = if on_user_bubble {
            theme.accent_foreground.opacity(0.2)
        } else {
            theme.muted.opacity(0.6)
        };

        h_flex()
            .gap_2()
            .p_2()
            .items_center()
            .rounded_md()
            .bg(chip_bg)
            .child(
                Label::new(attachment.kind.tag())
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
            .child(Label::new(attachment.name.clone()).text_xs())
            .into_any_element()
    }

    fn render_actions(&self, message: &Message, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let content = message.content.clone();
        let message_id = message.id;
        let copy_button_id = ElementId::Name(format!("copy-message-{}", message.id.0).into());

        h_flex()
            .gap_1()
            .items_center()
            .child(
                Button::new(copy_button_id)
                    .ghost()
                    .xsmall()
                    .icon(IconName::Copy)
                    .on_click(move |_, _, cx| {
                        // Fire-and-forget: no feedback on clipboard failures.
                        cx.write_to_clipboard(ClipboardItem::new_string(content.clone()));
                    }),
            )
            .when(message.author == Author::Bot, |row| {
                let label = if self.speaking { "Stop" } else { "Read aloud" };
                row.child(
                    Button::new(ElementId::Name(
                        format!("speak-message-{}", message.id.0).into(),
                    ))
                    .ghost()
                    .xsmall()
                    .child(label)
                    .on_click(cx.listener(move |_, _, _window, cx| {
                        cx.emit(ReadAloudRequested { message_id });
                    })),
                )
            })
            .text_color(theme.muted_foreground)
            .into_any_element()
    }

    fn render_message_row(
        &self,
        message: &Message,
        _index: usize,
        cx: &Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();
        let is_user = message.author == Author::User;
        let author_label: SharedString = if is_user {
            "You".into()
        } else {
            self.bot_label.clone()
        };

        let header = h_flex()
            .gap_2()
            .items_center()
            .when(is_user, |row| row.justify_end())
            .child(
                Label::new(author_label)
                    .text_xs()
                    .text_color(theme.foreground.opacity(0.7)),
            )
            .child(
                Label::new(message.time_label())
                    .text_xs()
                    .text_color(theme.foreground.opacity(0.45)),
            );

        let attachments = if message.attachments.is_empty() {
            None
        } else {
            Some(
                v_flex().gap(ATTACHMENT_GAP).children(
                    message
                        .attachments
                        .iter()
                        .map(|attachment| self.render_attachment(attachment, is_user, cx)),
                ),
            )
        };

        let bubble = div()
            .max_w(USER_BUBBLE_MAX_WIDTH)
            .px(BUBBLE_PADDING_X)
            .py(BUBBLE_PADDING_Y)
            .rounded_lg()
            .map(|bubble| {
                if is_user {
                    bubble.bg(theme.accent).text_color(theme.accent_foreground)
                } else {
                    bubble
                        .bg(theme.muted.opacity(0.35))
                        .border_1()
                        .border_color(theme.border)
                        .text_color(theme.foreground)
                }
            })
            .when_some(attachments, |bubble, block| bubble.child(block))
            .when(!message.content.is_empty(), |bubble| {
                bubble.child(Label::new(message.content.clone()).text_sm())
            });

        v_flex()
            .w_full()
            .gap(HEADER_ROW_GAP)
            .when(is_user, |column| column.items_end())
            .child(header)
            .child(bubble)
            .when(message.voice, |column| {
                column.child(
                    Label::new("Voice message")
                        .text_xs()
                        .text_color(theme.muted_foreground),
                )
            })
            .child(self.render_actions(message, cx))
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.update_content_width(cx);
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        v_flex().size_full().min_h_0().child(
            v_virtual_list(
                cx.entity().clone(),
                "message-list",
                self.item_sizes.clone(),
                |this, visible_range, window, cx| {
                    // Measure only visible rows so long transcripts keep
                    // O(visible) layout work.
                    this.update_content_width(cx);
                    this.measure_visible_items(visible_range.clone(), window, cx);
                    visible_range
                        .filter_map(|index| {
                            this.messages
                                .get(index)
                                .cloned()
                                .map(|message| this.render_message_row(&message, index, cx))
                        })
                        .collect::<Vec<_>>()
                },
            )
            .size_full()
            .px_4()
            .py_3()
            .gap_4()
            .track_scroll(self.scroll_manager.handle()),
        )
    }
}

fn layout_hash(message: &Message) -> u64 {
    let mut hasher = DefaultHasher::new();

    hasher.write_u64(message.id.0);
    hasher.write_u8(match message.author {
        Author::User => 0,
        Author::Bot => 1,
    });
    hasher.write_u8(message.voice as u8);
    hasher.write(message.time_label().as_bytes());
    hasher.write(message.content.as_bytes());

    for attachment in &message.attachments {
        hasher.write(attachment.name.as_bytes());
        hasher.write_u8(attachment.preview.is_some() as u8);
    }

    hasher.finish()
}

fn estimate_message_height(message: &Message, content_width: Pixels) -> Pixels {
    let bubble_width = min_pixels(content_width, USER_BUBBLE_MAX_WIDTH);
    let text_width = max_pixels(px(1.), bubble_width - BUBBLE_PADDING_X * 2);

    let mut bubble_height = BUBBLE_PADDING_Y * 2;
    if !message.content.is_empty() {
        bubble_height += estimate_text_height(&message.content, text_width);
    }
    for attachment in &message.attachments {
        let block = match (&attachment.preview, attachment.kind) {
            (Some(_), AttachmentKind::Image) => IMAGE_PREVIEW_HEIGHT,
            _ => FILE_CHIP_HEIGHT,
        };
        bubble_height += block + ATTACHMENT_GAP;
    }
    if message.content.is_empty() && message.attachments.is_empty() {
        bubble_height += ESTIMATED_TEXT_LINE_HEIGHT;
    }

    let mut total_height =
        HEADER_ROW_HEIGHT + HEADER_ROW_GAP + bubble_height + ACTIONS_ROW_GAP + ACTIONS_ROW_HEIGHT;
    if message.voice {
        total_height += VOICE_BADGE_HEIGHT;
    }

    total_height
}

fn estimate_text_height(content: &str, width: Pixels) -> Pixels {
    if content.is_empty() {
        return ESTIMATED_TEXT_LINE_HEIGHT;
    }

    let width_as_f32 = f32::from(width);
    let chars_per_line = (width_as_f32 / ESTIMATED_CHAR_WIDTH).floor().max(1.0) as usize;

    let mut line_count = 0usize;
    for line in content.lines() {
        let char_count = line.chars().count().max(1);
        line_count += char_count.div_ceil(chars_per_line);
    }

    // Account for the trailing empty line when content ends with a newline.
    if content.ends_with('\n') {
        line_count += 1;
    }

    ESTIMATED_TEXT_LINE_HEIGHT * line_count.max(1)
}

fn max_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) >= f32::from(b) { a } else { b }
}

fn min_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) <= f32::from(b) { a } else { b }
}

fn pixels_changed(a: Pixels, b: Pixels) -> bool {
    (f32::from(a) - f32::from(b)).abs() > 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::attachments::AttachmentSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn fixture_message(id: u64, author: Author, content: &str) -> Message {
        Message::new(MessageId::new(id), author, content, false, Vec::new())
    }

    #[test]
    fn transcript_fixture_keeps_row_metrics_deterministic() {
        let mut messages = (0..500)
            .map(|index| {
                let author = if index % 2 == 0 {
                    Author::User
                } else {
                    Author::Bot
                };
                fixture_message(
                    index as u64 + 1,
                    author,
                    &format!("message-{index}: transcript fixture payload"),
                )
            })
            .collect::<Vec<_>>();

        let content_width = px(680.);
        let heights_before = messages
            .iter()
            .map(|message| estimate_message_height(message, content_width))
            .collect::<Vec<_>>();
        let hashes_before = messages.iter().map(layout_hash).collect::<Vec<_>>();

        assert!(heights_before.iter().all(|height| *height > Pixels::ZERO));

        if let Some(last_message) = messages.last_mut() {
            // Tail-only mutation should invalidate only the final row hash.
            last_message.content.push_str(" [edited]");
        }

        let hashes_after = messages.iter().map(layout_hash).collect::<Vec<_>>();
        assert_eq!(hashes_before[..499], hashes_after[..499]);
        assert_ne!(hashes_before[499], hashes_after[499]);
    }

    #[test]
    fn attachments_raise_the_estimated_row_height() {
        let bare = fixture_message(1, Author::User, "hello");

        let mut set = AttachmentSet::new();
        set.attach_batch(&[PathBuf::from("a.zip"), PathBuf::from("b.zip")]);
        let with_files = Message::new(
            MessageId::new(2),
            Author::User,
            "hello",
            false,
            set.take_all(),
        );

        let width = px(680.);
        assert!(
            estimate_message_height(&with_files, width) > estimate_message_height(&bare, width)
        );
    }

    #[test]
    fn preview_arrival_changes_the_layout_hash() {
        let mut set = AttachmentSet::new();
        let added = set.attach_batch(&[PathBuf::from("photo.png")]);
        let before = Message::new(
            MessageId::new(1),
            Author::User,
            "",
            false,
            set.items().to_vec(),
        );
        let hash_before = layout_hash(&before);

        set.set_preview(
            added[0].id,
            Arc::new(Image::from_bytes(ImageFormat::Png, vec![1, 2, 3])),
        );
        let after = Message::new(MessageId::new(1), Author::User, "", false, set.take_all());

        assert_ne!(hash_before, layout_hash(&after));
    }

    #[test]
    fn voice_flag_adds_the_badge_height() {
        let plain = fixture_message(1, Author::User, "hi");
        let mut voiced = fixture_message(2, Author::User, "hi");
        voiced.voice = true;

        let width = px(680.);
        let delta =
            estimate_message_height(&voiced, width) - estimate_message_height(&plain, width);
        assert_eq!(delta, VOICE_BADGE_HEIGHT);
    }
}
