use std::path::PathBuf;
use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};
use gpui_tokio_bridge::Tokio;

use crate::chat::attachments::{self, AttachmentKind, AttachmentSet};
use crate::chat::events::Submit;

/// Returns true when a send is allowed for the given draft state.
///
/// Matches the widget contract: trimmed text or at least one attachment,
/// and never while a bot reply is pending.
pub fn send_allowed(text: &str, attachment_count: usize, reply_pending: bool) -> bool {
    (!text.trim().is_empty() || attachment_count > 0) && !reply_pending
}

/// Text/attachment input area and its pending draft state.
pub struct Composer {
    input_state: Entity<InputState>,
    attachments: AttachmentSet,
    listening: bool,
    reply_pending: bool,
    pending_newline: bool,
}

impl EventEmitter<Submit> for Composer {}

impl Composer {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Type your message...")
                .clean_on_escape()
                .auto_grow(1, 6)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { secondary } = event {
                    if *secondary {
                        this.pending_newline = false;
                        return;
                    }

                    if this.pending_newline {
                        // Shift+Enter inserts a newline manually and then still emits
                        // PressEnter. Consume that synthetic enter so it never submits.
                        this.pending_newline = false;
                    } else {
                        this.trim_trailing_newline(window, cx);
                        this.handle_submit(window, cx);
                    }
                }
            },
        )
        .detach();

        Self {
            input_state,
            attachments: AttachmentSet::new(),
            listening: false,
            reply_pending: false,
            pending_newline: false,
        }
    }

    /// Mirrors the coordinator's bot-busy flag into the send gate.
    pub fn set_reply_pending(&mut self, pending: bool, cx: &mut Context<Self>) {
        self.reply_pending = pending;
        if !pending {
            self.pending_newline = false;
        }
        cx.notify();
    }

    /// Replaces the draft text, used by the suggestion cards and chips.
    pub fn set_draft(&mut self, text: impl Into<String>, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value(text.into(), window, cx);
        });
        self.pending_newline = false;
        cx.notify();
    }

    /// Clears the draft text only; pending attachments survive.
    pub fn clear_draft(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.set_draft("", window, cx);
    }

    /// Appends dropped or picked files and kicks off preview reads.
    pub fn attach_paths(&mut self, paths: &[PathBuf], cx: &mut Context<Self>) {
        let added = self.attachments.attach_batch(paths);

        for attachment in added {
            if attachment.kind != AttachmentKind::Image {
                continue;
            }

            let id = attachment.id;
            let worker = Tokio::spawn(cx, attachments::load_preview(attachment.path.clone()));
            cx.spawn(async move |this, cx| {
                let Ok(Some(image)) = worker.await else {
                    return;
                };
                this.update(cx, |composer, cx| {
                    if composer.attachments.set_preview(id, Arc::new(image)) {
                        cx.notify();
                    }
                })
                .ok();
            })
            .detach();
        }

        cx.notify();
    }

    fn remove_attachment(&mut self, index: usize, cx: &mut Context<Self>) {
        if self.attachments.remove(index).is_some() {
            cx.notify();
        }
    }

    fn toggle_listening(&mut self, cx: &mut Context<Self>) {
        // Toggle only; there is no actual capture behind the flag.
        self.listening = !self.listening;
        cx.notify();
    }

    fn prompt_for_files(&mut self, cx: &mut Context<Self>) {
        let receiver = cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: true,
            prompt: None,
        });

        cx.spawn(async move |this, cx| {
            if let Ok(Ok(Some(paths))) = receiver.await {
                this.update(cx, |composer, cx| {
                    composer.attach_paths(&paths, cx);
                })
                .ok();
            }
        })
        .detach();
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.reply_pending {
            return;
        }

        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let content = self.input_state.read(cx).value().to_string();
        if !send_allowed(&content, self.attachments.len(), self.reply_pending) {
            return;
        }

        // Snapshot first, then clear: the draft and the attachment list are
        // both empty by the time the Submit event is observed.
        let snapshot = self.attachments.take_all();
        cx.emit(Submit::new(content, snapshot, self.listening));
        self.clear_draft(window, cx);
    }

    fn render_attachment_chips(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .w_full()
            .flex_wrap()
            .gap_2()
            .children(self.attachments.items().iter().enumerate().map(|(index, attachment)| {
                let thumbnail = match (&attachment.preview, attachment.kind) {
                    (Some(image), AttachmentKind::Image) => img(image.clone())
                        .size(px(32.))
                        .rounded_sm()
                        .into_any_element(),
                    _ => div()
                        .size(px(32.))
                        .rounded_sm()
                        .flex()
                        .items_center()
                        .justify_center()
                        .bg(theme.muted)
                        .text_color(theme.muted_foreground)
                        .text_xs()
                        .child(attachment.kind.tag())
                        .into_any_element(),
                };

                h_flex()
                    .id(ElementId::Name(format!("attachment-chip-{}", attachment.id.0).into()))
                    .gap_2()
                    .px_2()
                    .py_1()
                    .items_center()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .child(thumbnail)
                    .child(
                        v_flex()
                            .child(
                                div()
                                    .w(px(160.))
                                    .overflow_hidden()
                                    .text_xs()
                                    .text_color(theme.foreground)
                                    .child(attachment.name.clone()),
                            )
                            .child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(attachment.size_label()),
                            ),
                    )
                    .child(
                        Button::new(ElementId::Name(
                            format!("attachment-remove-{}", attachment.id.0).into(),
                        ))
                        .ghost()
                        .xsmall()
                        .icon(IconName::CircleX)
                        .on_click(cx.listener(move |this, _, _window, cx| {
                            this.remove_attachment(index, cx);
                        })),
                    )
                    .into_any_element()
            }))
    }
}

impl Render for Composer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let reply_pending = self.reply_pending;
        let listening = self.listening;
        let text = self.input_state.read(cx).value().to_string();
        let can_send = send_allowed(&text, self.attachments.len(), reply_pending);

        let voice_button = if listening {
            Button::new("composer-voice")
                .small()
                .danger()
                .child("Listening")
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.toggle_listening(cx);
                }))
        } else {
            Button::new("composer-voice")
                .ghost()
                .small()
                .child("Voice")
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.toggle_listening(cx);
                }))
        };

        v_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .when(!self.attachments.is_empty(), |element| {
                element.child(self.render_attachment_chips(cx))
            })
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_end()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                        if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                            this.handle_shift_enter(window, cx);
                        }
                    }))
                    .child(
                        Button::new("composer-attach")
                            .ghost()
                            .small()
                            .icon(IconName::Plus)
                            .child("Attach")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.prompt_for_files(cx);
                            })),
                    )
                    .child(
                        Input::new(&self.input_state)
                            .w_full()
                            .disabled(reply_pending),
                    )
                    .child(voice_button)
                    .child(
                        Button::new("composer-send")
                            .small()
                            .primary()
                            .icon(IconName::ArrowUp)
                            .child("Send")
                            .disabled(!can_send)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.handle_submit(window, cx);
                            })),
                    ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_requires_text_or_attachments() {
        assert!(!send_allowed("", 0, false));
        assert!(!send_allowed("   \n", 0, false));
        assert!(send_allowed("hello", 0, false));
        assert!(send_allowed("", 1, false));
        assert!(send_allowed("   ", 2, false));
    }

    #[test]
    fn send_is_blocked_while_a_reply_is_pending() {
        assert!(!send_allowed("hello", 3, true));
        assert!(!send_allowed("", 1, true));
    }
}
