use std::sync::Arc;
use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use crate::bot;
use crate::chat::composer::Composer;
use crate::chat::events::{ReadAloudRequested, Submit};
use crate::chat::message::{ChatLog, Message, MessageId};
use crate::chat::message_list::MessageList;
use crate::model_picker::{ModelPicker, PresetActivated, PresetModel, UpgradeRequested};
use crate::settings::WidgetSettings;
use crate::speech::SpeechController;

/// Static prompts offered on the welcome screen.
pub const WELCOME_PROMPTS: [&str; 4] = [
    "Help me write an email",
    "Explain this concept",
    "Create a summary",
    "Generate ideas",
];

/// How long the picker notification chip stays on screen.
const INTERACTION_NOTICE_TTL: Duration = Duration::from_secs(4);

/// Parent coordinator for transcript/composer/picker/bot orchestration.
pub struct ChatView {
    composer: Entity<Composer>,
    message_list: Entity<MessageList>,
    model_picker: Entity<ModelPicker>,
    speech: Entity<SpeechController>,
    settings: Arc<WidgetSettings>,
    log: ChatLog,
    next_message_id: u64,
    reply_pending: bool,
    /// One-shot bot timer; dropped only on entity teardown, never by the
    /// user, so a reply started before a clear still lands.
    reply_task: Option<Task<()>>,
    contextual_suggestions: Vec<String>,
    interaction_notice: Option<SharedString>,
    notice_task: Option<Task<()>>,
    upgrade_preset: Option<PresetModel>,
}

impl ChatView {
    pub fn new(settings: Arc<WidgetSettings>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let composer = cx.new(|cx| Composer::new(window, cx));
        let model_name = settings.selected_model.clone();
        let message_list = cx.new(|cx| MessageList::new(model_name.clone(), cx));
        let model_picker = cx.new(|_| ModelPicker::new(model_name));
        let speech = cx.new(|_| SpeechController::new());

        cx.subscribe(&composer, |this, _, event: &Submit, cx| {
            this.handle_submit(event.clone(), cx);
        })
        .detach();

        cx.subscribe(&model_picker, |this, _, event: &PresetActivated, cx| {
            this.handle_preset_activated(event.clone(), cx);
        })
        .detach();

        cx.subscribe(&model_picker, |this, _, event: &UpgradeRequested, cx| {
            this.upgrade_preset = Some(event.preset);
            cx.notify();
        })
        .detach();

        cx.subscribe(&message_list, |this, _, event: &ReadAloudRequested, cx| {
            this.handle_read_aloud(*event, cx);
        })
        .detach();

        cx.observe(&speech, |this, speech, cx| {
            let speaking = speech.read(cx).is_speaking();
            this.message_list.update(cx, |list, cx| {
                list.set_speaking(speaking, cx);
            });
            cx.notify();
        })
        .detach();

        Self {
            composer,
            message_list,
            model_picker,
            speech,
            settings,
            log: ChatLog::new(),
            next_message_id: 1,
            reply_pending: false,
            reply_task: None,
            contextual_suggestions: Vec::new(),
            interaction_notice: None,
            notice_task: None,
            upgrade_preset: None,
        }
    }

    /// Starts over: empty log, empty draft, no contextual chips.
    /// Pending attachments intentionally survive, matching the widget
    /// contract that only a send clears them.
    pub fn new_chat(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.log.clear();
        self.contextual_suggestions.clear();
        self.composer.update(cx, |composer, cx| {
            composer.clear_draft(window, cx);
        });
        self.message_list.update(cx, |list, cx| {
            list.reset_scroll_tracking(cx);
        });
        self.sync_messages(cx);
        cx.notify();
    }

    /// Empties the transcript and nothing else; composer state is untouched.
    pub fn clear_chat(&mut self, cx: &mut Context<Self>) {
        self.log.clear();
        self.sync_messages(cx);
        cx.notify();
    }

    /// Entry point for files dropped anywhere on the window.
    pub fn attach_external(&mut self, paths: &[std::path::PathBuf], cx: &mut Context<Self>) {
        self.composer.update(cx, |composer, cx| {
            composer.attach_paths(paths, cx);
        });
    }

    fn handle_submit(&mut self, event: Submit, cx: &mut Context<Self>) {
        if self.reply_pending {
            // The composer gates this too; a second submit in the same
            // frame is dropped rather than queued.
            return;
        }

        let user_message_id = self.alloc_message_id();
        self.log.append(Message::user(
            user_message_id,
            event.content.clone(),
            event.voice,
            event.attachments,
        ));

        self.reply_pending = true;
        self.composer.update(cx, |composer, cx| {
            composer.set_reply_pending(true, cx);
        });
        self.sync_messages(cx);

        let delay = bot::reply_delay();
        let user_text = event.content;
        self.reply_task = Some(cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;
            this.update(cx, |this, cx| {
                this.finish_reply(&user_text, cx);
            })
            .ok();
        }));

        cx.notify();
    }

    fn finish_reply(&mut self, user_text: &str, cx: &mut Context<Self>) {
        let reply_id = self.alloc_message_id();
        self.log.append(Message::bot(reply_id, bot::canned_reply(user_text)));

        self.reply_pending = false;
        self.reply_task = None;
        self.composer.update(cx, |composer, cx| {
            composer.set_reply_pending(false, cx);
        });
        self.contextual_suggestions = bot::contextual_suggestions();
        self.sync_messages(cx);
        cx.notify();
    }

    fn handle_preset_activated(&mut self, event: PresetActivated, cx: &mut Context<Self>) {
        tracing::info!("model interaction: {} ({})", event.title, event.summary);
        self.interaction_notice = Some(SharedString::from(event.summary));

        self.notice_task = Some(cx.spawn(async move |this, cx| {
            cx.background_executor().timer(INTERACTION_NOTICE_TTL).await;
            this.update(cx, |this, cx| {
                this.interaction_notice = None;
                this.notice_task = None;
                cx.notify();
            })
            .ok();
        }));

        cx.notify();
    }

    fn handle_read_aloud(&mut self, event: ReadAloudRequested, cx: &mut Context<Self>) {
        let Some(content) = self
            .log
            .get(event.message_id)
            .map(|message| message.content.clone())
        else {
            return;
        };

        self.speech.update(cx, |speech, cx| {
            speech.toggle(content, cx);
        });
    }

    fn set_draft_from_suggestion(
        &mut self,
        text: String,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.composer.update(cx, |composer, cx| {
            composer.set_draft(text, window, cx);
        });
    }

    fn close_upgrade(&mut self, cx: &mut Context<Self>) {
        self.upgrade_preset = None;
        cx.notify();
    }

    fn sync_messages(&mut self, cx: &mut Context<Self>) {
        let messages = self.log.to_vec();
        self.message_list.update(cx, |list, cx| {
            list.set_messages(messages, cx);
        });
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }

    fn render_avatar(&self, diameter: Pixels, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let initial = self
            .settings
            .selected_model
            .chars()
            .next()
            .unwrap_or('M')
            .to_uppercase()
            .to_string();

        div()
            .size(diameter)
            .rounded_full()
            .flex()
            .items_center()
            .justify_center()
            .bg(theme.primary)
            .text_color(theme.primary_foreground)
            .text_xs()
            .child(initial)
    }

    fn render_header(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("chat-header")
            .h(px(56.))
            .px_4()
            .items_center()
            .justify_between()
            .border_b_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .gap_3()
                    .items_center()
                    .child(self.render_avatar(px(28.), cx))
                    .child(
                        v_flex()
                            .child(self.model_picker.clone())
                            .child(
                                h_flex()
                                    .gap_1()
                                    .items_center()
                                    .px_2()
                                    .child(div().size(px(6.)).rounded_full().bg(gpui::green()))
                                    .child(
                                        Label::new("Online")
                                            .text_xs()
                                            .text_color(theme.muted_foreground),
                                    ),
                            ),
                    ),
            )
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .child(
                        Button::new("header-new-chat")
                            .ghost()
                            .small()
                            .icon(IconName::Plus)
                            .child("New Chat")
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.new_chat(window, cx);
                            })),
                    )
                    .child(
                        Button::new("header-clear-chat")
                            .ghost()
                            .small()
                            .child("Clear Chat")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.clear_chat(cx);
                            })),
                    ),
            )
    }

    fn render_welcome(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let model_name = self.settings.selected_model.clone();

        v_flex()
            .id("chat-welcome")
            .flex_1()
            .min_h_0()
            .items_center()
            .justify_center()
            .gap_6()
            .p_6()
            .child(
                v_flex()
                    .items_center()
                    .gap_2()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.foreground)
                            .child("How can I help you today?"),
                    )
                    .child(
                        Label::new(format!(
                            "\"I'm {model_name}, trained to assist, designed to impress.\""
                        ))
                        .text_sm()
                        .text_color(theme.muted_foreground),
                    ),
            )
            .child(
                h_flex()
                    .flex_wrap()
                    .gap_3()
                    .justify_center()
                    .max_w(px(700.))
                    .children(WELCOME_PROMPTS.iter().enumerate().map(|(index, prompt)| {
                        let text = prompt.to_string();
                        v_flex()
                            .id(ElementId::Name(format!("welcome-prompt-{index}").into()))
                            .w(px(320.))
                            .p_3()
                            .gap_1()
                            .rounded_lg()
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .cursor_pointer()
                            .hover(|card| card.bg(theme.muted.opacity(0.4)))
                            .on_click(cx.listener(move |this, _, window, cx| {
                                this.set_draft_from_suggestion(text.clone(), window, cx);
                            }))
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::SEMIBOLD)
                                    .text_color(theme.foreground)
                                    .child(*prompt),
                            )
                            .child(
                                Label::new("Click to get started")
                                    .text_xs()
                                    .text_color(theme.muted_foreground),
                            )
                            .into_any_element()
                    })),
            )
            .when(!self.contextual_suggestions.is_empty(), |element| {
                element.child(self.render_suggestion_chips(2, cx))
            })
    }

    fn render_suggestion_chips(&self, limit: usize, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .gap_2()
            .justify_center()
            .children(
                self.contextual_suggestions
                    .iter()
                    .take(limit)
                    .enumerate()
                    .map(|(index, suggestion)| {
                        let text = suggestion.clone();
                        div()
                            .id(ElementId::Name(format!("suggestion-chip-{index}").into()))
                            .px_3()
                            .py_1()
                            .rounded_full()
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.muted.opacity(0.4))
                            .text_xs()
                            .text_color(theme.foreground)
                            .cursor_pointer()
                            .hover(|chip| chip.bg(theme.muted.opacity(0.7)))
                            .on_click(cx.listener(move |this, _, window, cx| {
                                this.set_draft_from_suggestion(text.clone(), window, cx);
                            }))
                            .child(suggestion.clone())
                            .into_any_element()
                    }),
            )
            .into_any_element()
    }

    fn render_typing_indicator(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let model_name = self.settings.selected_model.clone();

        h_flex()
            .id("typing-indicator")
            .px_4()
            .py_2()
            .gap_2()
            .items_center()
            .child(self.render_avatar(px(20.), cx))
            .child(
                Label::new(format!("{model_name} is typing"))
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
            .child(
                h_flex().gap_1().items_center().children((0..3).map(|dot| {
                    div()
                        .size(px(6.))
                        .rounded_full()
                        .bg(theme.muted_foreground.opacity(0.4 + dot as f32 * 0.2))
                })),
            )
    }

    fn render_upgrade_overlay(&self, preset: PresetModel, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let price = preset.price.unwrap_or("—");

        div()
            .id("upgrade-overlay")
            .absolute()
            .inset_0()
            .bg(theme.background.opacity(0.8))
            .flex()
            .items_center()
            .justify_center()
            .child(
                v_flex()
                    .w(px(380.))
                    .p_6()
                    .gap_4()
                    .items_center()
                    .rounded_xl()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.popover)
                    .shadow_lg()
                    .child(
                        div()
                            .text_lg()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.foreground)
                            .child(format!("Upgrade to {}", preset.name)),
                    )
                    .child(
                        Label::new(preset.description)
                            .text_sm()
                            .text_color(theme.muted_foreground),
                    )
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.foreground)
                            .child(format!("{price}/month")),
                    )
                    .child(
                        h_flex()
                            .gap_3()
                            .w_full()
                            .child(
                                Button::new("upgrade-cancel")
                                    .ghost()
                                    .w_full()
                                    .child("Cancel")
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.close_upgrade(cx);
                                    })),
                            )
                            .child(
                                Button::new("upgrade-confirm")
                                    .primary()
                                    .w_full()
                                    .child("Upgrade Now")
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        // Placeholder: a real billing flow would start here.
                                        this.close_upgrade(cx);
                                    })),
                            ),
                    ),
            )
            .into_any_element()
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let show_welcome = self.log.is_empty();
        let upgrade_preset = self.upgrade_preset;
        let interaction_notice = self.interaction_notice.clone();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.render_header(cx))
            .map(|element| {
                if show_welcome {
                    element.child(self.render_welcome(cx))
                } else {
                    element.child(
                        div()
                            .id("chat-transcript")
                            .flex_1()
                            .min_h_0()
                            .child(self.message_list.clone()),
                    )
                }
            })
            .when(self.reply_pending, |element| {
                element.child(self.render_typing_indicator(cx))
            })
            .when(
                !show_welcome && !self.contextual_suggestions.is_empty(),
                |element| {
                    element.child(
                        div()
                            .px_4()
                            .py_1()
                            .child(self.render_suggestion_chips(2, cx)),
                    )
                },
            )
            .child(
                div()
                    .id("chat-composer")
                    .flex_shrink_0()
                    .w_full()
                    .child(self.composer.clone()),
            )
            .when_some(upgrade_preset, |element, preset| {
                element.child(self.render_upgrade_overlay(preset, cx))
            })
            .when_some(interaction_notice, |element, notice| {
                element.child(
                    div()
                        .absolute()
                        .bottom(px(72.))
                        .right(px(16.))
                        .px_3()
                        .py_2()
                        .rounded_lg()
                        .border_1()
                        .border_color(theme.border)
                        .bg(theme.popover)
                        .shadow_md()
                        .text_xs()
                        .text_color(theme.foreground)
                        .child(notice),
                )
            })
    }
}
