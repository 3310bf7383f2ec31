use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};

use crate::chat::ChatView;
use crate::chat::drop_zone::{DragState, DropRegion};
use crate::settings::WidgetSettings;

/// Returns the default themes directory path.
/// This is a pure function to allow deterministic testing of path resolution.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// How far the floating file-name chip trails the cursor.
const DRAG_CHIP_OFFSET: Pixels = px(12.);
/// A drag with no move events for this long is treated as cancelled
/// (the pointer left the window without dropping).
const DRAG_IDLE_RESET: Duration = Duration::from_millis(400);

gpui::actions!(mentify, [NewChat, ClearChat, Quit,]);

/// Main application shell.
///
/// The shell provides:
/// - The chat view filling the window
/// - Window-wide external file-drag interception with a "Drop to attach"
///   overlay and a file-name chip following the cursor
/// - Shell-level actions (new chat, clear chat)
pub struct ChatAppShell {
    focus_handle: FocusHandle,
    chat_view: Entity<ChatView>,
    drag: DragState,
    drag_watchdog: Option<Task<()>>,
}

impl ChatAppShell {
    pub fn new(
        settings: Arc<WidgetSettings>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(settings, window, cx));

        Self {
            focus_handle: cx.focus_handle(),
            chat_view,
            drag: DragState::new(),
            drag_watchdog: None,
        }
    }

    fn new_chat(&mut self, _: &NewChat, window: &mut Window, cx: &mut Context<Self>) {
        self.chat_view.update(cx, |chat_view, cx| {
            chat_view.new_chat(window, cx);
        });
    }

    fn clear_chat(&mut self, _: &ClearChat, _window: &mut Window, cx: &mut Context<Self>) {
        self.chat_view.update(cx, |chat_view, cx| {
            chat_view.clear_chat(cx);
        });
    }

    fn handle_drag_move(
        &mut self,
        region: DropRegion,
        event: &DragMoveEvent<ExternalPaths>,
        cx: &mut Context<Self>,
    ) {
        let contains = event.bounds.contains(&event.event.position);

        if region == DropRegion::Window {
            let dragged_name = event
                .drag(cx)
                .paths()
                .first()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned());
            self.drag.set_file_name(dragged_name);
        }

        self.drag.update_region(region, contains, event.event.position);
        self.restart_drag_watchdog(cx);
        cx.notify();
    }

    fn handle_drop(&mut self, paths: &ExternalPaths, cx: &mut Context<Self>) {
        self.drag.finish_drop();
        self.drag_watchdog = None;

        let dropped = paths.paths().to_vec();
        if !dropped.is_empty() {
            self.chat_view.update(cx, |chat_view, cx| {
                chat_view.attach_external(&dropped, cx);
            });
        }

        cx.notify();
    }

    /// External drags that leave the window produce no further events, so
    /// a short idle timer hides the overlay instead of letting it stick.
    fn restart_drag_watchdog(&mut self, cx: &mut Context<Self>) {
        self.drag_watchdog = Some(cx.spawn(async move |this, cx| {
            cx.background_executor().timer(DRAG_IDLE_RESET).await;
            this.update(cx, |this, cx| {
                this.drag.cancel();
                this.drag_watchdog = None;
                cx.notify();
            })
            .ok();
        }));
    }

    fn render_drop_overlay(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        div()
            .absolute()
            .inset_0()
            .flex()
            .items_center()
            .justify_center()
            .child(
                h_flex()
                    .gap_2()
                    .px_3()
                    .py_2()
                    .items_center()
                    .rounded_xl()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.popover.opacity(0.9))
                    .shadow_lg()
                    .child(
                        Label::new("Drop to attach")
                            .text_sm()
                            .text_color(theme.foreground),
                    ),
            )
            .into_any_element()
    }

    fn render_drag_chip(
        &self,
        cursor: Point<Pixels>,
        file_name: &str,
        cx: &Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();

        div()
            .absolute()
            .left(cursor.x + DRAG_CHIP_OFFSET)
            .top(cursor.y + DRAG_CHIP_OFFSET)
            .child(
                h_flex()
                    .px_3()
                    .py_1()
                    .items_center()
                    .rounded_full()
                    .bg(theme.popover)
                    .shadow_md()
                    .border_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .max_w(px(220.))
                            .overflow_hidden()
                            .text_xs()
                            .text_color(theme.foreground)
                            .child(file_name.to_string()),
                    ),
            )
            .into_any_element()
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let overlay_visible = self.drag.overlay_visible();
        let drag_chip = match (self.drag.cursor(), self.drag.file_name()) {
            (Some(cursor), Some(name)) if overlay_visible => Some((cursor, name.to_string())),
            _ => None,
        };

        div()
            .id("app-shell")
            .track_focus(&self.focus_handle)
            .relative()
            .size_full()
            .bg(theme.background)
            .on_action(cx.listener(Self::new_chat))
            .on_action(cx.listener(Self::clear_chat))
            .on_drag_move::<ExternalPaths>(cx.listener(
                |this, event: &DragMoveEvent<ExternalPaths>, _window, cx| {
                    this.handle_drag_move(DropRegion::Window, event, cx);
                },
            ))
            .on_drop(cx.listener(|this, paths: &ExternalPaths, _window, cx| {
                this.handle_drop(paths, cx);
            }))
            .child(
                v_flex()
                    .id("app-surface")
                    .size_full()
                    .min_h_0()
                    .on_drag_move::<ExternalPaths>(cx.listener(
                        |this, event: &DragMoveEvent<ExternalPaths>, _window, cx| {
                            this.handle_drag_move(DropRegion::Surface, event, cx);
                        },
                    ))
                    .child(self.chat_view.clone()),
            )
            .when(overlay_visible, |element| {
                element.child(self.render_drop_overlay(cx))
            })
            .when_some(drag_chip, |element, (cursor, name)| {
                element.child(self.render_drag_chip(cursor, &name, cx))
            })
    }
}
