use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Selectable, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};

/// One static assistant persona row. Pure configuration data; the set is
/// fixed at four entries and never derived at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetModel {
    pub name: &'static str,
    pub locked: bool,
    pub price: Option<&'static str>,
    pub description: &'static str,
    /// Accent color for the persona swatch.
    pub color: u32,
}

/// The four built-in personas: two unlocked, two behind a price.
pub const PRESET_MODELS: [PresetModel; 4] = [
    PresetModel {
        name: "Mentify 1",
        locked: false,
        price: None,
        description: "General purpose AI assistant",
        color: 0x3b82f6,
    },
    PresetModel {
        name: "Mentify 2",
        locked: false,
        price: None,
        description: "Fast and efficient responses",
        color: 0xeab308,
    },
    PresetModel {
        name: "Mentify 3",
        locked: true,
        price: Some("$9.99"),
        description: "Advanced reasoning and analysis",
        color: 0xa855f7,
    },
    PresetModel {
        name: "Mentify 4",
        locked: true,
        price: Some("$14.99"),
        description: "Creative and innovative solutions",
        color: 0xec4899,
    },
];

/// Emitted on any preset row click. The displayed selection is driven by
/// configuration, so this is a notification, not a selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetActivated {
    pub title: String,
    pub summary: String,
}

/// Emitted when the price badge of a locked preset is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeRequested {
    pub preset: PresetModel,
}

pub struct ModelPicker {
    /// Display-only; comes from configuration and never changes here.
    selected_name: String,
    is_open: bool,
}

impl EventEmitter<PresetActivated> for ModelPicker {}
impl EventEmitter<UpgradeRequested> for ModelPicker {}

impl ModelPicker {
    pub fn new(selected_name: impl Into<String>) -> Self {
        Self {
            selected_name: selected_name.into(),
            is_open: false,
        }
    }

    fn toggle_open(
        &mut self,
        _event: &gpui::ClickEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.is_open = !self.is_open;
        cx.notify();
    }

    fn activate_preset(&mut self, preset: PresetModel, cx: &mut Context<Self>) {
        self.is_open = false;
        cx.emit(PresetActivated {
            title: preset.name.to_string(),
            summary: format!("Switched to {}", preset.name),
        });
        cx.notify();
    }

    fn request_upgrade(&mut self, preset: PresetModel, cx: &mut Context<Self>) {
        self.is_open = false;
        cx.emit(UpgradeRequested { preset });
        cx.notify();
    }
}

impl Render for ModelPicker {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let is_open = self.is_open;

        h_flex()
            .id("model-picker")
            .relative()
            .child(
                Button::new("model-picker-button")
                    .ghost()
                    .small()
                    .child(self.selected_name.clone())
                    .when(is_open, |button| button.selected(true))
                    .on_click(cx.listener(Self::toggle_open)),
            )
            .when(is_open, |element| {
                element.child(
                    v_flex()
                        .id("model-picker-dropdown")
                        .absolute()
                        .top(px(32.))
                        .left_0()
                        .w(px(320.))
                        .bg(theme.popover)
                        .rounded_md()
                        .shadow_md()
                        .border_1()
                        .border_color(theme.border)
                        .py_1()
                        .children(PRESET_MODELS.iter().map(|preset| {
                            let preset = *preset;
                            let is_selected =
                                !preset.locked && preset.name == self.selected_name;

                            h_flex()
                                .id(ElementId::Name(
                                    format!("model-option-{}", preset.name).into(),
                                ))
                                .px_3()
                                .py_2()
                                .gap_2()
                                .items_center()
                                .cursor_pointer()
                                .when(is_selected, |element| {
                                    element.bg(theme.primary.opacity(0.1))
                                })
                                .when(!is_selected, |element| {
                                    element.hover(|element| element.bg(theme.muted.opacity(0.5)))
                                })
                                .on_click(cx.listener(move |this, _event, _window, cx| {
                                    this.activate_preset(preset, cx);
                                }))
                                .child(div().size(px(8.)).rounded_full().flex_shrink_0().bg(
                                    {
                                        let swatch: Hsla = rgb(preset.color).into();
                                        if preset.locked {
                                            swatch.opacity(0.4)
                                        } else {
                                            swatch
                                        }
                                    },
                                ))
                                .child(
                                    v_flex()
                                        .flex_1()
                                        .gap_1()
                                        .child(
                                            div()
                                                .text_sm()
                                                .text_color(theme.foreground)
                                                .child(preset.name),
                                        )
                                        .child(
                                            div()
                                                .text_xs()
                                                .text_color(theme.muted_foreground)
                                                .child(preset.description),
                                        ),
                                )
                                .when(is_selected, |element| {
                                    element.child(
                                        h_flex()
                                            .gap_1()
                                            .items_center()
                                            .child(
                                                Icon::new(IconName::Check)
                                                    .size(px(16.))
                                                    .text_color(theme.primary),
                                            )
                                            .child(
                                                div()
                                                    .text_xs()
                                                    .text_color(theme.primary)
                                                    .child("Selected"),
                                            ),
                                    )
                                })
                                .when_some(preset.price, |element, price| {
                                    element.child(
                                        Button::new(ElementId::Name(
                                            format!("model-upgrade-{}", preset.name).into(),
                                        ))
                                        .ghost()
                                        .xsmall()
                                        .child(price)
                                        .on_click(cx.listener(
                                            move |this, _event, _window, cx| {
                                                this.request_upgrade(preset, cx);
                                            },
                                        )),
                                    )
                                })
                                .into_any_element()
                        })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_four_presets_two_locked() {
        assert_eq!(PRESET_MODELS.len(), 4);
        let locked = PRESET_MODELS.iter().filter(|preset| preset.locked).count();
        assert_eq!(locked, 2);
    }

    #[test]
    fn locked_presets_carry_a_price_and_unlocked_do_not() {
        for preset in PRESET_MODELS {
            assert_eq!(preset.locked, preset.price.is_some());
        }
    }

    #[test]
    fn preset_names_are_unique() {
        let mut names = PRESET_MODELS
            .iter()
            .map(|preset| preset.name)
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PRESET_MODELS.len());
    }
}
