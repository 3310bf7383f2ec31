use std::sync::Arc;

use gpui::*;
use gpui_component::{Root, ThemeRegistry};

use mentify::app::{ChatAppShell, ClearChat, NewChat, Quit, default_themes_path};
use mentify::settings::SettingsStore;

/// Application entry point.
///
/// Bootstraps the GPUI application with:
/// 1. Asset loading via gpui-component-assets
/// 2. gpui-component initialization (required for Root and themes)
/// 3. Widget settings (theme mode + selected model) from the config file
/// 4. Theme loading/watching from ./themes directory (non-fatal if missing)
/// 5. Window creation with Root wrapper for gpui-component composition
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Initialize gpui-component - REQUIRED before any Root usage.
        gpui_component::init(cx);

        let settings_store = SettingsStore::load();
        if let Err(error) = settings_store.ensure_persisted() {
            tracing::warn!("could not write default settings file: {}", error);
        }
        let settings = settings_store.settings();

        // Attempt to load and watch themes from ./themes directory.
        // Non-fatal: without it the app falls back to built-in themes.
        {
            let settings = Arc::clone(&settings);
            if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
                settings.apply_theme(None, cx);
                tracing::info!("Theme directory watch initialized");
            }) {
                tracing::warn!(
                    "Failed to watch themes directory: {}. Using default themes.",
                    err
                );
                settings_store.settings().apply_theme(None, cx);
            }
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-n", NewChat, None),
            KeyBinding::new("cmd-k", ClearChat, None),
        ]);

        let settings = settings_store.settings();
        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1080.), px(760.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Mentify".into()),
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    // Client decorations on Linux/FreeBSD so the app draws its
                    // own title area instead of showing a system titlebar.
                    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                    window_decorations: Some(WindowDecorations::Client),
                    #[cfg(not(any(target_os = "linux", target_os = "freebsd")))]
                    window_decorations: None,
                    ..Default::default()
                };

                cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(settings, window, cx));

                    // Root is REQUIRED by gpui-component for dialogs/popovers.
                    cx.new(|cx| Root::new(shell, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });
}
