#![deny(unsafe_code)]

/// Application shell hosting the chat view and the drop overlay.
pub mod app;
/// Canned bot-response simulator. No inference, no network.
pub mod bot;
/// Chat domain contracts shared across UI modules.
pub mod chat;
/// Static model-picker presets and dropdown.
pub mod model_picker;
/// Widget configuration loading and persistence.
pub mod settings;
/// Read-aloud controller backed by a platform voice command.
pub mod speech;
