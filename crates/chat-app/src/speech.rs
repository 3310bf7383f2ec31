use gpui::{Context, Task};
use gpui_tokio_bridge::Tokio;
use tokio::process::Command;

/// Platform text-to-speech command. Anything missing or failing is simply
/// logged; the widget gives no failure feedback for read-aloud.
#[cfg(target_os = "macos")]
const VOICE_COMMAND: &str = "say";
#[cfg(not(target_os = "macos"))]
const VOICE_COMMAND: &str = "espeak";

/// Idempotent read-aloud toggle backed by a platform voice subprocess.
///
/// One utterance at a time: toggling while speaking stops the current
/// utterance instead of queueing another. The subprocess is killed when
/// the watcher task is dropped, so teardown never leaks a speaking child.
pub struct SpeechController {
    utterance: Option<Task<()>>,
    speaking: bool,
}

impl SpeechController {
    pub fn new() -> Self {
        Self {
            utterance: None,
            speaking: false,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Starts reading `text`, or stops if an utterance is in flight.
    pub fn toggle(&mut self, text: impl Into<String>, cx: &mut Context<Self>) {
        if self.speaking {
            self.stop(cx);
            return;
        }

        let text = text.into();
        if text.trim().is_empty() {
            return;
        }

        let worker = Tokio::spawn(cx, run_utterance(text));
        self.utterance = Some(cx.spawn(async move |this, cx| {
            // Holding `worker` here ties the subprocess lifetime to this
            // task: dropping the watcher aborts the worker, which kills
            // the child via kill_on_drop.
            let _ = worker.await;
            this.update(cx, |this, cx| {
                this.speaking = false;
                this.utterance = None;
                cx.notify();
            })
            .ok();
        }));
        self.speaking = true;
        cx.notify();
    }

    /// Stops any in-flight utterance. Safe to call when idle.
    pub fn stop(&mut self, cx: &mut Context<Self>) {
        self.utterance = None;
        self.speaking = false;
        cx.notify();
    }
}

impl Default for SpeechController {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_utterance(text: String) {
    let mut command = Command::new(VOICE_COMMAND);
    command
        .arg(text)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true);

    match command.spawn() {
        Ok(mut child) => {
            let _ = child.wait().await;
        }
        Err(error) => {
            tracing::debug!("voice command `{}` unavailable: {}", VOICE_COMMAND, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_voice_command_is_configured() {
        assert!(!VOICE_COMMAND.is_empty());
    }
}
