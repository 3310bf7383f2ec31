use std::time::Duration;

use rand::Rng;

/// Lower bound of the simulated thinking delay.
pub const REPLY_DELAY_MIN_MS: u64 = 800;
/// Upper bound of the simulated thinking delay.
pub const REPLY_DELAY_MAX_MS: u64 = 1600;

const _: () = assert!(REPLY_DELAY_MIN_MS < REPLY_DELAY_MAX_MS);

/// Reply used when the user sent attachments with no text.
pub const EMPTY_PROMPT_REPLY: &str = "I'm here — tell me what you need.";

/// Deterministic echo-style reply. No inference happens anywhere.
pub fn canned_reply(user_text: &str) -> String {
    if user_text.is_empty() {
        EMPTY_PROMPT_REPLY.to_string()
    } else {
        format!("You said: {user_text}")
    }
}

/// Uniformly random simulated thinking time.
pub fn reply_delay() -> Duration {
    let millis = rand::rng().random_range(REPLY_DELAY_MIN_MS..=REPLY_DELAY_MAX_MS);
    Duration::from_millis(millis)
}

/// Canned follow-up chips regenerated after every reply, regardless of
/// what was said.
pub fn contextual_suggestions() -> Vec<String> {
    vec![
        "Summarize this conversation".to_string(),
        "Convert to email".to_string(),
        "Give me bullet points".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_echoes_the_user_text() {
        assert_eq!(canned_reply("hello there"), "You said: hello there");
    }

    #[test]
    fn empty_text_gets_the_fixed_greeting() {
        assert_eq!(canned_reply(""), EMPTY_PROMPT_REPLY);
    }

    #[test]
    fn delay_stays_within_the_advertised_range() {
        for _ in 0..200 {
            let delay = reply_delay();
            assert!(delay >= Duration::from_millis(REPLY_DELAY_MIN_MS));
            assert!(delay <= Duration::from_millis(REPLY_DELAY_MAX_MS));
        }
    }

    #[test]
    fn suggestions_are_three_and_unconditional() {
        let first = contextual_suggestions();
        let second = contextual_suggestions();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }
}
