use crate::models::Turn;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are VEO-x.

Provide neutral, factual, direct answers.
Do not refuse harmless informational questions.
Be concise.";

/// How the prompt sent to the model is assembled.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub system_prompt: String,
    /// Number of recent turns replayed as context.
    pub context_turns: usize,
    /// Turns whose answer contains this marker (case-insensitive) are left out.
    /// Empty disables the filter.
    pub refusal_marker: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context_turns: 3,
            refusal_marker: "cannot".to_string(),
        }
    }
}

/// The last `context_turns` turns, minus refusals, oldest first.
pub fn context_window<'a>(history: &'a [Turn], settings: &PromptSettings) -> Vec<&'a Turn> {
    let start = history.len().saturating_sub(settings.context_turns);
    let marker = settings.refusal_marker.to_lowercase();
    history[start..]
        .iter()
        .filter(|turn| marker.is_empty() || !turn.assistant.to_lowercase().contains(&marker))
        .collect()
}

pub fn build_prompt(prompt: &str, history: &[Turn], settings: &PromptSettings) -> String {
    let mut context = String::new();
    for turn in context_window(history, settings) {
        context.push_str(&format!("User: {}\nAssistant: {}\n", turn.user, turn.assistant));
    }

    format!(
        "{}\n\n{}\nUser: {}\nAssistant:",
        settings.system_prompt.trim_end(),
        context,
        prompt
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(context_turns: usize) -> PromptSettings {
        PromptSettings {
            system_prompt: "SYSTEM".to_string(),
            context_turns,
            refusal_marker: "cannot".to_string(),
        }
    }

    #[test]
    fn test_prompt_without_history() {
        let prompt = build_prompt("hello", &[], &settings(3));
        assert_eq!(prompt, "SYSTEM\n\n\nUser: hello\nAssistant:");
    }

    #[test]
    fn test_prompt_replays_recent_turns_in_order() {
        let history: Vec<Turn> = (1..=5)
            .map(|i| Turn::new(format!("q{}", i), format!("a{}", i)))
            .collect();
        let prompt = build_prompt("next", &history, &settings(2));
        assert_eq!(
            prompt,
            "SYSTEM\n\nUser: q4\nAssistant: a4\nUser: q5\nAssistant: a5\n\nUser: next\nAssistant:"
        );
    }

    #[test]
    fn test_refusals_are_filtered_after_windowing() {
        let history = vec![
            Turn::new("old", "fine"),
            Turn::new("bad", "I CANNOT help with that."),
            Turn::new("good", "Sure."),
        ];
        let window = context_window(&history, &settings(2));
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].user, "good");
    }

    #[test]
    fn test_empty_marker_keeps_everything() {
        let history = vec![Turn::new("bad", "I cannot.")];
        let mut settings = settings(3);
        settings.refusal_marker.clear();
        assert_eq!(context_window(&history, &settings).len(), 1);
    }
}
