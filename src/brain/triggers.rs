use regex::Regex;

pub const GRATITUDE_TRIGGERS: &[&str] = &["thank you", "thanks", "thx", "ty"];

pub const HOW_ARE_YOU_TRIGGERS: &[&str] = &[
    "how are you",
    "how are u",
    "how r u",
    "hows it going",
    "how you doing",
];

pub const GREETING_TRIGGERS: &[&str] = &["hi", "hello", "hey", "yo", "sup", "hola"];

pub const MOOD_TRIGGERS: &[&str] = &["bored", "tired", "happy", "sad", "excited", "angry"];

pub const TIME_TRIGGERS: &[&str] = &["time"];

pub const DATE_TRIGGERS: &[&str] = &["date", "today"];

pub const JOKE_TRIGGERS: &[&str] = &["joke", "funny", "make me laugh"];

pub const ADVICE_TRIGGERS: &[&str] = &["should i", "what do you think", "what's your opinion"];

pub const GRATITUDE_REPLIES: &[&str] = &["You're welcome!", "No problem!", "Anytime!"];

pub const HOW_ARE_YOU_REPLIES: &[&str] = &[
    "I'm doing great! How about you?",
    "All good here. How's your day?",
    "Feeling awesome! And you?",
];

pub const GREETING_REPLIES: &[&str] = &[
    "Hey there! How's it going?",
    "Hi! Nice to see you.",
    "Hello! How's your day?",
    "Yo! What's up?",
];

pub const MOOD_REPLIES: &[&str] = &[
    "I see... hope you're having a good one!",
    "Thanks for sharing!",
    "Sounds like you've got some energy there!",
];

pub const JOKE_REPLIES: &[&str] = &[
    "Why did the computer go to therapy? Too many bytes of stress!",
    "I would tell you a joke about UDP... but you might not get it.",
    "Why do programmers prefer dark mode? Because light attracts bugs!",
];

pub const ADVICE_REPLIES: &[&str] = &[
    "Hmm... I'd weigh the options carefully.",
    "It depends... tell me more.",
    "Think it through before deciding.",
];

pub const DEFAULT_REPLIES: &[&str] = &[
    "Interesting... tell me more!",
    "I'm listening, go on.",
    "I see, what else is happening?",
    "Could you explain that a bit more?",
    "That's intriguing, tell me more details!",
];

pub const COIN_FACES: &[&str] = &["Heads", "Tails"];

pub const COIN_COMMANDS: &[&str] = &["flip a coin", "toss a coin"];

pub const DICE_COMMANDS: &[&str] = &["roll a dice", "roll a die"];

/// A canned answer that fires when every keyword appears as a whole word.
pub struct Fact {
    pub keywords: &'static [&'static [&'static str]],
    pub replies: &'static [&'static str],
}

/// Each inner slice lists alternatives; every inner slice must match.
pub const FACTS: &[Fact] = &[
    Fact {
        keywords: &[&["linux"], &["command", "commands", "tips"]],
        replies: &[
            "Common Linux commands: ls, cd, pwd, mkdir, rm, cp, mv, grep, cat, nano.",
            "Tip: 'man command' shows the manual for any Linux command.",
            "'sudo' gives admin privileges. Use wisely!",
        ],
    },
    Fact {
        keywords: &[&["egg", "eggs"], &["cake", "cakes"]],
        replies: &["Most cake recipes use 2 to 3 eggs."],
    },
];

/// Whole-word matcher over a list of trigger phrases.
pub struct TriggerSet {
    pattern: Regex,
}

impl TriggerSet {
    /// Phrases are normalized the same way user input is, so
    /// `"what's"` matches the normalized `"whats"`.
    pub fn new(phrases: &[&str]) -> Self {
        let alternatives: Vec<String> = phrases
            .iter()
            .map(|p| regex::escape(&super::normalize(p)))
            .collect();
        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
            .expect("escaped trigger phrases form a valid regex");
        Self { pattern }
    }

    pub fn matches(&self, normalized: &str) -> bool {
        self.pattern.is_match(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_matching() {
        let greetings = TriggerSet::new(GREETING_TRIGGERS);
        assert!(greetings.matches("hi there"));
        assert!(greetings.matches("well hello"));
        assert!(!greetings.matches("this is high"));
        assert!(!greetings.matches("they"));
    }

    #[test]
    fn test_phrases_with_punctuation_are_normalized() {
        let advice = TriggerSet::new(ADVICE_TRIGGERS);
        assert!(advice.matches("whats your opinion on rust"));
        assert!(advice.matches("should i learn go"));
    }
}
