pub mod math;
pub mod triggers;

use crate::models::Turn;
use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use triggers::*;

/// How many recent turns smart recall looks through.
pub const RECALL_WINDOW: usize = 10;

pub const RECALL_PREFIX: &str = "As we discussed earlier: ";

pub const MATH_FAILURE_REPLY: &str = "Hmm... that math didn't work.";

/// Which rule produced an offline reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Recall,
    Gratitude,
    HowAreYou,
    Greeting,
    Mood,
    Arithmetic,
    Time,
    Date,
    Joke,
    Advice,
    Fact,
    CoinFlip,
    DiceRoll,
    Default,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Recall => "recall",
            Rule::Gratitude => "gratitude",
            Rule::HowAreYou => "how-are-you",
            Rule::Greeting => "greeting",
            Rule::Mood => "mood",
            Rule::Arithmetic => "arithmetic",
            Rule::Time => "time",
            Rule::Date => "date",
            Rule::Joke => "joke",
            Rule::Advice => "advice",
            Rule::Fact => "fact",
            Rule::CoinFlip => "coin-flip",
            Rule::DiceRoll => "dice-roll",
            Rule::Default => "default",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineReply {
    pub rule: Rule,
    pub text: String,
}

/// Lower-case and drop everything that is not a word character or whitespace.
pub fn normalize(text: &str) -> String {
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    let re = PUNCT.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation regex"));
    re.replace_all(&text.to_lowercase(), "").into_owned()
}

struct Triggers {
    gratitude: TriggerSet,
    how_are_you: TriggerSet,
    greeting: TriggerSet,
    mood: TriggerSet,
    time: TriggerSet,
    date: TriggerSet,
    joke: TriggerSet,
    advice: TriggerSet,
    coin: TriggerSet,
    dice: TriggerSet,
}

fn triggers() -> &'static Triggers {
    static TRIGGERS: OnceLock<Triggers> = OnceLock::new();
    TRIGGERS.get_or_init(|| Triggers {
        gratitude: TriggerSet::new(GRATITUDE_TRIGGERS),
        how_are_you: TriggerSet::new(HOW_ARE_YOU_TRIGGERS),
        greeting: TriggerSet::new(GREETING_TRIGGERS),
        mood: TriggerSet::new(MOOD_TRIGGERS),
        time: TriggerSet::new(TIME_TRIGGERS),
        date: TriggerSet::new(DATE_TRIGGERS),
        joke: TriggerSet::new(JOKE_TRIGGERS),
        advice: TriggerSet::new(ADVICE_TRIGGERS),
        coin: TriggerSet::new(COIN_COMMANDS),
        dice: TriggerSet::new(DICE_COMMANDS),
    })
}

fn pick<R: Rng + ?Sized>(rng: &mut R, replies: &[&str]) -> String {
    replies.choose(rng).copied().unwrap_or_default().to_string()
}

fn fact_matches(fact: &Fact, words: &[&str]) -> bool {
    fact.keywords
        .iter()
        .all(|alternatives| alternatives.iter().any(|k| words.contains(k)))
}

/// Rule-based fallback used when the model server cannot answer.
///
/// Rules are tried most specific first and the first match wins.
#[derive(Debug, Clone)]
pub struct OfflineBrain {
    recall: bool,
}

impl OfflineBrain {
    pub fn new(recall: bool) -> Self {
        Self { recall }
    }

    pub fn respond(&self, input: &str, history: &[Turn]) -> String {
        self.respond_with(input, history, Local::now(), &mut rand::thread_rng())
            .text
    }

    pub fn respond_with<R: Rng + ?Sized>(
        &self,
        input: &str,
        history: &[Turn],
        now: DateTime<Local>,
        rng: &mut R,
    ) -> OfflineReply {
        let user = normalize(input);
        let reply = |rule: Rule, text: String| OfflineReply { rule, text };

        let t = triggers();
        // Normalizing strips the operators, so the whitelist check runs on the raw text.
        let expression = input.trim();

        // Answers computed from the input, the clock or the RNG are never replayed.
        let fresh = math::looks_like_arithmetic(expression)
            || t.time.matches(&user)
            || t.date.matches(&user)
            || t.coin.matches(&user)
            || t.dice.matches(&user);
        if self.recall && !fresh {
            if let Some(answer) = recall(&user, history) {
                return reply(Rule::Recall, format!("{}{}", RECALL_PREFIX, answer));
            }
        }

        if t.gratitude.matches(&user) {
            return reply(Rule::Gratitude, pick(rng, GRATITUDE_REPLIES));
        }
        if t.how_are_you.matches(&user) {
            return reply(Rule::HowAreYou, pick(rng, HOW_ARE_YOU_REPLIES));
        }
        if t.greeting.matches(&user) {
            return reply(Rule::Greeting, pick(rng, GREETING_REPLIES));
        }
        if t.mood.matches(&user) {
            return reply(Rule::Mood, pick(rng, MOOD_REPLIES));
        }

        if math::looks_like_arithmetic(expression) {
            let text = match math::evaluate(expression) {
                Ok(value) => format!("The result is {}.", math::format_number(value)),
                Err(_) => MATH_FAILURE_REPLY.to_string(),
            };
            return reply(Rule::Arithmetic, text);
        }

        if t.time.matches(&user) {
            return reply(
                Rule::Time,
                format!("The time is {}.", now.format("%H:%M:%S")),
            );
        }
        if t.date.matches(&user) {
            return reply(
                Rule::Date,
                format!("Today is {}.", now.format("%A, %B %d, %Y")),
            );
        }
        if t.joke.matches(&user) {
            return reply(Rule::Joke, pick(rng, JOKE_REPLIES));
        }
        if t.advice.matches(&user) {
            return reply(Rule::Advice, pick(rng, ADVICE_REPLIES));
        }

        let words: Vec<&str> = user.split_whitespace().collect();
        if let Some(fact) = FACTS.iter().find(|f| fact_matches(f, &words)) {
            return reply(Rule::Fact, pick(rng, fact.replies));
        }

        if t.coin.matches(&user) {
            return reply(Rule::CoinFlip, pick(rng, COIN_FACES));
        }
        if t.dice.matches(&user) {
            return reply(Rule::DiceRoll, rng.gen_range(1..=6u32).to_string());
        }

        reply(Rule::Default, pick(rng, DEFAULT_REPLIES))
    }
}

impl Default for OfflineBrain {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Most recent answer among the last few turns whose question contains `user`.
fn recall<'a>(user: &str, history: &'a [Turn]) -> Option<&'a str> {
    let user = user.trim();
    if user.is_empty() {
        return None;
    }

    let start = history.len().saturating_sub(RECALL_WINDOW);
    history[start..]
        .iter()
        .rev()
        .find(|turn| normalize(&turn.user).contains(user))
        .map(|turn| {
            let mut answer = turn.assistant.as_str();
            while let Some(rest) = answer.strip_prefix(RECALL_PREFIX) {
                answer = rest;
            }
            answer
        })
}
