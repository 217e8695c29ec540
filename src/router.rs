use crate::api::{build_prompt, Completion, OllamaClient, PromptSettings};
use crate::brain::OfflineBrain;
use crate::config::Config;
use crate::error::Result;
use crate::history::History;
use crate::models::{GenerateOptions, GenerateRequest, Turn};
use colored::*;
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

pub const SPEAKER: &str = "VEO-x";

/// Which side produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brain {
    Remote,
    Offline,
}

impl fmt::Display for Brain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brain::Remote => write!(f, "ollama"),
            Brain::Offline => write!(f, "offline"),
        }
    }
}

/// Result of routing one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The model answered and the text has already been streamed to the output.
    Streamed(String),
    /// The offline brain answered; the caller still has to display it.
    Offline(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Streamed(text) | Reply::Offline(text) => text,
        }
    }

    pub fn brain(&self) -> Brain {
        match self {
            Reply::Streamed(_) => Brain::Remote,
            Reply::Offline(_) => Brain::Offline,
        }
    }
}

/// Mutable per-run state the REPL commands act on.
#[derive(Debug, Clone)]
pub struct Session {
    pub model: String,
    pub options: GenerateOptions,
    /// Skip the inference server entirely.
    pub offline: bool,
    pub verbose: bool,
    pub started_at: Instant,
    pub last_brain: Option<Brain>,
}

impl Session {
    pub fn new(model: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            model: model.into(),
            options,
            offline: false,
            verbose: false,
            started_at: Instant::now(),
            last_brain: None,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Snapshot printed by `/status`.
#[derive(Debug, Clone)]
pub struct Status {
    pub model: String,
    pub num_thread: Option<u32>,
    pub num_ctx: Option<u32>,
    pub turns: usize,
    pub last_brain: Option<Brain>,
    pub offline: bool,
    pub uptime: Duration,
}

/// Sends each input to the model server, falling back to the offline brain,
/// and records exactly one turn per input.
pub struct Router {
    session: Session,
    client: OllamaClient,
    prompt: PromptSettings,
    brain: OfflineBrain,
    history: History,
}

impl Router {
    pub fn new(
        session: Session,
        client: OllamaClient,
        prompt: PromptSettings,
        brain: OfflineBrain,
        history: History,
    ) -> Self {
        Self {
            session,
            client,
            prompt,
            brain,
            history,
        }
    }

    pub fn from_config(config: &Config, history: History) -> Self {
        let mut session = Session::new(config.model.clone(), config.options.clone());
        session.offline = config.offline;
        session.verbose = config.verbose;

        Self::new(
            session,
            OllamaClient::new(config.client_settings()),
            config.prompt_settings(),
            OfflineBrain::new(config.recall),
            history,
        )
    }

    /// Answer `input`, append the turn and persist the history before returning.
    ///
    /// Only a failed history write is an error; every inference failure falls
    /// through to the offline brain.
    pub async fn process<W: Write>(&mut self, input: &str, out: &mut W) -> Result<Reply> {
        if let Some(completion) = self.ask_remote(input, out).await {
            writeln!(
                out,
                "{}",
                format!("[Generated in {:.2}s]", completion.elapsed.as_secs_f64()).dimmed()
            )?;
            self.history.record(Turn::new(input, completion.text.clone()))?;
            self.session.last_brain = Some(Brain::Remote);
            return Ok(Reply::Streamed(completion.text));
        }

        let reply = self.brain.respond(input, self.history.turns());
        self.history.record(Turn::new(input, reply.clone()))?;
        self.session.last_brain = Some(Brain::Offline);
        Ok(Reply::Offline(reply))
    }

    async fn ask_remote<W: Write>(&self, input: &str, out: &mut W) -> Option<Completion> {
        if self.session.offline {
            return None;
        }

        let request = GenerateRequest {
            model: self.session.model.clone(),
            prompt: build_prompt(input, self.history.turns(), &self.prompt),
            stream: true,
            options: self.session.options.clone(),
        };

        match self
            .client
            .ask(&request, &format!("{}: ", SPEAKER), out)
            .await
        {
            Ok(completion) => {
                if self.session.verbose && completion.malformed_chunks > 0 {
                    eprintln!(
                        "{}",
                        format!(
                            "[veo] Skipped {} malformed chunk(s)",
                            completion.malformed_chunks
                        )
                        .dimmed()
                    );
                }
                Some(completion)
            }
            Err(e) => {
                if self.session.verbose {
                    eprintln!(
                        "{}",
                        format!("[veo] Falling back to offline brain: {}", e).dimmed()
                    );
                }
                None
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.session.model
    }

    /// Switch the model used for every following request.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.session.model = model.into();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> Status {
        Status {
            model: self.session.model.clone(),
            num_thread: self.session.options.num_thread,
            num_ctx: self.session.options.num_ctx,
            turns: self.history.len(),
            last_brain: self.session.last_brain,
            offline: self.session.offline,
            uptime: self.session.uptime(),
        }
    }
}
