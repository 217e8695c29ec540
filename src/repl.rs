/// Words that end the session, compared case-insensitively.
pub const EXIT_WORDS: &[&str] = &[
    "exit", "/exit", "quit", "/quit", "bye", "/bye", "goodbye", "salir", "adios", "ciao",
];

pub const GOODBYE: &str = "Goodbye! Talk soon.";

/// One line of REPL input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Status,
    /// `/model` alone asks for the current model; with a name it switches.
    Model(Option<String>),
    Empty,
    Chat(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let lower = line.to_lowercase();
    if EXIT_WORDS.contains(&lower.as_str()) {
        return Command::Exit;
    }

    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("/status") => Command::Status,
        Some("/model") => Command::Model(parts.next().map(|name| name.to_string())),
        _ => Command::Chat(line.to_string()),
    }
}
