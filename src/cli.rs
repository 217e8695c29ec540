use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "veo")]
#[command(about = "Local conversational assistant backed by an Ollama server, with an offline fallback", long_about = None)]
pub struct Args {
    #[arg(short = 'm', long = "model", help = "Model to request from the inference server")]
    pub model: Option<String>,

    #[arg(
        long = "url",
        help = "Base URL of the inference server (e.g., http://localhost:11434)"
    )]
    pub url: Option<String>,

    #[arg(long = "offline", help = "Never contact the inference server")]
    pub offline: bool,

    #[arg(short = 'n', long = "new", help = "Start from an empty conversation history")]
    pub new_conversation: bool,

    #[arg(long = "clear", help = "Delete the conversation history and exit")]
    pub clear_history: bool,

    #[arg(long = "memory-file", help = "Path of the conversation history file")]
    pub memory_file: Option<String>,

    #[arg(long = "context-turns", help = "Number of past turns sent as context")]
    pub context_turns: Option<usize>,

    #[arg(long = "max-turns", help = "Maximum number of turns kept on disk")]
    pub max_turns: Option<usize>,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostics to stderr")]
    pub verbose: bool,
}
