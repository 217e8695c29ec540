use crate::router::{Status, SPEAKER};
use colored::*;
use std::io::{self, Write};
use std::time::Duration;

/// `VEO-x: <text>`
pub fn speaker_line(text: &str) -> String {
    format!("{}: {}", SPEAKER, text)
}

/// Write `text` one character at a time, then a newline.
///
/// A zero delay prints the whole line at once.
pub async fn type_out<W: Write>(out: &mut W, text: &str, delay: Duration) -> io::Result<()> {
    if delay.is_zero() {
        writeln!(out, "{}", text)?;
        return out.flush();
    }

    for ch in text.chars() {
        write!(out, "{}", ch)?;
        out.flush()?;
        tokio::time::sleep(delay).await;
    }
    writeln!(out)?;
    out.flush()
}

/// Print an unsolicited line (idle notice) on its own line.
pub fn print_notice(text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "\n{}", speaker_line(text).dimmed());
    let _ = stdout.flush();
}

pub fn render_status(status: &Status) -> String {
    let threads = status
        .num_thread
        .map(|n| n.to_string())
        .unwrap_or_else(|| "auto".to_string());
    let brain = match (status.offline, status.last_brain) {
        (true, _) => "offline (forced)".to_string(),
        (false, Some(brain)) => brain.to_string(),
        (false, None) => "none yet".to_string(),
    };
    format!(
        "Model: {} | Threads: {} | Turns: {} | Brain: {} | Uptime: {}s",
        status.model,
        threads,
        status.turns,
        brain,
        status.uptime.as_secs()
    )
}

pub fn print_startup_status(status: &Status, date: &str) {
    let context = status
        .num_ctx
        .map(|n| n.to_string())
        .unwrap_or_else(|| "default".to_string());
    let threads = status
        .num_thread
        .map(|n| n.to_string())
        .unwrap_or_else(|| "auto".to_string());

    if status.offline {
        println!("{}", "Inference server disabled. Running offline mode only.".yellow());
    } else {
        println!("{}", format!("Ollama Model: {}", status.model).cyan());
    }
    println!("{}", format!("CPU Threads: {}", threads).dimmed());
    println!("{}", format!("Context Size: {}", context).dimmed());
    println!(
        "{}",
        format!("Memory Loaded ({} turns) | {}", status.turns, date).dimmed()
    );
    println!();
}
