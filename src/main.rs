use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::process;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use veo::cli::Args;
use veo::config::Config;
use veo::history::{FileHistoryStore, History, HistoryStore};
use veo::idle::{ActivityClock, IdleWatcher};
use veo::repl::{parse_line, Command, GOODBYE};
use veo::router::{Reply, Router};
use veo::ui::{print_notice, print_startup_status, render_status, speaker_line, type_out};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load configuration
    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let store = FileHistoryStore::new(&config.memory_file).verbose(config.verbose);

    // Handle --clear option
    if args.clear_history {
        match store.clear() {
            Ok(_) => {
                println!("{}", "Conversation history cleared.".green());
                return;
            }
            Err(e) => {
                eprintln!("{}", format!("Error clearing history: {}", e).red());
                process::exit(1);
            }
        }
    }

    if config.verbose {
        eprintln!(
            "{}",
            format!("[veo] Memory file: {}", config.memory_file.display()).dimmed()
        );
        eprintln!(
            "{}",
            format!("[veo] Inference server: {}", config.base_url).dimmed()
        );
    }

    let history = if config.new_conversation {
        History::empty(Box::new(store), config.max_turns)
    } else {
        History::load(Box::new(store), config.max_turns)
    };

    let mut router = Router::from_config(&config, history);
    print_startup_status(&router.status(), &Config::get_current_date());

    let clock = ActivityClock::new();
    let idle = (config.idle_seconds > 0).then(|| {
        IdleWatcher::spawn(
            clock.clone(),
            Duration::from_secs(config.idle_seconds),
            print_notice,
        )
    });

    let code = run_repl(
        &mut router,
        &clock,
        Duration::from_millis(config.type_delay_ms),
    )
    .await;

    if let Some(watcher) = idle {
        watcher.shutdown().await;
    }
    process::exit(code);
}

async fn run_repl(router: &mut Router, clock: &ActivityClock, delay: Duration) -> i32 {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        print!("{}", "You: ".bold());
        let _ = stdout.flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!();
                let _ = type_out(&mut stdout, &speaker_line(GOODBYE), delay).await;
                return 0;
            }
            Err(e) => {
                eprintln!("{} {}", "Error reading input:".red(), e);
                return 1;
            }
        };
        clock.touch();

        match parse_line(&line) {
            Command::Empty => continue,
            Command::Exit => {
                let _ = type_out(&mut stdout, &speaker_line(GOODBYE), delay).await;
                return 0;
            }
            Command::Status => {
                println!("{}", speaker_line(&render_status(&router.status())));
            }
            Command::Model(None) => {
                println!("{}", format!("Current model: {}", router.model()).cyan());
            }
            Command::Model(Some(name)) => {
                router.set_model(name);
                println!("{}", format!("Model switched to {}", router.model()).cyan());
            }
            Command::Chat(text) => match router.process(&text, &mut stdout).await {
                Ok(Reply::Streamed(_)) => {}
                Ok(Reply::Offline(reply)) => {
                    let _ = type_out(&mut stdout, &speaker_line(&reply), delay).await;
                }
                Err(e) => {
                    eprintln!("{} {}", "Error:".red(), e);
                    return 1;
                }
            },
        }
        clock.touch();
    }
}
