use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sightspeech::services::announcer::{Announcer, LogAnnouncer, SayAnnouncer};
use sightspeech::services::text_source::HttpTextSource;
use sightspeech::{ReactorConfig, SequenceKind, SessionBuilder, SessionHandle};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnnouncerKind {
    Say,
    Log,
}

/// Navigate scanned text with gestures and voice from the console.
#[derive(Debug, Parser)]
#[command(name = "sightspeech", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Stabilizer window size (frames)
    #[arg(long)]
    window: Option<usize>,

    #[arg(long, value_enum, default_value_t = AnnouncerKind::Say)]
    announcer: AnnouncerKind,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 2. Config (file, then flags)
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ReactorConfig::load(path)?,
        None => ReactorConfig::default(),
    };
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(window) = cli.window {
        config.window_size = window;
    }

    // 3. Collaborators
    let announcer: Arc<dyn Announcer> = match cli.announcer {
        AnnouncerKind::Say => Arc::new(SayAnnouncer::new()),
        AnnouncerKind::Log => Arc::new(LogAnnouncer),
    };
    let source = Arc::new(HttpTextSource::new(
        &config.backend_url,
        Duration::from_millis(config.request_timeout_ms),
    )?);

    let (session, handle) = SessionBuilder::new(config)
        .announcer(announcer)
        .text_source(source)
        .build()?;

    tracing::info!("Session {} ready", session.id());

    // 4. Console Input
    let console = handle.clone();
    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();

        println!("Commands: frame <label> | hold <label> <n> | say <text> | cmd <key> | kind words|sentences | quit");

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            if !dispatch_line(&console, line.trim()).await {
                break;
            }
        }
        console.shutdown();
    });

    // 5. Run Kernel
    let snapshot = session.run().await;
    drop(handle);
    tracing::info!(
        "Done. {} stable commands, {} loads applied",
        snapshot.stable_commands,
        snapshot.load_stats.applied
    );
    Ok(())
}

/// Returns false when the console asked to quit.
async fn dispatch_line(handle: &SessionHandle, line: &str) -> bool {
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let result = match verb {
        "quit" | "exit" => return false,
        "frame" => {
            handle.notify_frame(rest);
            Ok(())
        }
        "hold" => {
            let (label, count) = parse_hold(rest);
            for _ in 0..count {
                handle.notify_frame(label);
            }
            Ok(())
        }
        "say" => handle.notify_utterance(rest).await,
        "cmd" => handle.send_command(rest).await,
        "kind" => match rest.parse::<SequenceKind>() {
            Ok(kind) => handle.set_kind(kind).await,
            Err(e) => {
                println!("{}", e);
                Ok(())
            }
        },
        other => {
            println!("Unknown command '{}'", other);
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("Failed to dispatch input: {}", e);
        return false;
    }
    true
}

/// `<label> [n]`. The trailing token is a count only if it is a number, so
/// labels with spaces (`No Gesture`) survive.
fn parse_hold(rest: &str) -> (&str, usize) {
    match rest.rsplit_once(' ') {
        Some((label, count)) => match count.parse::<usize>() {
            Ok(count) => (label.trim_end(), count),
            Err(_) => (rest, 1),
        },
        None => (rest, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_keeps_multi_word_labels() {
        assert_eq!(parse_hold("No Gesture"), ("No Gesture", 1));
        assert_eq!(parse_hold("No Gesture 25"), ("No Gesture", 25));
        assert_eq!(parse_hold("Pointing_Up 20"), ("Pointing_Up", 20));
        assert_eq!(parse_hold("Victory"), ("Victory", 1));
    }
}
