use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vedit_application::{GenerateOutcome, ImageEditor};
use vedit_core::{VeditError, VoiceCapture, parse_data_url};
use vedit_infrastructure::{ConfigService, FileImageSource, export_image};
use vedit_interaction::{GeminiApiClient, voice_capture_from_config};

mod command;
mod helper;

use command::ReplCommand;
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "vedit")]
#[command(about = "Edit images with typed or spoken instructions", long_about = None)]
struct Cli {
    /// Image to open on startup
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Directory holding config.toml and secret.json
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

/// Results produced by background tasks, printed by the response handler.
enum ReplEvent {
    Generated(GenerateOutcome),
    Transcript(String),
    NothingHeard,
    VoiceFailed(VeditError),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("VEDIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // ===== Backend Initialization =====
    let config_service = ConfigService::new(cli.config_dir.as_deref());
    let config = config_service
        .load_config()
        .context("Failed to load config.toml")?;
    let api_key = match config_service.gemini_api_key() {
        Ok(key) => key,
        Err(err) => {
            let secret_path = config_service.paths().ensure_secret_file()?;
            anyhow::bail!("{err} ({})", secret_path.display());
        }
    };

    let client = GeminiApiClient::new(api_key).with_models(&config.models);
    let voice = voice_capture_from_config(&config.voice);
    tracing::info!(
        refine_model = client.refine_model(),
        edit_model = client.edit_model(),
        voice = voice.is_supported(),
        "editor initialized"
    );
    let editor = ImageEditor::new(Arc::new(client));

    let (event_tx, mut event_rx) = mpsc::channel::<ReplEvent>(32);

    // Spawn response handler task
    let response_editor = editor.clone();
    let response_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                ReplEvent::Generated(outcome) => {
                    print_outcome(&response_editor, outcome).await;
                }
                ReplEvent::Transcript(text) => {
                    println!("{}", format!("Heard: \"{text}\"").bright_magenta());
                    println!(
                        "{}",
                        "Type /generate to apply it, or type a new instruction.".bright_black()
                    );
                }
                ReplEvent::NothingHeard => {
                    println!("{}", "No speech recognized.".yellow());
                }
                ReplEvent::VoiceFailed(err) => {
                    eprintln!("{}", err.to_string().red());
                }
            }
        }
    });

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== vedit ===".bright_magenta().bold());
    println!(
        "{}",
        "Open an image with '/open <path>', then type what to change. '/help' lists commands."
            .bright_black()
    );
    if !voice.is_supported() {
        println!(
            "{}",
            "Voice recognition is not supported: set [voice] command in config.toml.".yellow()
        );
    }
    println!();

    if let Some(path) = &cli.image {
        open_image(&editor, path).await;
    }

    // Background generate/listen tasks, aborted on exit
    let mut tasks = JoinSet::new();

    // ===== Main REPL Loop =====
    loop {
        while tasks.try_join_next().is_some() {}
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match ReplCommand::parse(trimmed) {
                    ReplCommand::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    ReplCommand::Help => print_help(),
                    ReplCommand::Open(path) => open_image(&editor, &path).await,
                    ReplCommand::Instruction(text) => {
                        editor.set_instruction(text).await;
                        spawn_generate(&mut tasks, &editor, &event_tx);
                    }
                    ReplCommand::Generate => spawn_generate(&mut tasks, &editor, &event_tx),
                    ReplCommand::History => print_history(&editor).await,
                    ReplCommand::Select(index) => report_selection(editor.select_entry(index).await),
                    ReplCommand::Undo => report_selection(editor.step_back().await),
                    ReplCommand::Redo => report_selection(editor.step_forward().await),
                    ReplCommand::Voice => spawn_listen(&mut tasks, &voice, &editor, &event_tx),
                    ReplCommand::Save(path) => save_current(&editor, &path).await,
                    ReplCommand::Dismiss => editor.dismiss_error().await,
                    ReplCommand::Status => print_status(&editor, voice.as_ref()).await,
                    ReplCommand::Invalid(message) => println!("{}", message.bright_black()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    if editor.is_busy() {
        println!("{}", "Cancelling the in-flight edit.".yellow());
    }
    if voice.is_listening() {
        println!("{}", "Stopping voice capture.".yellow());
    }
    tasks.shutdown().await;

    // Drop the sender to signal shutdown
    drop(event_tx);
    let _ = response_handler.await;

    Ok(())
}

fn spawn_generate(tasks: &mut JoinSet<()>, editor: &ImageEditor, tx: &mpsc::Sender<ReplEvent>) {
    if editor.is_busy() {
        println!("{}", "An edit is already in progress.".yellow());
        return;
    }
    println!("{}", "Generating...".bright_blue());

    let editor = editor.clone();
    let tx = tx.clone();
    tasks.spawn(async move {
        let outcome = editor.generate().await;
        let _ = tx.send(ReplEvent::Generated(outcome)).await;
    });
}

fn spawn_listen(
    tasks: &mut JoinSet<()>,
    voice: &Arc<dyn VoiceCapture>,
    editor: &ImageEditor,
    tx: &mpsc::Sender<ReplEvent>,
) {
    if !voice.is_supported() {
        println!(
            "{}",
            "Voice recognition is not supported: set [voice] command in config.toml.".yellow()
        );
        return;
    }
    if voice.is_listening() {
        println!("{}", "Already listening.".yellow());
        return;
    }
    println!("{}", "Listening...".bright_magenta());

    let voice = Arc::clone(voice);
    let editor = editor.clone();
    let tx = tx.clone();
    tasks.spawn(async move {
        let event = match voice.listen().await {
            Ok(Some(text)) => {
                editor.apply_transcript(text.clone()).await;
                ReplEvent::Transcript(text)
            }
            Ok(None) => ReplEvent::NothingHeard,
            Err(err) => ReplEvent::VoiceFailed(err),
        };
        let _ = tx.send(event).await;
    });
}

async fn open_image(editor: &ImageEditor, path: &std::path::Path) {
    let source = FileImageSource::new(path);
    let result = match source.load().await {
        Ok(url) => editor.open_image(url).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => println!(
            "{}",
            format!("Opened {} ({})", source.path().display(), source.mime_type()).green()
        ),
        Err(err) => eprintln!("{}", err.to_string().red()),
    }
}

async fn save_current(editor: &ImageEditor, path: &std::path::Path) {
    let Some(entry) = editor.current_entry().await else {
        println!("{}", "Open an image first.".yellow());
        return;
    };
    match export_image(entry.image_url(), path).await {
        Ok(written) => println!("{}", format!("Saved {}", written.display()).green()),
        Err(err) => eprintln!("{}", err.to_string().red()),
    }
}

async fn print_outcome(editor: &ImageEditor, outcome: GenerateOutcome) {
    match outcome {
        GenerateOutcome::Completed(entry) => {
            let index = editor.snapshot().await.current_index.unwrap_or_default();
            println!("{}", format!("[{index}] {}", entry.prompt()).bright_green());
        }
        GenerateOutcome::Failed { message } => {
            eprintln!("{}", message.red());
            println!("{}", "Type /dismiss to clear the error.".bright_black());
        }
        GenerateOutcome::Ignored(reason) => println!("{}", reason.to_string().yellow()),
    }
}

fn report_selection(result: vedit_core::Result<vedit_core::HistoryEntry>) {
    match result {
        Ok(entry) => println!("{}", format!("Viewing \"{}\"", entry.prompt()).cyan()),
        Err(err) => println!("{}", err.to_string().yellow()),
    }
}

async fn print_history(editor: &ImageEditor) {
    let snapshot = editor.snapshot().await;
    if snapshot.entries.is_empty() {
        println!("{}", "No image open.".bright_black());
        return;
    }
    println!("{}", "History".bold());
    for (index, entry) in snapshot.entries.iter().enumerate() {
        let size = parse_data_url(entry.image_url())
            .map(|image| image.data.len() * 3 / 4)
            .unwrap_or_default();
        let line = format!(
            "  [{index}] {} ({} KiB, {})",
            entry.prompt(),
            size / 1024,
            created_time(entry.created_at())
        );
        if snapshot.current_index == Some(index) {
            println!("{}", format!("* {}", line.trim_start()).bright_magenta());
        } else {
            println!("{line}");
        }
    }
}

async fn print_status(editor: &ImageEditor, voice: &dyn VoiceCapture) {
    let snapshot = editor.snapshot().await;
    let position = match snapshot.current_index {
        Some(index) => format!("{} of {}", index + 1, snapshot.entries.len()),
        None => "no image".to_string(),
    };
    println!("Viewing:     {position}");
    println!("Instruction: {}", snapshot.instruction);
    println!(
        "State:       {}",
        if snapshot.busy { "generating" } else { "idle" }
    );
    println!(
        "Voice:       {}",
        match (voice.is_supported(), voice.is_listening()) {
            (false, _) => "unsupported",
            (true, true) => "listening",
            (true, false) => "ready",
        }
    );
    if let Some(error) = snapshot.error {
        println!("{}", format!("Error:       {error}").red());
    }
}

fn print_help() {
    let rows = [
        ("<text>", "set the instruction and generate"),
        ("/generate", "submit the pending instruction"),
        ("/voice", "dictate an instruction"),
        ("/open <path>", "open an image, starting a new history"),
        ("/history", "list edits"),
        ("/select <n>", "view entry n"),
        ("/undo, /redo", "step through the history"),
        ("/save <path>", "write the current image to disk"),
        ("/status", "show editor state"),
        ("/dismiss", "clear the last error"),
        ("quit", "exit"),
    ];
    for (command, description) in rows {
        println!("  {:<14} {}", command.bright_cyan(), description.bright_black());
    }
}

/// Local `HH:MM:SS` of an RFC 3339 timestamp.
fn created_time(created_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(created_at)
        .map(|time| time.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_time_falls_back_to_raw_text() {
        assert_eq!(created_time("yesterday"), "yesterday");
        let formatted = created_time("2026-10-19T08:30:05+00:00");
        assert_eq!(formatted.len(), 8);
        assert!(formatted.ends_with(":05"));
    }
}
