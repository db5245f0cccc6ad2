//! REPL input parsing.

use std::path::PathBuf;

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/open", "/generate", "/history", "/select", "/undo", "/redo", "/voice", "/save",
    "/dismiss", "/status", "/help",
];

/// Commands whose argument is a filesystem path.
pub const PATH_COMMANDS: &[&str] = &["/open", "/save"];

/// Argument placeholder shown after a command that takes one.
pub fn argument_hint(command: &str) -> Option<&'static str> {
    match command {
        "/open" | "/save" => Some("<path>"),
        "/select" => Some("<index>"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    Help,
    Open(PathBuf),
    Generate,
    History,
    Select(usize),
    Undo,
    Redo,
    Voice,
    Save(PathBuf),
    Dismiss,
    Status,
    /// Plain text: becomes the instruction and is submitted.
    Instruction(String),
    Invalid(String),
}

impl ReplCommand {
    /// Parses one trimmed, non-empty input line.
    pub fn parse(line: &str) -> Self {
        if line == "quit" || line == "exit" {
            return Self::Quit;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Instruction(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("help", _) => Self::Help,
            ("generate", _) => Self::Generate,
            ("history", _) => Self::History,
            ("undo", _) => Self::Undo,
            ("redo", _) => Self::Redo,
            ("voice", _) => Self::Voice,
            ("dismiss", _) => Self::Dismiss,
            ("status", _) => Self::Status,
            ("open", "") => Self::Invalid("Usage: /open <path>".into()),
            ("open", path) => Self::Open(PathBuf::from(path)),
            ("save", "") => Self::Invalid("Usage: /save <path>".into()),
            ("save", path) => Self::Save(PathBuf::from(path)),
            ("select", index) => match index.parse() {
                Ok(index) => Self::Select(index),
                Err(_) => Self::Invalid("Usage: /select <index>".into()),
            },
            _ => Self::Invalid(format!("Unknown command: /{name}")),
        }
    }
}
