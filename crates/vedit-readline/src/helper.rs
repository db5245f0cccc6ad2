//! Line editing support: slash command completion, path completion for
//! commands that take a file, argument hints, and command highlighting.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::{COMMANDS, PATH_COMMANDS, argument_hint};

pub struct CliHelper {
    files: FilenameCompleter,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Default for CliHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for CliHelper {}

/// Command token and, once a space was typed, the rest of the line.
fn split_command(line: &str) -> (&str, Option<&str>) {
    match line.split_once(' ') {
        Some((command, argument)) => (command, Some(argument)),
        None => (line, None),
    }
}

fn command_candidates(prefix: &str) -> Vec<Pair> {
    COMMANDS
        .iter()
        .filter(|command| command.starts_with(prefix))
        .map(|&command| Pair {
            display: command.to_string(),
            replacement: match argument_hint(command) {
                Some(_) => format!("{command} "),
                None => command.to_string(),
            },
        })
        .collect()
}

/// Greyed-out text shown after the cursor.
fn hint_for(line: &str) -> Option<String> {
    if !line.starts_with('/') {
        return None;
    }
    match split_command(line) {
        (prefix, None) => {
            let mut matches = COMMANDS.iter().filter(|command| command.starts_with(prefix));
            let command = matches.next()?;
            if matches.next().is_some() {
                return None;
            }
            let rest = &command[prefix.len()..];
            match argument_hint(command) {
                Some(argument) => Some(format!("{rest} {argument}")),
                None => (!rest.is_empty()).then(|| rest.to_string()),
            }
        }
        (command, Some("")) => argument_hint(command).map(str::to_string),
        _ => None,
    }
}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        match split_command(&line[..pos]) {
            (prefix, None) if prefix.starts_with('/') => Ok((0, command_candidates(prefix))),
            (command, Some(_)) if PATH_COMMANDS.contains(&command) => {
                self.files.complete(line, pos, ctx)
            }
            _ => Ok((pos, Vec::new())),
        }
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        hint_for(line)
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let (command, argument) = split_command(line);
        let command = if COMMANDS.contains(&command) {
            command.bright_cyan()
        } else {
            command.red()
        };
        match argument {
            Some(argument) => Owned(format!("{command} {argument}")),
            None => Owned(command.to_string()),
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    // the command colour depends on the whole token, so redraw on every key
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for CliHelper {}
