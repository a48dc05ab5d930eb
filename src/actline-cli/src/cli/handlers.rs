//! Command dispatch and execution handlers.
//!
//! Handlers write to the supplied writer so they can be exercised without a
//! terminal. A rejected line is an [`Outcome::Rejected`], not an error.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use actline_core::tree::Node;
use actline_core::{ActionCompleter, Group, TreeLoader};
use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::args::{Commands, CompleteArgs, RunArgs, TreeArgs, ValidateArgs};

/// Result of a handled command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// The line failed validation.
    Rejected,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Accepted => ExitCode::SUCCESS,
            Outcome::Rejected => ExitCode::FAILURE,
        }
    }
}

/// Dispatch a CLI command to its handler.
pub fn dispatch_command(command: Commands, out: &mut dyn Write) -> Result<Outcome> {
    match command {
        Commands::Complete(args) => run_complete(args, out),
        Commands::Validate(args) => run_validate(args, out),
        Commands::Run(args) => run_action(args, out),
        Commands::Tree(args) => run_tree(args, out),
    }
}

/// Loads the tree file, binding every named action to a handler that echoes
/// its positional arguments.
pub fn load_completer(path: &Path) -> Result<ActionCompleter> {
    let completer = TreeLoader::new()
        .fallback_handler(|args| Ok(Value::Array(args.positional)))
        .load_path(path)
        .with_context(|| format!("Failed to load command tree from {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        children = completer.root().len(),
        tolerance = completer.config().fuzzy_tolerance,
        "command tree loaded"
    );
    Ok(completer)
}

fn run_complete(args: CompleteArgs, out: &mut dyn Write) -> Result<Outcome> {
    let completer = load_completer(&args.source.tree)?;
    for completion in completer.complete(&args.line) {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            completion.text,
            completion.start_position,
            completion.display_text(),
            completion.display_meta_text()
        )?;
    }
    Ok(Outcome::Accepted)
}

fn run_validate(args: ValidateArgs, out: &mut dyn Write) -> Result<Outcome> {
    let completer = load_completer(&args.source.tree)?;
    let cursor = args.cursor.unwrap_or_else(|| args.line.chars().count());
    match completer.validate(&args.line, cursor) {
        Ok(()) => {
            writeln!(out, "ok")?;
            Ok(Outcome::Accepted)
        }
        Err(fault) => {
            writeln!(out, "error at {}: {}", fault.cursor_position, fault.message)?;
            Ok(Outcome::Rejected)
        }
    }
}

fn run_action(args: RunArgs, out: &mut dyn Write) -> Result<Outcome> {
    let completer = load_completer(&args.source.tree)?;
    if let Err(fault) = completer.validate(&args.line, args.line.chars().count()) {
        writeln!(out, "error at {}: {}", fault.cursor_position, fault.message)?;
        return Ok(Outcome::Rejected);
    }

    let extra: Vec<Value> = args.extra.into_iter().map(Value::String).collect();
    let call = completer
        .partial_call(&args.line)
        .with_context(|| format!("Failed to assemble '{}'", args.line))?;

    // Actions without a handler echo their arguments
    let result = if call.has_handler() {
        call.call(extra, Map::new())
            .with_context(|| format!("Failed to run '{}'", args.line))?
    } else {
        let mut positional = call.args().to_vec();
        positional.extend(extra);
        Value::Array(positional)
    };
    writeln!(out, "{}", serde_json::to_string(&result)?)?;
    Ok(Outcome::Accepted)
}

fn run_tree(args: TreeArgs, out: &mut dyn Write) -> Result<Outcome> {
    let completer = load_completer(&args.tree)?;
    write_outline(completer.root(), 0, out)?;
    Ok(Outcome::Accepted)
}

fn write_outline(group: &Group, depth: usize, out: &mut dyn Write) -> Result<()> {
    let indent = "  ".repeat(depth);
    for (name, node) in group.children() {
        match node {
            Node::Group(child) => {
                writeln!(out, "{}{}/", indent, name)?;
                write_outline(child, depth + 1, out)?;
            }
            Node::Action(action) => {
                let mut line = format!("{}{}", indent, name);
                for param in &action.params {
                    let kind = param.source.kind();
                    match &param.cast {
                        Some(cast) => line.push_str(&format!(" <{}:{}>", kind, cast.name())),
                        None => line.push_str(&format!(" <{}>", kind)),
                    }
                }
                if action.capture_all {
                    line.push_str(" ...");
                }
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}
