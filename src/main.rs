use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use matra::run_source;

/// Command-line driver for the matra matrix-language interpreter.
///
/// Evaluates either an inline chunk of source text or a script file, and
/// can echo the value of the final statement for use in shell pipelines.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Inline source text to evaluate.
    #[arg(required_unless_present = "script", conflicts_with = "script")]
    source: Option<String>,

    /// Evaluate a script file instead of inline source.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    script: Option<PathBuf>,

    /// Echo the value of the last statement once the program finishes.
    #[arg(short, long)]
    pipe_mode: bool,
}

impl Cli {
    /// The program text this invocation should run.
    fn program(&self) -> Result<String, String> {
        match (&self.script, &self.source) {
            (Some(path), _) => fs::read_to_string(path)
                .map_err(|e| format!("cannot read script '{}': {e}", path.display())),
            (None, Some(text)) => Ok(text.clone()),
            (None, None) => Err("no source given".to_string()),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let program = match cli.program() {
        Ok(text) => text,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run_source(&program, cli.pipe_mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
