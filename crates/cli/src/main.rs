mod logging;
mod script;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use layerwalk_core::ProgramState;

/// Replay toolbar and render-loop commands against a walkthrough
/// configuration and print the resulting state as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "layerwalk", version)]
struct Cli {
    /// Walkthrough configuration (JSON).
    config: PathBuf,

    /// File with one command per line.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Commands to run after the script, e.g. `next` or `"tick 0.5"`.
    commands: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let mut state = ProgramState::from_config_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let mut commands = Vec::new();
    if let Some(path) = &cli.script {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        commands.extend(script::parse_script(&text)?);
    }
    for (index, raw) in cli.commands.iter().enumerate() {
        commands.push(
            raw.parse()
                .with_context(|| format!("argument {}: {raw}", index + 1))?,
        );
    }
    if commands.is_empty() {
        commands.push(script::Command::Status);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for command in &commands {
        let step = script::execute(&mut state, command);
        serde_json::to_writer(&mut out, &step)?;
        writeln!(out)?;
    }
    Ok(())
}
