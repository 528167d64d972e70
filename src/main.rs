use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use seashell::config::Config;
use seashell::logging;

#[derive(Parser)]
#[command(name = "seashell")]
#[command(about = "A POSIX-flavored virtual shell with cooperative processes and pipelines")]
struct Cli {
    /// Store key of a script to run instead of an interactive session
    script: Option<String>,

    /// Override config file location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    logging::init(&config.logging);

    // A script argument or piped stdin runs without the TUI.
    let code = if cli.script.is_some() || !io::stdin().is_terminal() {
        seashell::ui::run_headless(config, cli.script)?
    } else {
        seashell::ui::run(config)?
    };
    std::process::exit(code);
}
