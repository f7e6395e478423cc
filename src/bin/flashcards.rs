use anyhow::Result;
use clap::Parser;
use env_logger::Target;
use flashcards::{filter_args, Session};
use std::env;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Flashcards in the terminal", args_override_self = true)]
struct Args {
    /// load cards from this file before the first prompt
    #[arg(long)]
    import: Option<PathBuf>,

    /// save cards to this file after `exit`
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse_from(filter_args(env::args_os()));

    // warn by default, RUST_LOG overrides
    env_logger::Builder::new()
        .target(Target::Stderr)
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut session = Session::new(stdin, stdout, rand::rng());

    if let Some(path) = &args.import {
        session.import_path(path)?;
    }
    session.run()?;
    if let Some(path) = &args.export {
        session.export_path(path)?;
    }
    Ok(())
}
