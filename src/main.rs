mod cli;
mod commands;
mod config;
mod logging;
mod render;

use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cycle_tracker::crypto::KdfParams;
use cycle_tracker::storage::FileStore;

use crate::cli::{Cli, Command};
use crate::commands::{ParamUpdate, Session};
use crate::config::TrackerConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref())?;
    let store = open_store(&cli, &config)?;
    // the only place the wall clock is read
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let session = Session::new(&store, config.defaults.tracker_data(), today);
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Set(args) => {
            let last_period = if args.clear_last_period {
                Some(None)
            } else {
                args.last_period.map(Some)
            };
            session.set(ParamUpdate {
                last_period,
                cycle_length: args.cycle_length,
                period_length: args.period_length,
                pregnancy_mode: args.pregnancy_mode,
            })?;
            session.status(&mut out, false, false)
        }
        Command::Status(args) => session.status(&mut out, args.pregnancy, args.json),
        Command::Calendar(args) => {
            let month = session.month(args.month, args.offset)?;
            session.calendar(&mut out, month, args.json)
        }
        Command::Export => session.export(&mut out),
        Command::Reset(args) => commands::reset(&store, args.yes),
    }
}

fn open_store(cli: &Cli, config: &TrackerConfig) -> Result<FileStore> {
    let encrypted = config.storage.encrypted;
    let path = match cli.data_file.clone().or_else(|| config.storage.path.clone()) {
        Some(p) => p,
        None => FileStore::default_path(encrypted)?,
    };

    if !encrypted {
        return Ok(FileStore::plain(path));
    }

    let var = cli
        .passphrase_env
        .as_deref()
        .unwrap_or(&config.storage.passphrase_env);
    let passphrase = std::env::var(var)
        .with_context(|| format!("encrypted storage needs a passphrase in ${var}"))?;
    Ok(FileStore::encrypted(path, passphrase, KdfParams::default()))
}
