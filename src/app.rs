use anyhow::Result;
use chrono::{Local, TimeZone};

use podtrack::config::{Config, LOG_KEY};
use podtrack::engine::Engine;
use podtrack::player::ConsoleNotifier;
use podtrack::store::StoreError;
use podtrack::table::local_file_path;

use crate::cli::{Cli, Command};

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let mut engine = Engine::new(config)?;
    engine.load(&ConsoleNotifier);

    match cli.command {
        Some(Command::Status) => run_status(&engine),
        Some(Command::Purge) => run_purge(&mut engine),
        Some(Command::List) | None => run_list(&engine),
    }
}

fn run_list(engine: &Engine) -> Result<()> {
    if engine.table().is_empty() {
        println!("No tracked positions yet.");
        return Ok(());
    }

    let mut entries: Vec<_> = engine.table().iter().collect();
    entries.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));

    println!("{:<10} {:<18} {:<24} ITEM", "POSITION", "TRACKED", "HOSTS");
    for (key, record) in entries {
        println!(
            "{:<10} {:<18} {:<24} {}",
            format_position(record.pos),
            format_tracked_display(record.timestamp),
            truncate(&record.hosts.join(","), 24),
            display_item(key)
        );
    }
    Ok(())
}

fn run_status(engine: &Engine) -> Result<()> {
    match engine.remote().get(LOG_KEY) {
        Ok(status) => println!("Last save: {status}"),
        Err(StoreError::NotFound) => println!("No status recorded in redis yet."),
        Err(err) => println!("Redis unreachable: {err}"),
    }
    println!("Entries loaded: {}", engine.table().len());
    println!("Local backup: {}", engine.backup().path().display());
    Ok(())
}

fn run_purge(engine: &mut Engine) -> Result<()> {
    let before = engine.table().len();
    engine.purge_and_save()?;
    let after = engine.table().len();
    if before == after {
        println!("Nothing to purge; {after} entries kept.");
    } else {
        println!("Purged {} entries; {after} kept.", before - after);
    }
    Ok(())
}

fn format_position(pos: u32) -> String {
    let hours = pos / 3600;
    let minutes = (pos % 3600) / 60;
    let seconds = pos % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

fn format_tracked_display(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn display_item(key: &str) -> String {
    match local_file_path(key) {
        Some(path) => path.display().to_string(),
        None => key.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}
