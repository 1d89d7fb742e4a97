//! dadbot-runner: headless driver for the dadbot core.
//!
//! Usage:
//!   dadbot-runner --config bot.json [--seed 12345] [--db dadbot.db] [--roster roster.json]
//!   dadbot-runner add-entry <roster.json> <name> <role codes, e.g. bm>
//!
//! In the default mode each stdin line is a JSON `BotEvent`; replies go to
//! stdout as `{"reply": "..."}`, failures as `{"error": "..."}`.

use anyhow::Result;
use dadbot_core::{
    bot::DadBot,
    config::BotConfig,
    directory::StaticDirectory,
    event::BotEvent,
    roster::{roles_from_codes, Roster},
    store::BotStore,
};
use std::env;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("add-entry") {
        return add_entry(&args[2..]);
    }

    let mut config = match find_arg(&args, "--config") {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    if let Some(db) = find_arg(&args, "--db") {
        config.db_path = db.to_string();
    }
    if let Some(roster) = find_arg(&args, "--roster") {
        config.roster_path = roster.to_string();
    }
    let seed = parse_arg(&args, "--seed")
        .or(config.seed)
        .unwrap_or_else(clock_seed);

    log::info!(
        "dadbot-runner: roster={} db={} seed={seed}",
        config.roster_path,
        config.db_path
    );

    let roster = Roster::load(&config.roster_path)?;
    let store = BotStore::open(&config.db_path)?;
    store.migrate()?;
    let mut bot = DadBot::new(&config, &roster, store, seed)?;

    run_event_loop(&mut bot)
}

fn run_event_loop(bot: &mut DadBot<'_>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    // Names learned from events stand in for the live member directory.
    let mut directory = StaticDirectory::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let event: BotEvent = match serde_json::from_str(&buffer) {
            Ok(e) => e,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        remember_name(&mut directory, &event);

        match bot.handle_event(&event, &directory) {
            Ok(Some(reply)) => writeln!(stdout, "{}", serde_json::json!({ "reply": reply }))?,
            Ok(None) => {}
            Err(e) => {
                log::warn!("{} failed: {e}", event.type_name());
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn remember_name(directory: &mut StaticDirectory, event: &BotEvent) {
    match event {
        BotEvent::MemberRoleChanged { user_id, display_name, .. } => {
            directory.insert(*user_id, display_name)
        }
        BotEvent::MessageReceived { author_id, display_name, .. } => {
            directory.insert(*author_id, display_name)
        }
        BotEvent::DisplayNameChanged { user_id, after, .. } => directory.insert(*user_id, after),
        BotEvent::Command { .. } => {}
    }
}

/// Offline roster maintenance: add or replace one entry, keep the file sorted.
fn add_entry(args: &[String]) -> Result<()> {
    let [path, name, codes] = args else {
        anyhow::bail!("usage: dadbot-runner add-entry <roster.json> <name> <codes>");
    };
    let mut roster = if std::path::Path::new(path).exists() {
        Roster::load(path)?
    } else {
        Roster::default()
    };
    roster.upsert_entry(name, roles_from_codes(codes)?)?;
    roster.save(path)?;
    println!("{name} saved to {path} ({} entries)", roster.len());
    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    find_arg(args, flag).and_then(|v| v.parse().ok())
}

fn clock_seed() -> u64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0) as u64
}
