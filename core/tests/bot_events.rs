//! Bot facade tests: platform events in, replies and persisted state out.

use chrono::{TimeZone, Utc};
use dadbot_core::{
    bot::{DadBot, PlatformEvents},
    command::BotCommand,
    config::BotConfig,
    directory::{NoDirectory, StaticDirectory},
    error::BotError,
    event::BotEvent,
    ledger::TimeoutState,
    roster::Roster,
    store::BotStore,
    types::Timestamp,
};

const ROSTER: &str = r#"{
    "Ahri": ["Mid"], "Darius": ["Baron"], "Evelynn": ["Jungle"],
    "Janna": ["Support"], "Jinx": ["Dragon"], "Lucian": ["Dragon", "Mid"]
}"#;

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn migrated(store: BotStore) -> BotStore {
    let _ = env_logger::builder().is_test(true).try_init();
    store.migrate().expect("migration");
    store
}

fn build(config: &BotConfig) -> DadBot<'_> {
    let roster = Roster::from_json(ROSTER).expect("roster");
    let store = migrated(BotStore::in_memory().expect("in-memory store"));
    DadBot::new(config, &roster, store, config.seed.unwrap_or(1)).expect("bot")
}

#[test]
fn role_changes_drive_the_ledger_and_persist() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);

    bot.on_role_changed(1, "alice", true, at(1000)).unwrap();
    bot.on_role_changed(1, "alice", true, at(1200)).unwrap(); // re-entry ignored
    assert_eq!(bot.timeouts().effective_duration(1, at(1500)), 500);
    bot.on_role_changed(1, "alice", false, at(1600)).unwrap();

    let stored = bot.store().load_timeout_records().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].count, 1);
    assert_eq!(stored[0].cumulative_seconds, 600);
    assert_eq!(stored[0].open_since, None);
}

#[test]
fn leave_without_enter_is_swallowed() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);
    bot.on_role_changed(5, "eve", false, at(10)).unwrap();
    assert_eq!(bot.timeouts().effective_duration(5, at(20)), 0);
    assert!(bot.timeouts().record(5).is_none());
    assert_eq!(bot.store().timeout_record_count().unwrap(), 0);

    let board = bot
        .handle_command(&BotCommand::Jailtime { users: vec![] }, at(20), &NoDirectory)
        .unwrap();
    assert_eq!(board, "No timeouts yet.");
}

#[test]
fn jailtime_reports_named_users_and_leaderboard() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);
    let mut directory = StaticDirectory::new();
    directory.insert(1, "Alice");

    let empty = bot
        .handle_command(&BotCommand::Jailtime { users: vec![] }, at(0), &directory)
        .unwrap();
    assert_eq!(empty, "No timeouts yet.");

    bot.on_role_changed(1, "alice", true, at(0)).unwrap();
    bot.on_role_changed(1, "alice", false, at(4340)).unwrap();
    bot.on_role_changed(2, "bob", true, at(100)).unwrap();

    let named = bot
        .handle_command(&BotCommand::Jailtime { users: vec![1, 3] }, at(200), &directory)
        .unwrap();
    assert_eq!(
        named,
        "Alice has been in timeout 1 times for 1:12:20.\n\
         User not found has been in timeout 0 times for 0:0:0."
    );

    let board = bot
        .handle_command(&BotCommand::Jailtime { users: vec![] }, at(200), &directory)
        .unwrap();
    assert!(board.starts_with("```Most timed out:"));
    assert!(board.ends_with("```"));
    // bob is still in timeout; the directory misses, so the ledger name is used.
    assert!(board.contains(" 2: 0:1:40 | bob"), "{board}");
    assert!(board.contains(" 1: 1:12:20 | Alice"), "{board}");
}

#[test]
fn mentions_reply_with_running_total_and_respect_cooldown() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);

    let first = bot
        .on_message(1, "alice", 10, "Reading Mistborn by Sanderson", at(0))
        .unwrap();
    assert_eq!(
        first.as_deref(),
        Some("alice has mentioned Mistborn or Sanderson 1 time(s).")
    );
    assert_eq!(bot.mentions().count(1), 2);

    // Within the cooldown on the same channel: counted, not announced.
    let quiet = bot.on_message(1, "alice", 10, "mistborn", at(60)).unwrap();
    assert!(quiet.is_none());
    assert_eq!(bot.mentions().count(1), 3);

    // Another channel is not throttled.
    let other = bot.on_message(1, "alice", 11, "sanderson", at(61)).unwrap();
    assert_eq!(
        other.as_deref(),
        Some("alice has mentioned Mistborn or Sanderson 4 time(s).")
    );

    let later = bot.on_message(1, "alice", 10, "mistborn", at(600)).unwrap();
    assert!(later.is_some());

    assert_eq!(bot.store().load_mention_records().unwrap(), vec![(1, 5)]);
}

#[test]
fn bot_messages_and_the_command_do_not_count() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);
    let own = config.bot_user_id.unwrap();

    assert!(bot.on_message(own, "dadbot", 1, "mistborn", at(0)).unwrap().is_none());
    assert!(bot.on_message(2, "bob", 1, "!Mistborn", at(0)).unwrap().is_none());
    assert!(bot.on_message(2, "bob", 1, "nothing to see", at(0)).unwrap().is_none());
    assert_eq!(bot.mentions().count(own), 0);
    assert_eq!(bot.mentions().count(2), 0);
}

#[test]
fn mention_leaderboard_adds_honorary_user() {
    let config = BotConfig {
        honorary_user_id: Some(9),
        mention_leaderboard_size: 1,
        ..BotConfig::default_test()
    };
    let mut bot = build(&config);
    let mut directory = StaticDirectory::new();
    directory.insert(1, "Alice");
    directory.insert(9, "Barn");

    bot.on_message(1, "alice", 1, "mistborn mistborn", at(0)).unwrap();
    bot.on_message(9, "barn", 2, "sanderson", at(0)).unwrap();

    let board = bot.handle_command(&BotCommand::Mistborn, at(0), &directory).unwrap();
    assert_eq!(
        board,
        "```Mistborn / Sanderson Top 1 Leaderboard\n 1: 2    | Alice\n\n\
         Honorary Mention: Barn with 1\n```"
    );
}

#[test]
fn name_history_is_newest_first() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);
    let mut directory = StaticDirectory::new();
    directory.insert(4, "Dave the Third");

    bot.on_display_name_changed(4, "dave", "Dave II", at(0)).unwrap();
    let history = bot
        .handle_command(&BotCommand::History { user: 4 }, at(10), &directory)
        .unwrap();
    assert_eq!(history, "Dave the Third\nDave II\ndave");

    let unknown = bot
        .handle_command(&BotCommand::History { user: 8 }, at(10), &NoDirectory)
        .unwrap();
    assert_eq!(unknown, "No name history for User not found.");
}

#[test]
fn team_commands_render_squads() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);

    let team = bot.handle_command(&BotCommand::Team, at(0), &NoDirectory).unwrap();
    assert_eq!(team.lines().count(), 5);

    let teams = bot.handle_command(&BotCommand::Teams, at(0), &NoDirectory).unwrap();
    assert!(teams.starts_with("Side A\n> "));
    assert!(teams.contains("\nSide B\n> "));
    assert_eq!(teams.lines().filter(|l| l.starts_with("> ")).count(), 10);

    let chaos = bot.handle_command(&BotCommand::Chaos, at(0), &NoDirectory).unwrap();
    assert_eq!(chaos.lines().filter(|l| l.starts_with("> ")).count(), 10);
}

#[test]
fn chaos_with_small_roster_is_an_error() {
    let config = BotConfig::default_test();
    let roster = Roster::from_json(r#"{"A": ["Mid"], "B": ["Baron"]}"#).unwrap();
    let store = migrated(BotStore::in_memory().unwrap());
    let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
    assert!(matches!(
        bot.handle_command(&BotCommand::Chaos, at(0), &NoDirectory),
        Err(BotError::InsufficientRoster { .. })
    ));
}

#[test]
fn wire_events_dispatch() {
    let config = BotConfig::default_test();
    let mut bot = build(&config);
    let events: Vec<BotEvent> = serde_json::from_str(
        r#"[
            {"type": "member_role_changed", "user_id": 3, "display_name": "cat",
             "now_in_timeout": true, "at": "2024-05-01T10:00:00Z"},
            {"type": "member_role_changed", "user_id": 3, "display_name": "cat",
             "now_in_timeout": false, "at": "2024-05-01T10:05:00Z"},
            {"type": "command", "command": {"cmd": "jailtime", "users": [3]},
             "at": "2024-05-01T11:00:00Z"}
        ]"#,
    )
    .unwrap();

    let replies: Vec<Option<String>> = events
        .iter()
        .map(|e| bot.handle_event(e, &NoDirectory).unwrap())
        .collect();
    assert_eq!(replies[0], None);
    assert_eq!(replies[1], None);
    assert_eq!(
        replies[2].as_deref(),
        Some("cat has been in timeout 1 times for 0:5:0.")
    );
}

#[test]
fn ledger_state_survives_restart() {
    let path = std::env::temp_dir().join(format!("dadbot-restart-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let path_str = path.to_str().unwrap().to_string();
    let config = BotConfig::default_test();
    let roster = Roster::from_json(ROSTER).unwrap();

    {
        let store = migrated(BotStore::open(&path_str).unwrap());
        let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
        bot.on_role_changed(1, "alice", true, at(100)).unwrap();
        bot.on_message(2, "bob", 1, "mistborn", at(100)).unwrap();
    }

    let store = migrated(BotStore::open(&path_str).unwrap());
    let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
    assert_eq!(bot.timeouts().effective_duration(1, at(400)), 300);
    bot.on_role_changed(1, "alice", false, at(500)).unwrap();
    assert_eq!(bot.timeouts().record(1).unwrap().cumulative_seconds, 400);
    assert_eq!(bot.mentions().count(2), 1);

    drop(bot);
    let _ = std::fs::remove_file(&path);
}

fn temp_db(tag: &str) -> String {
    let path = std::env::temp_dir().join(format!("dadbot-{tag}-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path.to_str().unwrap().to_string()
}

#[test]
fn failed_timeout_write_rolls_back_memory() {
    let path = temp_db("timeout-write");
    let config = BotConfig::default_test();
    let roster = Roster::from_json(ROSTER).unwrap();
    let store = migrated(BotStore::open(&path).unwrap());
    let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
    bot.on_role_changed(1, "alice", true, at(100)).unwrap();

    let other = rusqlite::Connection::open(&path).unwrap();
    other.execute_batch("DROP TABLE timeout_record;").unwrap();

    assert!(bot.on_role_changed(2, "bob", true, at(200)).is_err());
    assert!(bot.timeouts().record(2).is_none());
    assert_eq!(bot.timeouts().len(), 1);

    assert!(bot.on_role_changed(1, "alice", false, at(300)).is_err());
    let alice = bot.timeouts().record(1).unwrap();
    assert_eq!(alice.count, 1);
    assert_eq!(alice.cumulative_seconds, 0);
    assert_eq!(alice.state(), TimeoutState::InTimeout { since: at(100) });

    drop(bot);
    drop(other);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn failed_mention_write_rolls_back_memory() {
    let path = temp_db("mention-write");
    let config = BotConfig::default_test();
    let roster = Roster::from_json(ROSTER).unwrap();
    let store = migrated(BotStore::open(&path).unwrap());
    let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
    bot.on_message(1, "alice", 10, "mistborn", at(0)).unwrap();

    let other = rusqlite::Connection::open(&path).unwrap();
    other.execute_batch("DROP TABLE mention_record;").unwrap();

    assert!(bot.on_message(1, "alice", 10, "sanderson", at(900)).is_err());
    assert!(bot.on_message(2, "bob", 10, "sanderson", at(900)).is_err());
    assert_eq!(bot.mentions().count(1), 1);
    assert_eq!(bot.mentions().get(2), None);
    assert_eq!(bot.mentions().leaderboard(10), vec![(1, 1)]);

    drop(bot);
    drop(other);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn sub_second_entry_reads_the_same_after_restart() {
    let path = temp_db("subsec");
    let config = BotConfig::default_test();
    let roster = Roster::from_json(ROSTER).unwrap();
    let entered = Utc.timestamp_opt(100, 750_000_000).unwrap();

    let before = {
        let store = migrated(BotStore::open(&path).unwrap());
        let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
        bot.on_role_changed(1, "alice", true, entered).unwrap();
        bot.timeouts().effective_duration(1, at(400))
    };

    let store = migrated(BotStore::open(&path).unwrap());
    let mut bot = DadBot::new(&config, &roster, store, 1).unwrap();
    assert_eq!(bot.timeouts().effective_duration(1, at(400)), before);
    assert_eq!(before, 300);
    bot.on_role_changed(1, "alice", false, at(500)).unwrap();
    assert_eq!(bot.timeouts().record(1).unwrap().cumulative_seconds, 400);

    drop(bot);
    let _ = std::fs::remove_file(&path);
}
