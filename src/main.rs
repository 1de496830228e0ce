// Lineup assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr; stdout belongs to command output)
// 2. Load config
// 3. Open the board snapshot cache
// 4. Load the player feed (sheet endpoint first, CSV as fallback)
// 5. Restore the cached board, or start fresh
// 6. Run the command loop until quit
// 7. Save the board state on exit

use std::io::{self, BufRead, Write as _};
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use lineup_assistant::config;
use lineup_assistant::db::Database;
use lineup_assistant::feed::{self, PlayerFeed};
use lineup_assistant::lineup::formation;
use lineup_assistant::lineup::{
    compare, Applied, Command, LineupBoard, Mode, Position, Side,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Lineup assistant starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: club={}, default mode {}, {:?} compatibility",
        config.club.name, config.club.default_mode, config.club.compatibility
    );

    // 3. Open the snapshot cache
    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Cache opened at {}", config.db_path);

    // 4. Load the player feed
    let player_feed = load_feed(&config).await;
    info!(
        "Feed loaded: {} players, {} award snapshots",
        player_feed.roster.len(),
        player_feed.motm.len()
    );
    if player_feed.roster.is_empty() {
        warn!("player feed is empty; the board starts with nothing to place");
    }

    // 5. Restore the cached board, or start fresh
    let rule = config.club.compatibility;
    let board = match db.load_snapshot().context("failed to read cached board")? {
        Some(snapshot) => match LineupBoard::restore(&snapshot, rule) {
            Ok(board) => {
                info!("Restored cached {} board", board.mode());
                board
            }
            Err(e) => {
                warn!("cached board rejected ({e}); starting fresh");
                LineupBoard::new(config.club.default_mode, rule)
            }
        },
        None => LineupBoard::new(config.club.default_mode, rule),
    };

    // 6. Command loop
    println!("{} lineup board (type `help` for commands)", config.club.name);
    let board = run_repl(board, &player_feed, &db)?;

    // 7. Save on exit
    db.save_snapshot(&board.snapshot())
        .context("failed to save board state")?;
    info!("Lineup assistant shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr so stdout stays clean for command output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lineup_assistant=info,warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

/// Load the roster: try the published sheet first, fall back to the CSV.
async fn load_feed(config: &config::Config) -> PlayerFeed {
    if let Some(url) = config.feed.sheet_url.as_deref().filter(|u| !u.is_empty()) {
        match feed::fetch_sheet(url).await {
            Ok(feed) => return feed,
            Err(e) => warn!("sheet fetch failed ({e}); falling back to local CSV"),
        }
    }
    if let Some(path) = config.feed.players_csv.as_deref().filter(|p| !p.is_empty()) {
        match feed::load_csv(Path::new(path)) {
            Ok(feed) => return feed,
            Err(e) => warn!("failed to load {path}: {e}"),
        }
    }
    PlayerFeed::default()
}

// ---------------------------------------------------------------------------
// Command loop
// ---------------------------------------------------------------------------

/// One parsed input line: either an engine command or a local action.
enum ReplAction {
    Engine(Command),
    Show,
    Players(Option<Position>),
    Formations,
    Compare,
    Save,
    Help,
    Quit,
}

fn run_repl(
    mut board: LineupBoard,
    player_feed: &PlayerFeed,
    db: &Database,
) -> anyhow::Result<LineupBoard> {
    let stdin = io::stdin();
    let mut out = io::stdout();

    loop {
        print!("> ");
        out.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let action = match parse_line(line) {
            Ok(action) => action,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match action {
            ReplAction::Quit => break,
            ReplAction::Help => print_help(),
            ReplAction::Show => print_board(&board),
            ReplAction::Players(filter) => print_players(player_feed, filter),
            ReplAction::Formations => print_formations(board.mode()),
            ReplAction::Compare => print_compare(&board),
            ReplAction::Save => {
                db.save_snapshot(&board.snapshot())
                    .context("failed to save board state")?;
                println!("saved");
            }
            ReplAction::Engine(command) => {
                if let Some(msg) = slot_bounds_error(&board, &command) {
                    println!("{msg}");
                    continue;
                }
                match board.apply(&command, &player_feed.roster) {
                    Ok(Applied::Done) => {
                        // keep the cache in step with every applied gesture
                        if let Err(e) = db.save_snapshot(&board.snapshot()) {
                            warn!("failed to cache board state: {e}");
                        }
                        print_board(&board);
                    }
                    Ok(Applied::Rejected) => {
                        println!("rejected: that player does not fit the slot's position");
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
        }
    }

    Ok(board)
}

/// The engine treats out-of-range slots as caller bugs, so the presentation
/// checks bounds before dispatching.
fn slot_bounds_error(board: &LineupBoard, command: &Command) -> Option<String> {
    let count = board.mode().player_count();
    let check = |slot: usize| {
        (slot >= count).then(|| format!("slot {slot} out of range (0-{})", count - 1))
    };
    match command {
        Command::Place { slot, .. } | Command::Remove { slot, .. } => check(*slot),
        Command::Move {
            from_slot, to_slot, ..
        } => check(*from_slot).or_else(|| check(*to_slot)),
        _ => None,
    }
}

fn parse_line(line: &str) -> Result<ReplAction, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = words.collect();

    match verb.as_str() {
        "quit" | "exit" | "q" => Ok(ReplAction::Quit),
        "help" | "?" => Ok(ReplAction::Help),
        "show" => Ok(ReplAction::Show),
        "formations" => Ok(ReplAction::Formations),
        "compare" => Ok(ReplAction::Compare),
        "save" => Ok(ReplAction::Save),
        "players" => match rest.first() {
            None => Ok(ReplAction::Players(None)),
            Some(raw) => Position::from_str_pos(raw)
                .map(|pos| ReplAction::Players(Some(pos)))
                .ok_or_else(|| format!("unknown position `{raw}` (GK/DF/MF/ST)")),
        },
        "place" => {
            let (side, slot) = parse_side_slot(&rest)?;
            let name = rest[2..].join(" ");
            if name.is_empty() {
                return Err("usage: place <a|b> <slot> <player name>".into());
            }
            Ok(ReplAction::Engine(Command::Place {
                side,
                slot,
                player: name,
            }))
        }
        "move" => {
            if rest.len() != 4 {
                return Err("usage: move <a|b> <slot> <a|b> <slot>".into());
            }
            let (from_side, from_slot) = parse_side_slot(&rest[..2])?;
            let (to_side, to_slot) = parse_side_slot(&rest[2..])?;
            Ok(ReplAction::Engine(Command::Move {
                from_side,
                from_slot,
                to_side,
                to_slot,
            }))
        }
        "remove" => {
            let (side, slot) = parse_side_slot(&rest)?;
            Ok(ReplAction::Engine(Command::Remove { side, slot }))
        }
        "formation" => {
            if rest.len() != 2 {
                return Err("usage: formation <a|b> <name>".into());
            }
            let side = parse_side(rest[0])?;
            Ok(ReplAction::Engine(Command::Formation {
                side,
                name: rest[1].to_string(),
            }))
        }
        "mode" => {
            let raw = rest.first().copied().unwrap_or_default();
            let mode = Mode::from_str_mode(raw)
                .ok_or_else(|| format!("unknown mode `{raw}` (6v6/9v9/10v10/11v11)"))?;
            Ok(ReplAction::Engine(Command::SetMode { mode }))
        }
        "random" => Ok(ReplAction::Engine(Command::Randomize)),
        "reset" => Ok(ReplAction::Engine(Command::Reset)),
        other => Err(format!("unknown command `{other}` (try `help`)")),
    }
}

fn parse_side(raw: &str) -> Result<Side, String> {
    Side::from_str_side(raw).ok_or_else(|| format!("unknown side `{raw}` (a or b)"))
}

fn parse_side_slot(rest: &[&str]) -> Result<(Side, usize), String> {
    if rest.len() < 2 {
        return Err("expected: <a|b> <slot>".into());
    }
    let side = parse_side(rest[0])?;
    let slot: usize = rest[1]
        .parse()
        .map_err(|_| format!("`{}` is not a slot number", rest[1]))?;
    Ok((side, slot))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_help() {
    println!(
        "\
commands:
  show                          print both lineups
  players [GK|DF|MF|ST]         list the feed roster
  formations                    list formations for the current mode
  place <a|b> <slot> <name>     put a listed player into a slot
  move <a|b> <slot> <a|b> <slot>  drag a placed player (swaps if occupied)
  remove <a|b> <slot>           clear a slot
  formation <a|b> <name>        switch a side's formation
  mode <6v6|9v9|10v10|11v11>    switch roster size (clears both sides)
  random                        auto-fill both sides from the feed
  reset                         clear both sides
  compare                       side-by-side attribute averages
  save                          cache the board now
  quit                          save and exit"
    );
}

fn print_board(board: &LineupBoard) {
    for side in Side::BOTH {
        let mismatched = board.mismatched_slots(side);
        println!(
            "side {}: {} ({})",
            side.label(),
            board.formation(side).name,
            board.mode()
        );
        for (i, slot) in board.slots(side).iter().enumerate() {
            let required = board.required_position(side, i);
            match slot {
                Some(placed) => println!(
                    "  [{i:>2}] {required}  {:<24} {:>3}{}",
                    placed.player.name,
                    placed.player.overall,
                    if mismatched.contains(&i) { "  !" } else { "" }
                ),
                None => println!("  [{i:>2}] {required}  -"),
            }
        }
    }
}

fn print_players(player_feed: &PlayerFeed, filter: Option<Position>) {
    let mut listed: Vec<_> = player_feed
        .roster
        .iter()
        .filter(|p| filter.map_or(true, |pos| p.position == pos))
        .collect();
    listed.sort_by(|a, b| b.overall.cmp(&a.overall).then(a.name.cmp(&b.name)));
    if listed.is_empty() {
        println!("no players in the feed");
        return;
    }
    for p in listed {
        println!("  {}  {:<24} {:>3}", p.position, p.name, p.overall);
    }
}

fn print_formations(mode: Mode) {
    println!("formations for {mode}:");
    for f in formation::formations_for(mode) {
        let labels: Vec<&str> = f.positions.iter().map(|p| p.display_str()).collect();
        println!("  {:<6} {}", f.name, labels.join(" "));
    }
}

fn print_compare(board: &LineupBoard) {
    println!("{:<14} {:>6} {:>6}", "", "A", "B");
    for attr in compare::Attribute::ALL {
        println!(
            "{:<14} {:>6} {:>6}",
            attr.display_str(),
            compare::average_attribute(board, Side::A, attr),
            compare::average_attribute(board, Side::B, attr)
        );
    }
    for pos in [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Striker,
    ] {
        println!(
            "{:<14} {:>6} {:>6}",
            format!("overall @ {pos}"),
            compare::average_by_position(board, Side::A, pos),
            compare::average_by_position(board, Side::B, pos)
        );
    }
}
