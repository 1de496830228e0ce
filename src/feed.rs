// Roster feed ingestion.
//
// Reads player records from a published spreadsheet export: a local CSV
// file, or the sheet's JSON row endpoint. Both go through the same raw row
// struct; malformed numeric cells coerce to 0 instead of dropping the row,
// matching how the rating engine treats missing data. Rows carrying a
// Man-of-the-Match date are historical snapshots and are split out of the
// base roster.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::lineup::{Attributes, Player, Position};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("failed to fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("sheet endpoint did not return a JSON row array: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A dated Man-of-the-Match snapshot of a player's attributes. Kept apart
/// from the base roster; the lineup engine never places these.
#[derive(Debug, Clone)]
pub struct MotmRecord {
    pub player: Player,
    pub date: NaiveDate,
}

/// Everything the feed produced: the base roster (feed order preserved)
/// and the award history.
#[derive(Debug, Clone, Default)]
pub struct PlayerFeed {
    pub roster: Vec<Player>,
    pub motm: Vec<MotmRecord>,
}

// ---------------------------------------------------------------------------
// Raw row struct (private) -- sheet export format
// ---------------------------------------------------------------------------

/// One spreadsheet row. Attribute columns are lenient: numbers, numeric
/// strings, or junk (which counts as 0). Weak foot is taken on whatever
/// scale the sheet uses -- curated data keeps it in 0-50, which is the
/// scale the rating weights were designed for.
#[derive(Debug, Deserialize)]
struct RawSheetRow {
    #[serde(default, alias = "Name", alias = "Player", alias = "player")]
    name: String,
    #[serde(default, alias = "Position", alias = "pos", alias = "Pos")]
    position: String,
    #[serde(default, alias = "Speed", deserialize_with = "lenient_number")]
    speed: f64,
    #[serde(default, alias = "Shooting", deserialize_with = "lenient_number")]
    shooting: f64,
    #[serde(default, alias = "Passing", deserialize_with = "lenient_number")]
    passing: f64,
    #[serde(default, alias = "Dribbling", deserialize_with = "lenient_number")]
    dribbling: f64,
    #[serde(default, alias = "Physical", deserialize_with = "lenient_number")]
    physical: f64,
    #[serde(default, alias = "Defending", deserialize_with = "lenient_number")]
    defending: f64,
    #[serde(
        default,
        alias = "Goalkeeping",
        alias = "goalkeeping",
        deserialize_with = "lenient_number"
    )]
    gk: f64,
    #[serde(
        default,
        alias = "WeakFoot",
        alias = "Weak Foot",
        alias = "weak_foot",
        deserialize_with = "lenient_number"
    )]
    weakfoot: f64,
    #[serde(default, alias = "Photo")]
    photo: Option<String>,
    #[serde(default, alias = "Id", alias = "ID", deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, alias = "Date", alias = "MotmDate", alias = "motm_date")]
    date: Option<String>,
}

/// Accept a number, a numeric string, or anything else (-> 0).
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) if n.is_finite() => n,
        Raw::Number(_) => 0.0,
        Raw::Text(s) => s.trim().parse().unwrap_or(0.0),
        Raw::Other(_) => 0.0,
    })
}

/// Accept a string or numeric ID; empty strings count as absent.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Raw::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the roster from a local CSV export.
pub fn load_csv(path: &Path) -> Result<PlayerFeed, FeedError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| FeedError::Io {
        path: display.clone(),
        source: e,
    })?;
    parse_csv(&text, &display)
}

/// Parse CSV text in the sheet export format. Unreadable rows are skipped
/// with a warning; a malformed header section is an error.
pub fn parse_csv(text: &str, origin: &str) -> Result<PlayerFeed, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    reader.headers().map_err(|e| FeedError::Csv {
        path: origin.to_string(),
        source: e,
    })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawSheetRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!("skipping unreadable CSV row in {origin}: {e}"),
        }
    }
    Ok(feed_from_rows(rows))
}

/// Fetch the roster from the published sheet's JSON row endpoint.
pub async fn fetch_sheet(url: &str) -> Result<PlayerFeed, FeedError> {
    let body = reqwest::get(url)
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| FeedError::Http {
            url: url.to_string(),
            source: e,
        })?
        .text()
        .await
        .map_err(|e| FeedError::Http {
            url: url.to_string(),
            source: e,
        })?;
    parse_sheet_json(&body)
}

/// Parse the sheet endpoint's JSON body: an array of row objects keyed by
/// header. Unreadable rows are skipped with a warning.
pub fn parse_sheet_json(body: &str) -> Result<PlayerFeed, FeedError> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let parsed = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("skipping unreadable sheet row {i}: {e}");
                None
            }
        })
        .collect();
    Ok(feed_from_rows(parsed))
}

/// Convert raw rows into the feed, splitting MOTM snapshots out of the
/// roster and dropping duplicate or unusable rows.
fn feed_from_rows(rows: Vec<RawSheetRow>) -> PlayerFeed {
    let mut feed = PlayerFeed::default();
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        if row.name.trim().is_empty() {
            warn!("skipping row with no player name");
            continue;
        }
        let Some(position) = Position::from_str_pos(&row.position) else {
            warn!(
                "skipping {}: unknown position `{}`",
                row.name, row.position
            );
            continue;
        };

        let attributes = Attributes {
            speed: row.speed,
            shooting: row.shooting,
            passing: row.passing,
            dribbling: row.dribbling,
            physical: row.physical,
            defending: row.defending,
            goalkeeping: row.gk,
            weak_foot: row.weakfoot,
        };
        let photo = row.photo.filter(|p| !p.trim().is_empty());
        let player = Player::from_feed(row.id, row.name.trim().to_string(), position, attributes, photo);

        // A dated row is a historical award snapshot, not a base record.
        if let Some(raw_date) = row.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            match parse_sheet_date(raw_date) {
                Some(date) => feed.motm.push(MotmRecord { player, date }),
                None => warn!(
                    "skipping award snapshot for {}: unparseable date `{raw_date}`",
                    player.name
                ),
            }
            continue;
        }

        let key = player
            .id
            .clone()
            .unwrap_or_else(|| player.name.clone());
        if !seen.insert(key) {
            warn!("skipping duplicate roster row for {}", player.name);
            continue;
        }
        feed.roster.push(player);
    }

    feed
}

fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}
