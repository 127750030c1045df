//! Show-schedule maintenance command.
//!
//! The site renders shows from a JSON file whose entries carry loose,
//! human-written `dateText`/`timeText` strings ("July 4th", "7–10 PM").
//! This command derives a machine-sortable `sortDate` for every entry and
//! prunes past shows beyond the newest N, keeping the file small.
//!
//! # Usage
//!
//! ```bash
//! mkm-cli shows maintain --file src/shows.json
//! mkm-cli shows maintain --file src/shows.json --dry
//! mkm-cli shows maintain --file src/shows.json --force --keep 6
//! ```
//!
//! Entries are kept as raw JSON objects so fields this tool does not know
//! about round-trip verbatim.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use clap::Args;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Month-name lookup, full names and the abbreviations people actually
/// type.
const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// A date without an explicit year that lands further in the past than
/// this rolls over to the next year.
const ROLLOVER_PAST_DAYS: i64 = 300;

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal pattern is valid"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern is valid"));

static DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-3]?\d)\b").expect("day pattern is valid"));

static TIME_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)\b").expect("12h pattern is valid")
});

static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("24h pattern is valid"));

static BARE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s*[–-]\s*(\d{1,2})\b").expect("range pattern is valid")
});

static BARE_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").expect("hour pattern is valid"));

/// Errors that can occur during show maintenance.
#[derive(Debug, Error)]
pub enum ShowsError {
    /// The shows file could not be read.
    #[error("Could not read {0}: {1}")]
    Read(String, std::io::Error),

    /// The shows file is not valid JSON.
    #[error("{0} is not valid JSON: {1}")]
    Json(String, serde_json::Error),

    /// The top-level JSON value is not an array.
    #[error("Expected a top-level array in {0}")]
    NotAnArray(String),

    /// Writing the updated file failed.
    #[error("Failed writing {0}: {1}")]
    Write(String, std::io::Error),
}

/// Arguments for `shows maintain`.
#[derive(Debug, Args)]
pub struct MaintainArgs {
    /// Path to the shows JSON file
    #[arg(long, default_value = "src/shows.json", value_name = "PATH")]
    pub file: String,

    /// Report what would change without writing
    #[arg(long)]
    pub dry: bool,

    /// Recompute sort dates even when a valid one is present
    #[arg(long)]
    pub force: bool,

    /// How many past shows to keep (newest first)
    #[arg(long, default_value_t = 6)]
    pub keep: usize,

    /// Hour assumed when no time can be extracted (0-23)
    #[arg(long = "default-hour", default_value_t = 19, value_parser = clap::value_parser!(u32).range(0..=23))]
    pub default_hour: u32,
}

/// Result of one maintenance pass.
#[derive(Debug)]
struct MaintainOutcome {
    entries: Vec<Value>,
    updated: usize,
    skipped: usize,
    errors: usize,
    upcoming: usize,
    kept_past: usize,
    dropped: Vec<String>,
    no_valid: usize,
}

/// Normalize sort dates and prune past shows in the data file.
pub fn maintain(args: &MaintainArgs) -> Result<(), ShowsError> {
    let raw = std::fs::read_to_string(&args.file)
        .map_err(|e| ShowsError::Read(args.file.clone(), e))?;
    let data: Value =
        serde_json::from_str(&raw).map_err(|e| ShowsError::Json(args.file.clone(), e))?;
    let Value::Array(entries) = data else {
        return Err(ShowsError::NotAnArray(args.file.clone()));
    };

    let now = Local::now().naive_local();
    let outcome = maintain_entries(entries, args.force, args.keep, args.default_hour, now);

    tracing::info!(
        "Sort dates: updated={}, skipped={}, errors={}, default_hour={}, force={}",
        outcome.updated,
        outcome.skipped,
        outcome.errors,
        args.default_hour,
        args.force
    );
    tracing::info!(
        "Prune past: keep={}, kept={}, dropped={}, upcoming={}, no_valid={}",
        args.keep,
        outcome.kept_past,
        outcome.dropped.len(),
        outcome.upcoming,
        outcome.no_valid
    );
    for title in &outcome.dropped {
        tracing::info!("  dropping: {title}");
    }

    if args.dry {
        tracing::info!("Dry run, not writing {}", args.file);
        return Ok(());
    }

    // Safety backup of the previous contents; best effort.
    let backup = format!("{}.bak", args.file);
    if let Err(err) = std::fs::write(&backup, &raw) {
        tracing::warn!(path = %backup, error = %err, "Could not write backup");
    }

    let mut output = serde_json::to_string_pretty(&Value::Array(outcome.entries))
        .map_err(|e| ShowsError::Json(args.file.clone(), e))?;
    output.push('\n');
    std::fs::write(&args.file, output).map_err(|e| ShowsError::Write(args.file.clone(), e))?;

    tracing::info!("Wrote {}", Path::new(&args.file).display());
    Ok(())
}

/// Pure maintenance pass over the raw entries.
fn maintain_entries(
    entries: Vec<Value>,
    force: bool,
    keep: usize,
    default_hour: u32,
    now: NaiveDateTime,
) -> MaintainOutcome {
    let mut updated = 0;
    let mut skipped = 0;
    let mut errors = 0;

    // Step 1: ensure every entry has a valid sortDate.
    let dated: Vec<Value> = entries
        .into_iter()
        .map(|mut entry| {
            let existing = field(&entry, "sortDate").and_then(parse_sort_date);
            if existing.is_some() && !force {
                skipped += 1;
                return entry;
            }

            let computed = compute_sort_date(
                field(&entry, "dateText").unwrap_or_default(),
                field(&entry, "timeText").unwrap_or_default(),
                default_hour,
                now,
            );
            match computed {
                Some(date) => {
                    if let Some(map) = entry.as_object_mut() {
                        map.insert("sortDate".to_owned(), Value::String(format_sort_date(date)));
                        updated += 1;
                    }
                }
                None => errors += 1,
            }
            entry
        })
        .collect();

    // Step 2: split on date validity and prune old shows beyond `keep`.
    let today_start = now.date().and_hms_opt(0, 0, 0).unwrap_or(now);

    let mut upcoming: Vec<(NaiveDateTime, Value)> = Vec::new();
    let mut past: Vec<(NaiveDateTime, Value)> = Vec::new();
    let mut no_valid: Vec<Value> = Vec::new();

    for entry in dated {
        match field(&entry, "sortDate").and_then(parse_sort_date) {
            Some(date) if date >= today_start => upcoming.push((date, entry)),
            Some(date) => past.push((date, entry)),
            None => no_valid.push(entry),
        }
    }

    upcoming.sort_by_key(|(date, _)| *date);
    past.sort_by_key(|(date, _)| std::cmp::Reverse(*date));

    let dropped = past
        .iter()
        .skip(keep)
        .map(|(_, entry)| describe(entry))
        .collect();
    past.truncate(keep);

    let upcoming_count = upcoming.len();
    let kept_past = past.len();
    let no_valid_count = no_valid.len();

    let entries: Vec<Value> = upcoming
        .into_iter()
        .map(|(_, entry)| entry)
        .chain(past.into_iter().map(|(_, entry)| entry))
        .chain(no_valid)
        .collect();

    MaintainOutcome {
        entries,
        updated,
        skipped,
        errors,
        upcoming: upcoming_count,
        kept_past,
        dropped,
        no_valid: no_valid_count,
    }
}

/// String field of a JSON object entry.
fn field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

/// Human-readable handle for log lines: title, else id, else a shrug.
fn describe(entry: &Value) -> String {
    field(entry, "title")
        .or_else(|| field(entry, "id"))
        .unwrap_or("(untitled)")
        .to_owned()
}

/// Accept the formats that have appeared in the file by hand or by this
/// tool: minute precision, second precision, or a bare date.
fn parse_sort_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Minute-precision local timestamp, the shape the site sorts on.
fn format_sort_date(date: NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M").to_string()
}

/// Strip ordinal suffixes: "July 4th" -> "July 4".
fn strip_ordinals(s: &str) -> String {
    ORDINAL.replace_all(s, "$1").into_owned()
}

/// Extract the first plausible start time from the time/date texts.
///
/// Tried in order: 12-hour with am/pm, 24-hour `HH:MM`, a bare evening
/// range ("7–10"), a bare hour (1-11 assumed PM), else the default hour.
fn extract_time(date_text: &str, time_text: &str, default_hour: u32) -> (u32, u32) {
    let pool: String = [time_text, date_text]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" • ");

    if let Some(caps) = TIME_12H.captures(&pool) {
        let mut hour: u32 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(default_hour);
        let minute: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let meridiem = caps
            .get(3)
            .map(|m| m.as_str().to_lowercase().replace('.', ""))
            .unwrap_or_default();
        if hour == 12 && meridiem == "am" {
            hour = 0;
        } else if meridiem == "pm" && hour < 12 {
            hour += 12;
        }
        return (hour, minute);
    }

    if let Some(caps) = TIME_24H.captures(&pool) {
        let hour = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let minute = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let (Some(hour), Some(minute)) = (hour, minute) {
            return (hour, minute);
        }
    }

    if let Some(caps) = BARE_RANGE.captures(&pool) {
        if let Some(start) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            return (evening_hour(start), 0);
        }
    }

    if let Some(caps) = BARE_HOUR.captures(&pool) {
        if let Some(hour) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            return (evening_hour(hour), 0);
        }
    }

    (default_hour, 0)
}

/// A bare 1-11 is assumed to mean evening.
const fn evening_hour(hour: u32) -> u32 {
    if matches!(hour, 1..=11) { hour + 12 } else { hour }
}

/// Derive a sort date from the human-written date/time texts.
///
/// Needs a recognizable month name and day; an explicit `20xx` year is
/// honored, otherwise the current year is assumed and a date more than
/// ~10 months in the past rolls to next year.
fn compute_sort_date(
    date_text: &str,
    time_text: &str,
    default_hour: u32,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if date_text.is_empty() {
        return None;
    }

    let clean = strip_ordinals(date_text)
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let explicit_year: Option<i32> = YEAR
        .captures(&clean)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let month = clean
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
        .find_map(|token| {
            MONTHS
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, number)| *number)
        })?;

    let day: u32 = DAY
        .captures(&clean)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|d| (1..=31).contains(d))?;

    let (hour, minute) = extract_time(date_text, time_text, default_hour);
    let base_year = explicit_year.unwrap_or_else(|| now.year());

    let date = NaiveDate::from_ymd_opt(base_year, month, day)?.and_hms_opt(hour, minute, 0)?;

    // Without an explicit year, a date far in the past means next year's
    // show, not last year's.
    if explicit_year.is_none()
        && now.signed_duration_since(date) > Duration::days(ROLLOVER_PAST_DAYS)
    {
        return NaiveDate::from_ymd_opt(base_year + 1, month, day)?.and_hms_opt(hour, minute, 0);
    }

    Some(date)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_strip_ordinals() {
        assert_eq!(strip_ordinals("July 4th"), "July 4");
        assert_eq!(strip_ordinals("August 21st, 2026"), "August 21, 2026");
        assert_eq!(strip_ordinals("the 2nd and 3rd"), "the 2 and 3");
    }

    #[test]
    fn test_extract_time_12h() {
        assert_eq!(extract_time("", "7 PM", 19), (19, 0));
        assert_eq!(extract_time("", "7:30 pm", 19), (19, 30));
        assert_eq!(extract_time("", "9 a.m.", 19), (9, 0));
        assert_eq!(extract_time("", "12 AM", 19), (0, 0));
        assert_eq!(extract_time("", "12 PM", 19), (12, 0));
    }

    #[test]
    fn test_extract_time_24h() {
        assert_eq!(extract_time("", "19:30", 18), (19, 30));
        assert_eq!(extract_time("", "doors 08:15", 18), (8, 15));
    }

    #[test]
    fn test_extract_time_bare_range_assumes_evening() {
        assert_eq!(extract_time("", "7–10", 19), (19, 0));
        assert_eq!(extract_time("", "7-10", 19), (19, 0));
    }

    #[test]
    fn test_extract_time_bare_hour_assumes_evening() {
        assert_eq!(extract_time("", "8", 19), (20, 0));
    }

    #[test]
    fn test_extract_time_default() {
        assert_eq!(extract_time("", "", 19), (19, 0));
        assert_eq!(extract_time("", "doors early", 18), (18, 0));
    }

    #[test]
    fn test_compute_sort_date_full() {
        let date = compute_sort_date("July 4th, 2026", "7 PM", 19, fixed_now()).unwrap();
        assert_eq!(format_sort_date(date), "2026-07-04T19:00");
    }

    #[test]
    fn test_compute_sort_date_abbreviated_month() {
        // With no time text, the bare-hour heuristic picks up the day
        // number ("20" reads as 8 PM). Quirky, but it keeps same-day shows
        // ordered sensibly and matches how the file has always been built.
        let date = compute_sort_date("Sept 20", "", 19, fixed_now()).unwrap();
        assert_eq!(format_sort_date(date), "2026-09-20T20:00");
    }

    #[test]
    fn test_compute_sort_date_rolls_over_year() {
        let december = NaiveDate::from_ymd_opt(2026, 12, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let date = compute_sort_date("January 5", "", 19, december).unwrap();
        assert_eq!(format_sort_date(date), "2027-01-05T17:00");
    }

    #[test]
    fn test_compute_sort_date_recent_past_stays() {
        // A couple of months back is last month's show, not next year's.
        let date = compute_sort_date("June 1", "", 19, fixed_now()).unwrap();
        assert_eq!(format_sort_date(date), "2026-06-01T13:00");
    }

    #[test]
    fn test_compute_sort_date_requires_month_and_day() {
        assert!(compute_sort_date("", "7 PM", 19, fixed_now()).is_none());
        assert!(compute_sort_date("sometime soon", "", 19, fixed_now()).is_none());
        assert!(compute_sort_date("July", "", 19, fixed_now()).is_none());
    }

    #[test]
    fn test_parse_sort_date_formats() {
        assert!(parse_sort_date("2026-07-04T19:00").is_some());
        assert!(parse_sort_date("2026-07-04T19:00:00").is_some());
        assert!(parse_sort_date("2026-07-04").is_some());
        assert!(parse_sort_date("July 4").is_none());
    }

    #[test]
    fn test_maintain_fills_missing_sort_dates() {
        let entries = vec![
            json!({"title": "Summer Show", "dateText": "September 20", "timeText": "7 PM"}),
            json!({"title": "Already Dated", "sortDate": "2026-09-21T19:00"}),
        ];
        let outcome = maintain_entries(entries, false, 6, 19, fixed_now());

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.errors, 0);
        assert_eq!(
            field(&outcome.entries[0], "sortDate"),
            Some("2026-09-20T19:00")
        );
    }

    #[test]
    fn test_maintain_force_recomputes() {
        let entries = vec![json!({
            "title": "Stale",
            "dateText": "September 20",
            "sortDate": "2026-01-01T00:00"
        })];
        let outcome = maintain_entries(entries, true, 6, 19, fixed_now());

        assert_eq!(outcome.updated, 1);
        assert_eq!(
            field(&outcome.entries[0], "sortDate"),
            Some("2026-09-20T20:00")
        );
    }

    #[test]
    fn test_maintain_prunes_past_beyond_keep() {
        let entries = vec![
            json!({"title": "Upcoming", "sortDate": "2026-09-01T19:00"}),
            json!({"title": "Recent Past", "sortDate": "2026-07-20T19:00"}),
            json!({"title": "Older Past", "sortDate": "2026-06-20T19:00"}),
            json!({"title": "Oldest Past", "sortDate": "2026-05-20T19:00"}),
        ];
        let outcome = maintain_entries(entries, false, 2, 19, fixed_now());

        assert_eq!(outcome.upcoming, 1);
        assert_eq!(outcome.kept_past, 2);
        assert_eq!(outcome.dropped, vec!["Oldest Past".to_owned()]);

        let titles: Vec<&str> = outcome
            .entries
            .iter()
            .filter_map(|e| field(e, "title"))
            .collect();
        // Upcoming ascending first, then past newest-first.
        assert_eq!(titles, vec!["Upcoming", "Recent Past", "Older Past"]);
    }

    #[test]
    fn test_maintain_keeps_undatable_entries_at_end() {
        let entries = vec![
            json!({"title": "Mystery", "dateText": "TBA"}),
            json!({"title": "Upcoming", "sortDate": "2026-09-01T19:00"}),
        ];
        let outcome = maintain_entries(entries, false, 6, 19, fixed_now());

        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.no_valid, 1);
        let titles: Vec<&str> = outcome
            .entries
            .iter()
            .filter_map(|e| field(e, "title"))
            .collect();
        assert_eq!(titles, vec!["Upcoming", "Mystery"]);
    }

    #[test]
    fn test_maintain_writes_file_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shows.json");
        let original = r#"[{"title": "Summer Show", "dateText": "September 20"}]"#;
        std::fs::write(&file, original).unwrap();

        let args = MaintainArgs {
            file: file.to_string_lossy().into_owned(),
            dry: false,
            force: false,
            keep: 6,
            default_hour: 19,
        };
        maintain(&args).unwrap();

        let written = std::fs::read_to_string(&file).unwrap();
        assert!(written.contains("sortDate"));

        let backup = std::fs::read_to_string(dir.path().join("shows.json.bak")).unwrap();
        assert_eq!(backup, original);
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("shows.json");
        let original = r#"[{"title": "Summer Show", "dateText": "September 20"}]"#;
        std::fs::write(&file, original).unwrap();

        let args = MaintainArgs {
            file: file.to_string_lossy().into_owned(),
            dry: true,
            force: false,
            keep: 6,
            default_hour: 19,
        };
        maintain(&args).unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
        assert!(!dir.path().join("shows.json.bak").exists());
    }

    #[test]
    fn test_maintain_round_trips_unknown_fields() {
        let entries = vec![json!({
            "title": "Flyer Show",
            "dateText": "September 20",
            "flyer": "/gallery/sept20.webp",
            "lineup": ["Band A", "Band B"]
        })];
        let outcome = maintain_entries(entries, false, 6, 19, fixed_now());

        assert_eq!(
            field(&outcome.entries[0], "flyer"),
            Some("/gallery/sept20.webp")
        );
        assert!(outcome.entries[0].get("lineup").is_some());
    }
}
