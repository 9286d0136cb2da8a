use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::records::ExperienceEntry;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").unwrap());

/// An entry ending at most this many years before the reference year counts as current.
pub const RECENT_WINDOW_YEARS: i32 = 2;

pub const RECENT_SCORE: f64 = 100.0;
/// Flat score for candidates whose experience all ended outside the window.
pub const STALE_SCORE: f64 = 30.0;
pub const NO_EXPERIENCE_SCORE: f64 = 0.0;

/// 終了日テキストの解釈結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDate {
    Present,
    Year(i32),
    Unparseable,
}

/// Reads a free-text end date: exactly "Present" (any case, no surrounding
/// whitespace) or the first run of four digits. Anything else is `Unparseable`.
pub fn parse_end_date(raw: &str) -> EndDate {
    if raw.eq_ignore_ascii_case("present") {
        return EndDate::Present;
    }

    YEAR_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .map_or(EndDate::Unparseable, EndDate::Year)
}

/// Recency of the candidate's experience, 0–100.
///
/// 100 as soon as any entry is ongoing or ended within the window (future
/// years included), 30 when entries exist but none qualifies, 0 without
/// entries. Unparseable end dates are skipped.
pub fn score_recency(entries: &[ExperienceEntry], reference_year: i32) -> f64 {
    if entries.is_empty() {
        return NO_EXPERIENCE_SCORE;
    }

    for entry in entries {
        match parse_end_date(&entry.end_date) {
            EndDate::Present => return RECENT_SCORE,
            EndDate::Year(year) if reference_year - year <= RECENT_WINDOW_YEARS => {
                return RECENT_SCORE;
            }
            EndDate::Year(_) => {}
            EndDate::Unparseable => {
                trace!(end_date = %entry.end_date, "skipping unparseable end date");
            }
        }
    }

    STALE_SCORE
}
