//! The `<time>` wire grammar: `YYYY-MM-DDTHH:MM:SS[.fff…]Z`, always UTC.

use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Compiled once and shared read-only by every parse and format call.
static TIMESTAMP_ITEMS: Lazy<Vec<Item<'static>>> =
    Lazy::new(|| StrftimeItems::new(TIMESTAMP_FORMAT).collect());

/// Parse a GPX timestamp. Returns `None` for anything outside the grammar,
/// including numeric offsets other than `Z`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, text, TIMESTAMP_ITEMS.iter()).ok()?;
    parsed.to_datetime_with_timezone(&Utc).ok()
}

/// Format a timestamp in the same grammar [`parse_timestamp`] accepts. The
/// fraction is omitted for whole seconds and otherwise printed with 3, 6 or 9
/// digits, whichever is the shortest exact form.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format_with_items(TIMESTAMP_ITEMS.iter()).to_string()
}
