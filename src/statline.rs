// Stat-line decomposition.
//
// Rotoguru packs a game's counting stats into one text field, e.g.
// "40pt 10rb 2as 1st 2bl 2to 3trey". Each stat is the number immediately
// before its abbreviation; anything that fails to parse counts as zero.

use crate::frame::Column;

/// Derived column name and its stat-line abbreviation, in rotoguru order.
pub const STAT_COLUMNS: &[(&str, &str)] = &[
    ("Points", "pt"),
    ("Rebounds", "rb"),
    ("Assists", "as"),
    ("Steals", "st"),
    ("Blocks", "bl"),
    ("Turnovers", "to"),
];

/// Extract one stat count from a stat line.
///
/// Takes the text before the first occurrence of `abbr`, strips everything
/// up to the last space, and parses the remainder. A missing abbreviation or
/// malformed token yields 0, never an error.
pub fn stat_count(line: &str, abbr: &str) -> f64 {
    let Some(idx) = line.find(abbr) else {
        return 0.0;
    };
    let prefix = &line[..idx];
    let token = match prefix.rfind(' ') {
        Some(space) => &prefix[space + 1..],
        None => prefix,
    };
    token.parse::<f64>().unwrap_or(0.0)
}

/// Derive one numeric stat column from stat-line cells. Absent stat lines
/// count as zero for every stat.
pub fn derive_column(lines: &[Option<String>], abbr: &str) -> Column {
    Column::Numeric(
        lines
            .iter()
            .map(|cell| Some(stat_count(cell.as_deref().unwrap_or(""), abbr)))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
