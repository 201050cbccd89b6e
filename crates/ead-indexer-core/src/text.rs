//! Text utilities shared by the collection and component extractors.
//!
//! Several functions here reproduce quirks of the predecessor indexer so the
//! generated documents stay byte-compatible. Those are marked "legacy".

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// The only date-range facet value emitted when any date cannot be bucketed.
pub const UNDATED: &str = "undated & other";

/// First year of the lowest century bucket.
const FIRST_BUCKET_YEAR: i32 = 1101;
/// Last year of the highest century bucket.
const LAST_BUCKET_YEAR: i32 = 2100;

fn marc_demarcator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Legacy: matches any pipe followed by a letter, not just real subfield codes.
    RE.get_or_init(|| Regex::new(r"\|[a-zA-Z]").expect("MARC demarcator pattern is valid"))
}

fn normal_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([0-9]{4})/([0-9]{4})\s*$").expect("normal date pattern is valid")
    })
}

/// Keep the first occurrence of every value, in input order.
pub fn dedupe_in_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

/// Replace every `|x` MARC subfield demarcator with `--`.
pub fn replace_marc_demarcators(value: &str) -> String {
    marc_demarcator().replace_all(value, "--").into_owned()
}

/// Normalize facet values: demarcator replacement, then in-order dedupe.
pub fn compact_facets(values: &[String]) -> Vec<String> {
    let replaced: Vec<String> = values
        .iter()
        .map(|v| replace_marc_demarcators(v))
        .collect();
    dedupe_in_order(&replaced)
}

/// Parse a normalized unit date of the exact shape `YYYY/YYYY`.
pub fn parse_normal_date(value: &str) -> Option<(i32, i32)> {
    let caps = normal_date().captures(value)?;
    let start = caps[1].parse().ok()?;
    let end = caps[2].parse().ok()?;
    Some((start, end))
}

fn century_bucket(year: i32) -> Option<i32> {
    if !(FIRST_BUCKET_YEAR..=LAST_BUCKET_YEAR).contains(&year) {
        return None;
    }
    Some((year - 1) / 100 * 100 + 1)
}

/// Map normalized unit dates to century facet buckets such as `1901-2000`.
///
/// A bucket is emitted when it contains the start or the end year of some
/// input. If the list is empty, or any input lands in no bucket at all, the
/// result is exactly `["undated & other"]`.
pub fn date_ranges(normal_dates: &[String]) -> Vec<String> {
    if normal_dates.is_empty() {
        return vec![UNDATED.to_string()];
    }

    let mut buckets = BTreeSet::new();
    for date in normal_dates {
        let Some((start, end)) = parse_normal_date(date) else {
            return vec![UNDATED.to_string()];
        };
        let hits: Vec<i32> = [start, end].into_iter().filter_map(century_bucket).collect();
        if hits.is_empty() {
            return vec![UNDATED.to_string()];
        }
        buckets.extend(hits);
    }

    buckets
        .into_iter()
        .map(|lo| format!("{}-{}", lo, lo + 99))
        .collect()
}

/// Start and end years of every parseable normalized date, as strings.
pub fn unit_date_bounds(normal_dates: &[String]) -> (Vec<String>, Vec<String>) {
    normal_dates
        .iter()
        .filter_map(|d| parse_normal_date(d))
        .map(|(start, end)| (start.to_string(), end.to_string()))
        .unzip()
}

/// Human-readable unit date.
///
/// Untyped dates win outright. Otherwise inclusive and bulk dates are
/// combined behind an `Inclusive,` label.
pub fn unit_date_display(no_type: &[String], inclusive: &[String], bulk: &[String]) -> Option<String> {
    if !no_type.is_empty() {
        return Some(no_type.join(" "));
    }
    if inclusive.is_empty() && bulk.is_empty() {
        return None;
    }

    // Legacy: the label is emitted even when only bulk dates exist.
    let mut parts = vec!["Inclusive,".to_string(), inclusive.join(" ")];
    if !bulk.is_empty() {
        parts.push(";".to_string());
        parts.push(bulk.join(" "));
    }
    Some(parts.join(" "))
}

fn is_noncharacter(c: char) -> bool {
    let cp = c as u32;
    (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE
}

fn is_html_control(c: char) -> bool {
    let cp = c as u32;
    match cp {
        0x09 | 0x0A | 0x0D => false,
        0x00..=0x1F | 0x7F..=0x9F => true,
        _ => false,
    }
}

/// Remove HTML control characters and Unicode noncharacters.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|&c| !is_html_control(c) && !is_noncharacter(c))
        .collect()
}

/// Upper-case the first character, lower-case the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let input = strings(&["b", "a", "b", "c", "a"]);
        assert_eq!(dedupe_in_order(&input), strings(&["b", "a", "c"]));
    }

    #[test]
    fn test_marc_demarcators_replaced() {
        assert_eq!(
            replace_marc_demarcators("Laundry industry |z New York (State) |z New York."),
            "Laundry industry -- New York (State) -- New York."
        );
    }

    #[test]
    fn test_marc_demarcator_overmatches_any_pipe_letter() {
        // Kept on purpose: "|Q" is not a subfield code but is still replaced.
        assert_eq!(replace_marc_demarcators("a|Qb"), "a--b");
        assert_eq!(replace_marc_demarcators("a | b"), "a | b");
    }

    #[test]
    fn test_compact_facets_has_no_duplicates() {
        let input = strings(&["Maps |z Ohio", "Maps -- Ohio", "Deeds"]);
        let out = compact_facets(&input);
        assert_eq!(out, strings(&["Maps -- Ohio", "Deeds"]));
    }

    #[test]
    fn test_parse_normal_date() {
        assert_eq!(parse_normal_date("1930/1990"), Some((1930, 1990)));
        assert_eq!(parse_normal_date("  0001/2100 \n"), Some((1, 2100)));
        assert_eq!(parse_normal_date("1930"), None);
        assert_eq!(parse_normal_date("1930-01/1990"), None);
        assert_eq!(parse_normal_date("193/1990"), None);
    }

    #[test]
    fn test_date_ranges_buckets() {
        let input = strings(&["2016/2020", "0001/2100", "1101/9999", "1201/1901"]);
        assert_eq!(
            date_ranges(&input),
            strings(&["1101-1200", "1201-1300", "1901-2000", "2001-2100"])
        );
    }

    #[test]
    fn test_date_ranges_unmappable_input_is_undated() {
        let input = strings(&["2016/2020", "0001/0002"]);
        assert_eq!(date_ranges(&input), strings(&[UNDATED]));
    }

    #[test]
    fn test_date_ranges_empty_and_malformed() {
        assert_eq!(date_ranges(&[]), strings(&[UNDATED]));
        assert_eq!(date_ranges(&strings(&["circa 1900"])), strings(&[UNDATED]));
    }

    #[test]
    fn test_unit_date_bounds_skip_unparseable() {
        let input = strings(&["1930/1990", "undated", "1801/1802"]);
        let (start, end) = unit_date_bounds(&input);
        assert_eq!(start, strings(&["1930", "1801"]));
        assert_eq!(end, strings(&["1990", "1802"]));
    }

    #[test]
    fn test_unit_date_display_only_bulk() {
        let display = unit_date_display(&[], &[], &strings(&["1930-1990"]));
        assert_eq!(display.as_deref(), Some("Inclusive,  ; 1930-1990"));
    }

    #[test]
    fn test_unit_date_display_variants() {
        assert_eq!(
            unit_date_display(&strings(&["1900s", "ca. 1950"]), &strings(&["1900"]), &[]).as_deref(),
            Some("1900s ca. 1950")
        );
        assert_eq!(
            unit_date_display(&[], &strings(&["1900-1990"]), &[]).as_deref(),
            Some("Inclusive, 1900-1990")
        );
        assert_eq!(
            unit_date_display(&[], &strings(&["1900-1990"]), &strings(&["1930-1950"])).as_deref(),
            Some("Inclusive, 1900-1990 ; 1930-1950")
        );
        assert_eq!(unit_date_display(&[], &[], &[]), None);
    }

    #[test]
    fn test_sanitize_strips_controls_and_noncharacters() {
        let input = "a\u{0001}b\u{007F}c\u{0085}d\u{FDD0}e\u{FFFE}f\u{1FFFF}g\th\ni";
        assert_eq!(sanitize(input), "abcdefg\th\ni");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("box"), "Box");
        assert_eq!(capitalize("FOLDER"), "Folder");
        assert_eq!(capitalize(""), "");
    }
}
