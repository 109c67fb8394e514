use std::collections::BTreeMap;

use strsim::normalized_levenshtein;

use crate::model::Weekday;
use crate::reference::{ReferenceTables, normalize_key};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;
pub const UNKNOWN: &str = "Unknown";
pub const UNASSIGNED_ROOM: &str = "TBA";

/// Exact match on the normalized key, else the most similar key scoring at
/// least `threshold`. Equal scores keep the first key in sorted order.
pub fn resolve_canonical_name<'a>(
    raw: &str,
    table: &'a BTreeMap<String, String>,
    threshold: f64,
) -> Option<&'a str> {
    let key = normalize_key(raw);
    if key.is_empty() {
        return None;
    }
    if let Some(name) = table.get(&key) {
        return Some(name.as_str());
    }
    fuzzy_match(&key, table, threshold)
}

fn fuzzy_match<'a>(
    key: &str,
    table: &'a BTreeMap<String, String>,
    threshold: f64,
) -> Option<&'a str> {
    let mut best: Option<(f64, &'a str)> = None;
    for (candidate, name) in table {
        let score = normalized_levenshtein(key, candidate);
        if score < threshold {
            continue;
        }
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, name.as_str()));
        }
    }
    best.map(|(_, name)| name)
}

pub fn resolve_teacher(raw: &str, references: &ReferenceTables, threshold: f64) -> String {
    let cleaned = raw
        .split_whitespace()
        .filter(|word| {
            let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
            !(bare.len() == 3 && Weekday::from_label(bare).is_some())
        })
        .collect::<Vec<&str>>()
        .join(" ");

    if cleaned.is_empty() {
        return UNKNOWN.to_string();
    }

    resolve_canonical_name(&cleaned, &references.faculty_names, threshold)
        .map(str::to_string)
        .unwrap_or(cleaned)
}

/// Maps a raw room string onto its canonical venue.
///
/// Rooms carrying digits are never fuzzy-matched: `room 10` and `room 11`
/// are one edit apart.
pub fn normalize_room(raw: &str, references: &ReferenceTables, threshold: f64) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return UNASSIGNED_ROOM.to_string();
    }

    let aliases = &references.room_aliases;
    let key = normalize_key(raw);
    if let Some(room) = aliases.get(&key) {
        return room.clone();
    }

    let compact = key.replace(' ', "");
    if let Some(room) = aliases.get(&compact) {
        return room.clone();
    }

    let room_number = room_number(&key);
    if let Some(number) = room_number {
        if let Some(room) = aliases.get(number) {
            return room.clone();
        }
        return title_case(raw);
    }

    if !key.chars().any(|c| c.is_ascii_digit()) {
        if let Some(room) = fuzzy_match(&key, aliases, threshold) {
            return room.to_string();
        }
    }

    raw.to_string()
}

/// The number in a `room N` / `roomN` key.
fn room_number(key: &str) -> Option<&str> {
    let rest = key.strip_prefix("room")?.trim_start();
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map(|end| &rest[..end])
        .unwrap_or(rest);
    if digits.is_empty() { None } else { Some(digits) }
}

/// Capitalizes every letter that follows a non-letter, lowercasing the rest.
fn title_case(raw: &str) -> String {
    let mut previous_is_letter = false;
    raw.chars()
        .map(|c| {
            let mapped = if previous_is_letter {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            };
            previous_is_letter = c.is_alphabetic();
            mapped
        })
        .collect()
}
