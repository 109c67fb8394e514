use std::collections::BTreeMap;

use super::cell::CourseEntry;

const TRUNCATION_MARKERS: [&str; 2] = ["...", "…"];

/// How a course entry is rendered into a session subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectStyle {
    /// `CODE - Name`
    Dashed,
    /// `CODE,SECTION: Name`, or `CODE: Name` without a section
    Sectioned,
}

struct TruncationRule {
    truncated: &'static str,
    full: &'static str,
    /// Short stems only count when followed by a truncation marker.
    marker_required: bool,
}

// Ordered longest stem first; at most one rule applies.
const TRUNCATION_RULES: &[TruncationRule] = &[
    TruncationRule {
        truncated: "Machine Lear",
        full: "Machine Learning",
        marker_required: false,
    },
    TruncationRule {
        truncated: "Intellige",
        full: "Intelligence",
        marker_required: false,
    },
    TruncationRule {
        truncated: "and Stat",
        full: "and Statistics",
        marker_required: false,
    },
    TruncationRule {
        truncated: "Distrib",
        full: "Distributed Computing",
        marker_required: false,
    },
    TruncationRule {
        truncated: "of Soft",
        full: "of Software Project Management",
        marker_required: false,
    },
    TruncationRule {
        truncated: "Proces",
        full: "Processing",
        marker_required: false,
    },
    TruncationRule {
        truncated: "Comput",
        full: "Computing",
        marker_required: false,
    },
    TruncationRule {
        truncated: "Soft",
        full: "Software Project Management",
        marker_required: true,
    },
    TruncationRule {
        truncated: "Comp",
        full: "Computing",
        marker_required: true,
    },
    TruncationRule {
        truncated: "Stat",
        full: "Statistics",
        marker_required: true,
    },
    TruncationRule {
        truncated: "an",
        full: "and Simulation",
        marker_required: true,
    },
    TruncationRule {
        truncated: "L",
        full: "Lab",
        marker_required: true,
    },
];

/// Repairs a name cut off by the column width.
///
/// Marker-optional stems must still sit at a word boundary, so `Proces`
/// matches `Image Proces` but not `Preproces`.
pub fn repair_truncation(partial: &str) -> String {
    let name = partial.trim();
    let (stem, marked) = match strip_marker(name) {
        Some(stem) => (stem.trim_end(), true),
        None => (name, false),
    };

    for rule in TRUNCATION_RULES {
        if rule.marker_required && !marked {
            continue;
        }
        let Some(prefix) = stem.strip_suffix(rule.truncated) else {
            continue;
        };
        if prefix.chars().next_back().is_some_and(char::is_alphanumeric) {
            continue;
        }
        return format!("{prefix}{}", rule.full);
    }

    let mut rest = stem;
    while let Some(stripped) = strip_marker(rest) {
        rest = stripped;
    }
    rest.trim_end_matches('.').trim_end().to_string()
}

fn strip_marker(name: &str) -> Option<&str> {
    TRUNCATION_MARKERS
        .iter()
        .find_map(|marker| name.strip_suffix(marker))
}

/// Resolves the entry's display name: the reference name when the code is
/// known, otherwise the repaired partial name.
pub fn expand_course_name(entry: &CourseEntry, course_names: &BTreeMap<String, String>) -> String {
    match course_names.get(&entry.code) {
        Some(name) => name.trim().to_string(),
        None => repair_truncation(&entry.partial_name),
    }
}

pub fn render_subject(
    entry: &CourseEntry,
    course_names: &BTreeMap<String, String>,
    style: SubjectStyle,
) -> String {
    let name = expand_course_name(entry, course_names);
    let label = match (style, &entry.section) {
        (SubjectStyle::Sectioned, Some(section)) => format!("{},{}", entry.code, section),
        _ => entry.code.clone(),
    };

    if name.is_empty() {
        return label;
    }
    match style {
        SubjectStyle::Dashed => format!("{label} - {name}"),
        SubjectStyle::Sectioned => format!("{label}: {name}"),
    }
}
