use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use super::patterns::Patterns;
use super::slots::TimeSlot;
use crate::document::{DocumentSource, Rect};
use crate::model::{DEFAULT_EXAM_TYPE, ExamSession};
use crate::util::collapse_whitespace;

/// Height in points of the full-width band above a datesheet table that carries its date.
pub const DATE_BAND_HEIGHT: f32 = 80.0;

/// One non-empty body cell of a datesheet table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSlot {
    pub cell: String,
    pub header: String,
    /// Empty when no date has been seen above this table or any earlier one.
    pub date: String,
}

/// Classifies the datesheet from its first page, falling back to the file
/// name when the page carries no text (scanned datesheets).
pub fn detect_exam_type(first_page_text: &str, path: &Path) -> String {
    let text = if first_page_text.trim().is_empty() {
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    } else {
        first_page_text.to_lowercase()
    };

    let contains_any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));
    // "sessional i" is a prefix of "sessional ii"; test the second sessional first.
    let exam_type = if contains_any(&["sessional 2", "sessional ii", "2nd sessional"]) {
        "Sessional II"
    } else if contains_any(&["sessional 1", "sessional i", "1st sessional"]) {
        "Sessional I"
    } else if text.contains("final") {
        "Final Examination"
    } else {
        DEFAULT_EXAM_TYPE
    };
    exam_type.to_string()
}

/// Every dated cell of every datesheet table, in page and table order.
pub fn extract_exam_slots(document: &dyn DocumentSource, patterns: &Patterns) -> Result<Vec<ExamSlot>> {
    let mut slots = Vec::new();
    let mut current_date = String::new();

    for page in 0..document.page_count() {
        let size = document.page_size(page)?;
        for table in document.tables(page)? {
            let band = Rect {
                x0: 0.0,
                top: (table.bbox.top - DATE_BAND_HEIGHT).max(0.0),
                x1: size.width,
                bottom: table.bbox.top,
            };
            let band_text = document.text_in_rect(page, band)?;
            if let Some(date) = patterns.parse_exam_date(&band_text) {
                current_date = date;
            }

            let header = table.header();
            if !header.iter().flatten().any(|label| label.contains(':')) {
                debug!(page = page + 1, "datesheet table without a time header; skipping");
                continue;
            }

            for row in table.body() {
                for (column, cell) in row.iter().enumerate() {
                    let Some(cell) = cell.as_deref() else {
                        continue;
                    };
                    slots.push(ExamSlot {
                        cell: cell.to_string(),
                        header: header
                            .get(column)
                            .and_then(Option::as_deref)
                            .unwrap_or_default()
                            .to_string(),
                        date: current_date.clone(),
                    });
                }
            }
        }
    }

    info!(slots = slots.len(), source = %document.name(), "extracted datesheet slots");
    Ok(slots)
}

/// The exam sessions of a student taking `course_codes`.
///
/// With `legacy_room` the teacher text is also copied into `room`, which is
/// where older consumers of the index expect it.
pub fn exams_for_courses(
    patterns: &Patterns,
    slots: &[ExamSlot],
    course_codes: &BTreeSet<String>,
    legacy_room: bool,
) -> Vec<ExamSession> {
    let mut exams = Vec::new();

    for slot in slots {
        let matched = patterns
            .find_course_code_tokens(&slot.cell)
            .iter()
            .any(|token| course_codes.contains(&token.code));
        if !matched {
            continue;
        }

        let Some(time) = TimeSlot::parse_label(&slot.header) else {
            debug!(header = %slot.header, "exam column header is not a time range");
            continue;
        };

        let raw_cell = slot.cell.replace('\n', " ");
        let subject = match patterns.exam_subject(&raw_cell) {
            Some(subject) => subject.to_string(),
            None => raw_cell.split('|').next().unwrap_or_default().trim().to_string(),
        };

        let mut remainder = patterns.strip_exam_markers(&raw_cell);
        if !subject.is_empty() {
            remainder = remainder.replace(&subject, "");
        }
        let teacher = collapse_whitespace(&remainder.replace('|', " "))
            .trim_matches(|c: char| c == ',' || c == ' ')
            .to_string();
        let teacher = (!teacher.is_empty()).then_some(teacher);

        exams.push(ExamSession {
            subject,
            date: slot.date.clone(),
            start_time: time.start,
            end_time: time.end,
            room: if legacy_room { teacher.clone() } else { None },
            teacher,
        });
    }

    exams
}

/// `(code, name)` pairs mined from `CODE - Name` exam subjects.
pub fn course_names_from_slots(patterns: &Patterns, slots: &[ExamSlot]) -> Vec<(String, String)> {
    slots
        .iter()
        .filter_map(|slot| {
            let raw_cell = slot.cell.replace('\n', " ");
            let subject = patterns.exam_subject(&raw_cell)?;
            let (code, name) = subject.split_once('-')?;
            Some((code.trim().to_string(), name.trim().to_string()))
        })
        .collect()
}
