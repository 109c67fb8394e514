use tracing::debug;

use super::cell::decompose_cell;
use super::expand::SubjectStyle;
use super::slots::TimeSlot;
use super::{ExtractionContext, StudentTimetable};
use crate::document::TableRegion;

/// Column index → time slot, read from the header row. Columns whose header
/// is not a time range (the day column among them) map to nothing.
pub fn header_slots(table: &TableRegion) -> Vec<Option<TimeSlot>> {
    table
        .header()
        .iter()
        .map(|cell| cell.as_deref().and_then(TimeSlot::parse_label))
        .collect()
}

pub fn parse_timetable_grid(context: &ExtractionContext, table: &TableRegion) -> StudentTimetable {
    let slots = header_slots(table);
    let mut timetable = StudentTimetable::default();

    for row in table.body() {
        let Some(day_cell) = row.first().and_then(Option::as_deref) else {
            continue;
        };
        let Some((day, _)) = context.patterns.match_weekday_label(day_cell.trim()) else {
            debug!(label = %day_cell.trim(), "row label is not a weekday; skipping row");
            continue;
        };

        for (column, cell) in row.iter().enumerate().skip(1) {
            let Some(raw) = cell.as_deref() else {
                continue;
            };
            let Some(slot) = slots.get(column).and_then(Option::as_ref) else {
                debug!(column, "column has no time slot; cell dropped");
                continue;
            };

            let decomposed = decompose_cell(&context.patterns, raw);
            let sessions =
                context.sessions_for_cell(&decomposed, day, slot, None, SubjectStyle::Dashed);
            let codes = decomposed.courses.iter().map(|course| course.code.clone());
            timetable.extend(sessions, codes);
        }
    }

    timetable
}
