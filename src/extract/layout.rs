//! Layout-text mode: per-student blocks of `pdftotext -layout` output, read
//! line by line with a small state machine that tracks which day row and
//! which column each text run belongs to.

use std::collections::BTreeMap;

use tracing::debug;

use super::cell::decompose_cell;
use super::expand::SubjectStyle;
use super::patterns::{LineSegment, TeacherRoom};
use super::slots::ColumnBoundaries;
use super::{ExtractionContext, StudentTimetable};
use crate::model::Weekday;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBlock {
    pub roll_number: String,
    pub text: String,
}

/// Splits layout text at every student header. Text before the first header
/// and the header lines themselves belong to no block.
pub fn split_layout_blocks(context: &ExtractionContext, text: &str) -> Vec<LayoutBlock> {
    let headers = context.patterns.find_student_headers(text);
    headers
        .iter()
        .enumerate()
        .map(|(position, header)| {
            let end = headers
                .get(position + 1)
                .map(|next| next.start)
                .unwrap_or(text.len());
            LayoutBlock {
                roll_number: header.roll_number.clone(),
                text: text.get(header.end..end).unwrap_or_default().to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    /// No slot header line seen yet.
    OutsideBlock,
    /// Header seen, first day label not yet; cells here belong to the first row.
    BeforeFirstDay,
    InDay(Weekday),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PendingCell {
    parts: Vec<String>,
    teacher_room: Option<TeacherRoom>,
}

struct BlockMachine<'a> {
    context: &'a ExtractionContext,
    state: BlockState,
    boundaries: Option<ColumnBoundaries>,
    /// Open cells per column, oldest first.
    pending: BTreeMap<usize, Vec<PendingCell>>,
    completed_before_day: Vec<(usize, PendingCell)>,
    completed: Vec<(Weekday, usize, PendingCell)>,
}

impl<'a> BlockMachine<'a> {
    fn new(context: &'a ExtractionContext) -> Self {
        Self {
            context,
            state: BlockState::OutsideBlock,
            boundaries: None,
            pending: BTreeMap::new(),
            completed_before_day: Vec::new(),
            completed: Vec::new(),
        }
    }

    fn feed_line(&mut self, line: &str) {
        let context = self.context;
        if context.slots.count_labels(line) >= 2 {
            if self.state == BlockState::OutsideBlock {
                self.boundaries = context.slots.column_boundaries(line);
                if self.boundaries.is_some() {
                    self.state = BlockState::BeforeFirstDay;
                }
            }
            // Repeated header rows after a page break carry no cells.
            return;
        }

        let Some(boundaries) = self.boundaries.clone() else {
            return;
        };

        let mut segments = context.patterns.split_segments(line).into_iter();
        let Some(first) = segments.next() else {
            return;
        };

        if first.offset < boundaries.first_offset()
            && let Some((day, label_end)) = context.patterns.match_weekday_label(&first.text)
        {
            self.on_day(day);
            let rest = &first.text[label_end..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                let consumed = first.text[..label_end].chars().count()
                    + rest.chars().count()
                    - trimmed.chars().count();
                self.dispatch(
                    &boundaries,
                    LineSegment {
                        offset: first.offset + consumed,
                        text: trimmed.to_string(),
                    },
                );
            }
        } else {
            self.dispatch(&boundaries, first);
        }

        for segment in segments {
            self.dispatch(&boundaries, segment);
        }
    }

    fn dispatch(&mut self, boundaries: &ColumnBoundaries, segment: LineSegment) {
        let column = boundaries.column_for(segment.offset);
        let context = self.context;
        let patterns = &context.patterns;
        if let Some(teacher_room) = patterns.match_teacher_room_line(&segment.text) {
            self.on_teacher_room(column, teacher_room);
        } else if patterns.contains_course_code(&segment.text) {
            self.on_course(column, segment.text);
        } else {
            self.on_continuation(column, segment.text);
        }
    }

    fn on_day(&mut self, day: Weekday) {
        match self.state {
            BlockState::InDay(previous) => self.flush_pending(previous),
            BlockState::BeforeFirstDay => {
                for (column, cell) in self.completed_before_day.drain(..) {
                    self.completed.push((day, column, cell));
                }
            }
            BlockState::OutsideBlock => {}
        }
        self.state = BlockState::InDay(day);
    }

    fn on_teacher_room(&mut self, column: usize, teacher_room: TeacherRoom) {
        match self.state {
            BlockState::InDay(day) => {
                let Some(mut cell) = self.pending.get_mut(&column).and_then(Vec::pop) else {
                    debug!(column, teacher = %teacher_room.teacher, "teacher/room line without an open cell");
                    return;
                };
                cell.teacher_room = Some(teacher_room);
                self.completed.push((day, column, cell));
            }
            BlockState::BeforeFirstDay => {
                let Some((&first_column, cells)) = self
                    .pending
                    .iter_mut()
                    .find(|(_, cells)| !cells.is_empty())
                else {
                    debug!(column, teacher = %teacher_room.teacher, "teacher/room line before any cell");
                    return;
                };
                let mut cell = cells.remove(0);
                cell.teacher_room = Some(teacher_room);
                self.completed_before_day.push((first_column, cell));
            }
            BlockState::OutsideBlock => {}
        }
    }

    fn on_course(&mut self, column: usize, text: String) {
        self.pending.entry(column).or_default().push(PendingCell {
            parts: vec![text],
            teacher_room: None,
        });
    }

    fn on_continuation(&mut self, column: usize, text: String) {
        if let Some(cell) = self.pending.get_mut(&column).and_then(|cells| cells.last_mut()) {
            cell.parts.push(text);
            return;
        }

        if self.state == BlockState::BeforeFirstDay
            && let Some(cell) = self
                .pending
                .values_mut()
                .find_map(|cells| cells.first_mut())
        {
            cell.parts.push(text);
            return;
        }

        debug!(column, text = %text, "continuation without an open cell");
    }

    fn flush_pending(&mut self, day: Weekday) {
        for (column, cells) in std::mem::take(&mut self.pending) {
            for cell in cells {
                self.completed.push((day, column, cell));
            }
        }
    }

    fn finish(mut self) -> Option<Vec<(Weekday, usize, PendingCell)>> {
        match self.state {
            BlockState::OutsideBlock => return None,
            BlockState::InDay(day) => self.flush_pending(day),
            BlockState::BeforeFirstDay => {
                debug!(
                    cells = self.completed_before_day.len()
                        + self.pending.values().map(Vec::len).sum::<usize>(),
                    "block ended before any day label; cells dropped"
                );
            }
        }
        Some(self.completed)
    }
}

/// Parses one student's block. `None` when the block has no slot header
/// line with at least two recognizable labels.
pub fn parse_layout_block(context: &ExtractionContext, block: &str) -> Option<StudentTimetable> {
    let mut machine = BlockMachine::new(context);
    for line in block.lines() {
        machine.feed_line(line);
    }
    let completed = machine.finish()?;

    let unassigned = TeacherRoom {
        teacher: String::new(),
        room: String::new(),
    };
    let mut timetable = StudentTimetable::default();
    for (day, column, cell) in completed {
        let Some(slot) = context.slots.get(column) else {
            debug!(column, "column outside the slot table; cell dropped");
            continue;
        };
        let decomposed = decompose_cell(&context.patterns, &cell.parts.join("\n"));
        let assigned = cell.teacher_room.as_ref().unwrap_or(&unassigned);
        let sessions = context.sessions_for_cell(
            &decomposed,
            day,
            slot,
            Some(assigned),
            SubjectStyle::Sectioned,
        );
        let codes = decomposed.courses.iter().map(|course| course.code.clone());
        timetable.extend(sessions, codes);
    }
    Some(timetable)
}
