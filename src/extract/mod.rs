//! Recovers per-student schedules from timetable and datesheet documents.
//!
//! Two extraction paths share the same cell decomposition, name expansion and
//! normalization stages:
//! - table mode walks the table regions reported by the document adapter
//! - layout mode runs a column state machine over layout-preserving text

use std::collections::BTreeSet;

use anyhow::{Result, bail};
use tracing::debug;

use crate::document::DocumentSource;
use crate::model::{ClassSession, Weekday};
use crate::reference::ReferenceTables;

pub mod assemble;
pub mod cell;
pub mod exams;
pub mod expand;
pub mod layout;
pub mod locator;
pub mod normalize;
pub mod patterns;
pub mod slots;
pub mod table;

#[cfg(test)]
mod tests;

use cell::DecomposedCell;
use expand::{SubjectStyle, render_subject};
use normalize::{normalize_room, resolve_teacher};
use patterns::{Patterns, TeacherRoom};
use slots::{SlotTable, TimeSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Table,
    Layout,
}

impl ExtractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Layout => "layout",
        }
    }

    /// Table mode whenever the document reports any table region.
    pub fn detect(document: &dyn DocumentSource) -> Result<Self> {
        if document.has_tables()? {
            Ok(Self::Table)
        } else {
            Ok(Self::Layout)
        }
    }
}

/// Everything a run shares across students. Read-only once built.
pub struct ExtractionContext {
    pub patterns: Patterns,
    pub references: ReferenceTables,
    pub slots: SlotTable,
    pub similarity_threshold: f64,
    pub legacy_exam_room: bool,
}

impl ExtractionContext {
    pub fn new(references: ReferenceTables, slots: SlotTable) -> Result<Self> {
        if slots.slots().len() < 2 {
            bail!("at least two time slots are required");
        }
        Ok(Self {
            patterns: Patterns::new()?,
            references,
            slots,
            similarity_threshold: normalize::DEFAULT_SIMILARITY_THRESHOLD,
            legacy_exam_room: true,
        })
    }

    /// Turns one decomposed cell into sessions, one per course it carries.
    ///
    /// A non-empty `assigned` teacher/room (the layout parser's) takes
    /// precedence over the one found in the cell text.
    pub fn sessions_for_cell(
        &self,
        cell: &DecomposedCell,
        day: Weekday,
        slot: &TimeSlot,
        assigned: Option<&TeacherRoom>,
        style: SubjectStyle,
    ) -> Vec<ClassSession> {
        if cell.courses.is_empty() {
            debug!(day = %day, slot = %slot.label(), "cell has no course code; skipping");
            return Vec::new();
        }

        let filled = |found: &&TeacherRoom| !found.teacher.is_empty() || !found.room.is_empty();
        let teacher_room = assigned
            .filter(filled)
            .or(cell.teacher_room.as_ref())
            .or(assigned);
        let (teacher, room) = match teacher_room {
            Some(found) => (
                resolve_teacher(&found.teacher, &self.references, self.similarity_threshold),
                normalize_room(&found.room, &self.references, self.similarity_threshold),
            ),
            None => (normalize::UNKNOWN.to_string(), normalize::UNKNOWN.to_string()),
        };

        cell.courses
            .iter()
            .map(|course| ClassSession {
                day,
                start_time: slot.start.clone(),
                end_time: slot.end.clone(),
                subject: render_subject(course, &self.references.course_names, style),
                room: room.clone(),
                teacher: teacher.clone(),
            })
            .collect()
    }
}

/// Sessions recovered for one student, before assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentTimetable {
    pub sessions: Vec<ClassSession>,
    pub course_codes: BTreeSet<String>,
}

impl StudentTimetable {
    pub fn extend(&mut self, sessions: Vec<ClassSession>, codes: impl IntoIterator<Item = String>) {
        self.sessions.extend(sessions);
        self.course_codes.extend(codes);
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
