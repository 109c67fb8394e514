use anyhow::{Context, Result};
use regex::Regex;

use crate::model::{Weekday, normalize_roll_number};

const TEACHER_TRIM: &[char] = &[' ', ',', ';', '-', '–', '\t'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseToken {
    pub code: String,
    pub section: Option<String>,
    /// Byte offset where the token starts.
    pub start: usize,
    /// Byte offset just past the token and its separator.
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherRoom {
    pub teacher: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentHeader {
    pub roll_number: String,
    pub start: usize,
    pub end: usize,
}

/// A run of text on a layout line, separated from its neighbours by two or
/// more spaces. `offset` counts characters from the start of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSegment {
    pub offset: usize,
    pub text: String,
}

/// Grammar of the tokens found in timetable and datesheet text.
///
/// - course code: 2-4 capitals and 4 digits, optional `,SECTION` list, optional `:`/`-` separator
/// - teacher/room line: contains `(...)` and no course code
/// - weekday label: `Mon`..`Sun` or the full day name at the start of the text
/// - student header: `Timetable for <ID>`
/// - exam date: `Sat,21,Feb,26` with optional spaces
pub struct Patterns {
    course_code: Regex,
    teacher_room_fragment: Regex,
    parenthesized: Regex,
    weekday_label: Regex,
    student_header: Regex,
    exam_date: Regex,
    exam_subject: Regex,
    exam_section: Regex,
    exam_strength: Regex,
    segment: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            course_code: Regex::new(r"\b([A-Z]{2,4}\d{4})\b((?:,[A-Za-z0-9-]+)+)?(?:\s*[:\-–]\s*)?")
                .context("failed to compile course code regex")?,
            teacher_room_fragment: Regex::new(r"[A-Za-z][A-Za-z.' \-]*?[ ]*\([^)\n]*\)")
                .context("failed to compile teacher/room fragment regex")?,
            parenthesized: Regex::new(r"\(([^)]*)\)")
                .context("failed to compile parenthesized text regex")?,
            weekday_label: Regex::new(
                r"^\s*(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday|Mon|Tue|Wed|Thu|Fri|Sat|Sun)\b",
            )
            .context("failed to compile weekday label regex")?,
            student_header: Regex::new(r"(?i)Timetable\s+for\s+([A-Za-z0-9]+-[A-Za-z0-9]+)")
                .context("failed to compile student header regex")?,
            exam_date: Regex::new(r"([A-Za-z]+)\s*,\s*(\d{1,2})\s*,\s*([A-Za-z]+)\s*,\s*(\d{2})\b")
                .context("failed to compile exam date regex")?,
            exam_subject: Regex::new(r"[A-Z]{2,4}\d{4}\s*-\s*[^|]+")
                .context("failed to compile exam subject regex")?,
            exam_section: Regex::new(r"\|[^ ]+").context("failed to compile exam section regex")?,
            exam_strength: Regex::new(r"\(St:\s*\d+\)")
                .context("failed to compile exam strength regex")?,
            segment: Regex::new(r"\S+(?: \S+)*").context("failed to compile segment regex")?,
        })
    }

    pub fn find_course_code_tokens(&self, text: &str) -> Vec<CourseToken> {
        self.course_code
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let code = captures.get(1)?.as_str().to_string();
                let section = captures
                    .get(2)
                    .map(|m| m.as_str().trim_start_matches(',').to_string())
                    .filter(|section| !section.is_empty());
                Some(CourseToken {
                    code,
                    section,
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }

    pub fn contains_course_code(&self, text: &str) -> bool {
        self.course_code.is_match(text)
    }

    /// Recognizes a `Name (Place)` line. The room is the last parenthesized
    /// group; the teacher is what remains once every group is removed.
    pub fn match_teacher_room_line(&self, line: &str) -> Option<TeacherRoom> {
        let line = line.trim();
        if line.is_empty() || self.contains_course_code(line) {
            return None;
        }

        let room = self
            .parenthesized
            .captures_iter(line)
            .filter_map(|captures| captures.get(1))
            .last()?
            .as_str()
            .trim()
            .to_string();

        let teacher = self.parenthesized.replace_all(line, " ");
        let teacher = teacher
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
            .trim_matches(TEACHER_TRIM)
            .to_string();

        Some(TeacherRoom { teacher, room })
    }

    /// Removes inline `Name (Place)` fragments line by line.
    pub fn strip_teacher_room_fragments(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.teacher_room_fragment.replace_all(line, " ").into_owned())
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Returns the weekday a text starts with and the byte offset just past the label.
    pub fn match_weekday_label(&self, text: &str) -> Option<(Weekday, usize)> {
        let captures = self.weekday_label.captures(text)?;
        let label = captures.get(1)?;
        let day = Weekday::from_label(label.as_str())?;
        Some((day, label.end()))
    }

    pub fn find_student_headers(&self, text: &str) -> Vec<StudentHeader> {
        self.student_header
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let roll = captures.get(1)?;
                Some(StudentHeader {
                    roll_number: normalize_roll_number(roll.as_str()),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }

    /// Finds a `Sat,21,Feb,26` style date and renders it as `Sat, 21 Feb 2026`.
    pub fn parse_exam_date(&self, text: &str) -> Option<String> {
        let captures = self.exam_date.captures(text)?;
        Some(format!(
            "{}, {} {} 20{}",
            captures.get(1)?.as_str(),
            captures.get(2)?.as_str(),
            captures.get(3)?.as_str(),
            captures.get(4)?.as_str()
        ))
    }

    pub fn exam_subject<'t>(&self, cell: &'t str) -> Option<&'t str> {
        self.exam_subject.find(cell).map(|m| m.as_str().trim())
    }

    /// Drops `|SECTION` tokens and `(St: N)` strength markers from a datesheet cell.
    pub fn strip_exam_markers(&self, cell: &str) -> String {
        let without_sections = self.exam_section.replace_all(cell, "");
        self.exam_strength
            .replace_all(&without_sections, "")
            .into_owned()
    }

    pub fn split_segments(&self, line: &str) -> Vec<LineSegment> {
        self.segment
            .find_iter(line)
            .map(|m| LineSegment {
                offset: line[..m.start()].chars().count(),
                text: m.as_str().to_string(),
            })
            .collect()
    }
}
