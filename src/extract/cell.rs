use super::patterns::{Patterns, TeacherRoom};
use crate::util::collapse_whitespace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseEntry {
    pub code: String,
    pub section: Option<String>,
    /// Course name as printed, possibly cut off by the column width.
    pub partial_name: String,
}

/// One grid cell split into its course entries. An empty `courses` list
/// means the cell carried no course code and is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecomposedCell {
    pub courses: Vec<CourseEntry>,
    pub teacher_room: Option<TeacherRoom>,
}

pub fn decompose_cell(patterns: &Patterns, raw: &str) -> DecomposedCell {
    let teacher_room = raw
        .lines()
        .rev()
        .find_map(|line| patterns.match_teacher_room_line(line));

    let stripped = patterns.strip_teacher_room_fragments(raw);
    let text = collapse_whitespace(&stripped);
    let tokens = patterns.find_course_code_tokens(&text);

    let courses = tokens
        .iter()
        .enumerate()
        .map(|(position, token)| {
            let name_end = tokens
                .get(position + 1)
                .map(|next| next.start)
                .unwrap_or(text.len());
            let partial_name = text
                .get(token.end..name_end)
                .unwrap_or_default()
                .trim()
                .to_string();
            CourseEntry {
                code: token.code.clone(),
                section: token.section.clone(),
                partial_name,
            }
        })
        .collect();

    DecomposedCell {
        courses,
        teacher_room,
    }
}
