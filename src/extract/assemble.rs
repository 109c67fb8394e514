use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::warn;

use super::slots::resolved_minutes;
use crate::model::{ClassSession, ExamSession};

/// Subjects are compared on this many leading characters when deduplicating.
pub const SUBJECT_KEY_CHARS: usize = 60;

pub const EXAM_DATE_FORMAT: &str = "%a, %d %b %Y";

fn subject_key(subject: &str) -> String {
    subject.chars().take(SUBJECT_KEY_CHARS).collect()
}

/// Drops malformed sessions and duplicates, then orders the week.
pub fn assemble_weekly(roll_number: &str, sessions: Vec<ClassSession>) -> Vec<ClassSession> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(sessions.len());

    for session in sessions {
        let start = resolved_minutes(&session.start_time);
        let end = resolved_minutes(&session.end_time);
        let well_formed = matches!((start, end), (Some(start), Some(end)) if start < end);
        if !well_formed {
            warn!(
                roll_number,
                day = %session.day,
                start = %session.start_time,
                end = %session.end_time,
                subject = %session.subject,
                "dropping session with an invalid time range"
            );
            continue;
        }

        let key = (session.day, session.start_time.clone(), subject_key(&session.subject));
        if seen.insert(key) {
            kept.push(session);
        }
    }

    kept.sort_by_key(|session| {
        (
            session.day.index(),
            resolved_minutes(&session.start_time).unwrap_or(u32::MAX),
        )
    });
    kept
}

pub fn parse_exam_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), EXAM_DATE_FORMAT).ok()
}

/// Deduplicates on `(subject, date, start_time)` and orders by date, then
/// start time. Undated or unparseable entries go last.
pub fn assemble_exams(exams: Vec<ExamSession>) -> Vec<ExamSession> {
    let mut seen = HashSet::new();
    let mut kept = exams
        .into_iter()
        .filter(|exam| seen.insert((exam.subject.clone(), exam.date.clone(), exam.start_time.clone())))
        .collect::<Vec<ExamSession>>();

    kept.sort_by_key(|exam| {
        let date = parse_exam_date(&exam.date);
        (
            date.is_none(),
            date,
            resolved_minutes(&exam.start_time).unwrap_or(u32::MAX),
        )
    });
    kept
}
