use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_EXAM_TYPE: &str = "Examination Schedule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Accepts the three-letter label or the full English day name, any case.
    pub fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_ascii_lowercase();
        let prefix = lowered.get(..3)?;
        let day = Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(prefix))?;

        let full = match day {
            Self::Mon => "monday",
            Self::Tue => "tuesday",
            Self::Wed => "wednesday",
            Self::Thu => "thursday",
            Self::Fri => "friday",
            Self::Sat => "saturday",
            Self::Sun => "sunday",
        };
        if lowered.len() == 3 || lowered == full {
            Some(day)
        } else {
            None
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub room: String,
    pub teacher: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSession {
    pub subject: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEntry {
    pub weekly_schedule: Vec<ClassSession>,
    pub exam_schedule: Vec<ExamSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSchedule {
    pub roll_number: String,
    pub weekly_schedule: Vec<ClassSession>,
    pub exam_schedule: Vec<ExamSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
}

impl StudentSchedule {
    pub fn from_entry(roll_number: &str, entry: StudentEntry, exam_type: Option<String>) -> Self {
        Self {
            roll_number: roll_number.to_string(),
            weekly_schedule: entry.weekly_schedule,
            exam_schedule: entry.exam_schedule,
            exam_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleIndex {
    pub exam_type: String,
    pub schedules: BTreeMap<String, StudentEntry>,
}

impl Default for ScheduleIndex {
    fn default() -> Self {
        Self {
            exam_type: DEFAULT_EXAM_TYPE.to_string(),
            schedules: BTreeMap::new(),
        }
    }
}

impl ScheduleIndex {
    pub fn student(&self, roll_number: &str) -> Option<StudentSchedule> {
        let key = normalize_roll_number(roll_number);
        self.schedules.get(&key).map(|entry| {
            StudentSchedule::from_entry(&key, entry.clone(), Some(self.exam_type.clone()))
        })
    }

    pub fn session_count(&self) -> usize {
        self.schedules
            .values()
            .map(|entry| entry.weekly_schedule.len())
            .sum()
    }

    pub fn exam_count(&self) -> usize {
        self.schedules
            .values()
            .map(|entry| entry.exam_schedule.len())
            .sum()
    }
}

pub fn normalize_roll_number(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDocument {
    pub role: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexCounts {
    pub page_count: usize,
    pub students_located: usize,
    pub students_indexed: usize,
    pub students_unresolved: usize,
    pub duplicate_students: usize,
    pub class_sessions: usize,
    pub exam_slots: usize,
    pub exam_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub extraction_mode: String,
    pub exam_type: String,
    pub index_path: String,
    pub inputs: Vec<InputDocument>,
    pub counts: IndexCounts,
    pub warnings: Vec<String>,
}
