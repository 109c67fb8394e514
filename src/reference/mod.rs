use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ExtractError;
use crate::model::ScheduleIndex;
use crate::util::read_json;


const HONORIFICS: [&str; 5] = ["dr", "mr", "mrs", "ms", "prof"];

#[derive(Debug, Clone, Default)]
pub struct ReferencePaths {
    pub metadata: Option<PathBuf>,
    pub faculty: Option<PathBuf>,
    pub course_map: Option<PathBuf>,
}

/// Read-only lookup tables shared by every student in a run.
///
/// Keys are stored normalized (see [`normalize_key`]) in sorted maps so that
/// approximate matching visits them in a stable order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub room_aliases: BTreeMap<String, String>,
    pub faculty_names: BTreeMap<String, String>,
    pub course_names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataFile {
    #[serde(default)]
    teachers: Vec<String>,
    #[serde(default)]
    venues: Vec<String>,
    #[serde(default)]
    room_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FacultyRecord {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CourseMapFile {
    Index(ScheduleIndex),
    Map(BTreeMap<String, String>),
}

impl ReferenceTables {
    /// Loads every configured reference file. A missing or malformed file
    /// leaves its table empty and is reported in the returned warnings.
    pub fn load(paths: &ReferencePaths) -> (Self, Vec<String>) {
        let mut tables = Self::default();
        let mut warnings = Vec::new();

        if let Some(path) = &paths.metadata {
            match read_reference::<MetadataFile>(path) {
                Ok(metadata) => tables.add_metadata(metadata),
                Err(err) => warnings.push(report_load_failure(path, err)),
            }
        }

        if let Some(path) = &paths.faculty {
            match read_reference::<Vec<FacultyRecord>>(path) {
                Ok(records) => {
                    for record in records {
                        tables.add_faculty_member(&record.name);
                    }
                }
                Err(err) => warnings.push(report_load_failure(path, err)),
            }
        }

        if let Some(path) = &paths.course_map {
            match read_reference::<CourseMapFile>(path) {
                Ok(CourseMapFile::Map(map)) => {
                    for (code, name) in map {
                        tables.add_course_name(&code, &name);
                    }
                }
                Ok(CourseMapFile::Index(index)) => {
                    for entry in index.schedules.values() {
                        for exam in &entry.exam_schedule {
                            if let Some((code, name)) = exam.subject.split_once(" - ") {
                                tables.add_course_name(code, name);
                            }
                        }
                    }
                }
                Err(err) => warnings.push(report_load_failure(path, err)),
            }
        }

        info!(
            room_aliases = tables.room_aliases.len(),
            faculty_keys = tables.faculty_names.len(),
            course_names = tables.course_names.len(),
            "loaded reference tables"
        );

        (tables, warnings)
    }

    fn add_metadata(&mut self, metadata: MetadataFile) {
        for (alias, room) in metadata.room_aliases {
            let key = normalize_key(&alias);
            if !key.is_empty() {
                self.room_aliases.insert(key, room);
            }
        }

        for venue in metadata.venues {
            let key = normalize_key(&venue);
            if !key.is_empty() {
                self.room_aliases.entry(key).or_insert(venue);
            }
        }

        for teacher in metadata.teachers {
            let name = teacher.trim();
            let plausible = name.chars().count() > 4
                && name.chars().next().is_some_and(char::is_alphabetic)
                && !name.chars().any(|character| character.is_ascii_digit());
            if plausible {
                self.faculty_names
                    .entry(normalize_key(name))
                    .or_insert_with(|| name.to_string());
            }
        }
    }

    pub fn add_faculty_member(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let mut variants = faculty_key_variants(name).into_iter();
        if let Some(full) = variants.next() {
            self.faculty_names.insert(full, name.to_string());
        }
        for key in variants {
            self.faculty_names
                .entry(key)
                .or_insert_with(|| name.to_string());
        }
    }

    /// Records a course name unless the code already has one.
    pub fn add_course_name(&mut self, code: &str, name: &str) -> bool {
        let code = code.trim();
        let name = name.trim();
        if name.is_empty() || !is_course_code(code) {
            return false;
        }
        if self.course_names.contains_key(code) {
            return false;
        }
        self.course_names.insert(code.to_string(), name.to_string());
        true
    }
}

fn read_reference<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    read_json(path).map_err(|err| {
        ExtractError::ReferenceLoad {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }
        .into()
    })
}

fn report_load_failure(path: &Path, err: anyhow::Error) -> String {
    warn!(
        path = %path.display(),
        error = %err,
        "reference file unavailable; falling back to raw values"
    );
    err.to_string()
}

/// Lowercases, treats hyphens as spaces and collapses whitespace.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Lookup keys for one person: the full name first, then the name without
/// honorifics, then initial + surname in both orders.
pub fn faculty_key_variants(name: &str) -> Vec<String> {
    let full = normalize_key(name);
    let parts = full
        .split(' ')
        .filter(|part| !HONORIFICS.contains(&part.trim_end_matches('.')))
        .collect::<Vec<&str>>();

    let mut variants = vec![full.clone()];
    let bare = parts.join(" ");
    if !bare.is_empty() && bare != full {
        variants.push(bare);
    }

    if parts.len() >= 2 {
        let first_initial = parts[0].chars().next().map(String::from).unwrap_or_default();
        let last = parts[parts.len() - 1];
        for key in [format!("{first_initial} {last}"), format!("{last} {first_initial}")] {
            if !variants.contains(&key) {
                variants.push(key);
            }
        }
    }

    variants
}

fn is_course_code(code: &str) -> bool {
    let letters = code.chars().take_while(char::is_ascii_uppercase).count();
    let digits = &code[letters..];
    (2..=4).contains(&letters) && digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit())
}
