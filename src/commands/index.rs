use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use super::pipeline::PreparedRun;
use crate::cli::IndexArgs;
use crate::error::ExtractError;
use crate::model::{IndexCounts, IndexRunManifest, InputDocument, ScheduleIndex};
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

/// The rebuilt index plus what the run manifest reports about it.
#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub index: ScheduleIndex,
    pub counts: IndexCounts,
    pub warnings: Vec<String>,
}

pub fn run(args: IndexArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(
        run_id = %run_id,
        timetable = %args.source.timetable.display(),
        output = %args.output.display(),
        "starting index run"
    );

    let prepared = PreparedRun::prepare(&args.source)?;
    let build = build_index(&prepared)?;

    write_json_pretty(&args.output, &build.index)?;
    info!(
        path = %args.output.display(),
        students = build.index.schedules.len(),
        "wrote schedule index"
    );

    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| default_manifest_path(&args.output));
    let manifest = IndexRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_index_command(&args),
        extraction_mode: prepared.mode.as_str().to_string(),
        exam_type: build.index.exam_type.clone(),
        index_path: args.output.display().to_string(),
        inputs: collect_inputs(&args)?,
        counts: build.counts.clone(),
        warnings: build.warnings.clone(),
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote index run manifest");
    info!(
        students_indexed = build.counts.students_indexed,
        students_unresolved = build.counts.students_unresolved,
        class_sessions = build.counts.class_sessions,
        exam_sessions = build.counts.exam_sessions,
        warnings = build.warnings.len(),
        "index completed"
    );

    Ok(())
}

pub fn default_manifest_path(index_path: &Path) -> PathBuf {
    index_path.with_extension("run.json")
}

/// Runs the pipeline for every student in the timetable. The first
/// occurrence of a roll number wins; later ones are reported.
pub fn build_index(prepared: &PreparedRun) -> Result<IndexBuild> {
    let located = prepared.extract_all()?;

    let mut index = ScheduleIndex {
        exam_type: prepared.exam_type(),
        ..ScheduleIndex::default()
    };
    let mut counts = IndexCounts {
        page_count: prepared.timetable.page_count(),
        students_located: located.len(),
        exam_slots: prepared
            .datesheet
            .as_ref()
            .map(|datesheet| datesheet.slots.len())
            .unwrap_or(0),
        ..IndexCounts::default()
    };
    let mut warnings = prepared.warnings.clone();
    let mut seen = HashSet::new();

    for student in located {
        if !seen.insert(student.roll_number.clone()) {
            counts.duplicate_students += 1;
            warn!(
                roll_number = %student.roll_number,
                location = %student.location,
                "duplicate student header; keeping the first occurrence"
            );
            warnings.push(format!(
                "duplicate student {} at {}; first occurrence kept",
                student.roll_number, student.location
            ));
            continue;
        }

        let Some(timetable) = student.timetable else {
            let err = ExtractError::UnresolvedGeometry {
                roll_number: student.roll_number.clone(),
                location: student.location.clone(),
            };
            warn!(error = %err, "skipping student");
            counts.students_unresolved += 1;
            warnings.push(err.to_string());
            continue;
        };

        if timetable.is_empty() {
            warn!(roll_number = %student.roll_number, "no class sessions recovered");
        }

        let entry = prepared.build_entry(&student.roll_number, timetable);
        index.schedules.insert(student.roll_number, entry);
    }

    counts.students_indexed = index.schedules.len();
    counts.class_sessions = index.session_count();
    counts.exam_sessions = index.exam_count();

    Ok(IndexBuild {
        index,
        counts,
        warnings,
    })
}

fn collect_inputs(args: &IndexArgs) -> Result<Vec<InputDocument>> {
    let source = &args.source;
    let candidates = [
        ("timetable", Some(&source.timetable)),
        ("timetable_tables", source.timetable_tables.as_ref()),
        ("datesheet", source.datesheet.as_ref()),
        ("datesheet_tables", source.datesheet_tables.as_ref()),
        ("metadata", source.metadata.as_ref()),
        ("faculty", source.faculty.as_ref()),
        ("course_map", source.course_map.as_ref()),
        ("fixups", source.fixups.as_ref()),
    ];

    let mut inputs = Vec::new();
    for (role, path) in candidates {
        let Some(path) = path else {
            continue;
        };
        if !path.exists() {
            continue;
        }
        inputs.push(InputDocument {
            role: role.to_string(),
            path: path.display().to_string(),
            sha256: sha256_file(path)?,
        });
    }
    Ok(inputs)
}

fn render_index_command(args: &IndexArgs) -> String {
    let source = &args.source;
    let mut command = vec![
        "timetable-indexer".to_string(),
        "index".to_string(),
        "--timetable".to_string(),
        source.timetable.display().to_string(),
    ];

    let optional_paths = [
        ("--timetable-tables", &source.timetable_tables),
        ("--datesheet", &source.datesheet),
        ("--datesheet-tables", &source.datesheet_tables),
        ("--metadata", &source.metadata),
        ("--faculty", &source.faculty),
        ("--course-map", &source.course_map),
        ("--fixups", &source.fixups),
        ("--manifest-path", &args.manifest_path),
    ];
    for (flag, path) in optional_paths {
        if let Some(path) = path {
            command.push(flag.to_string());
            command.push(path.display().to_string());
        }
    }

    command.push("--mode".to_string());
    command.push(source.mode.as_str().to_string());
    match &source.slots {
        Some(slots) => {
            command.push("--slots".to_string());
            command.push(slots.clone());
        }
        None => {
            command.push("--slot-profile".to_string());
            command.push(source.slot_profile.as_str().to_string());
        }
    }
    command.push("--similarity-threshold".to_string());
    command.push(source.similarity_threshold.to_string());
    command.push("--legacy-exam-room".to_string());
    command.push(source.legacy_exam_room.to_string());
    command.push("--output".to_string());
    command.push(args.output.display().to_string());

    command.join(" ")
}
