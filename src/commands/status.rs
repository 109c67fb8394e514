use anyhow::Result;
use tracing::{info, warn};

use super::index::default_manifest_path;
use crate::cli::StatusArgs;
use crate::model::{IndexRunManifest, ScheduleIndex};
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    info!(index = %args.index.display(), "status requested");

    if args.index.exists() {
        let index: ScheduleIndex = read_json(&args.index)?;
        let empty_weeks = index
            .schedules
            .values()
            .filter(|entry| entry.weekly_schedule.is_empty())
            .count();

        info!(
            path = %args.index.display(),
            exam_type = %index.exam_type,
            students = index.schedules.len(),
            class_sessions = index.session_count(),
            exam_sessions = index.exam_count(),
            students_without_classes = empty_weeks,
            "loaded schedule index"
        );
    } else {
        warn!(path = %args.index.display(), "schedule index missing");
    }

    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| default_manifest_path(&args.index));
    if manifest_path.exists() {
        let manifest: IndexRunManifest = read_json(&manifest_path)?;
        info!(
            run_id = %manifest.run_id,
            status = %manifest.status,
            started_at = %manifest.started_at,
            updated_at = %manifest.updated_at,
            extraction_mode = %manifest.extraction_mode,
            exam_type = %manifest.exam_type,
            pages = manifest.counts.page_count,
            students_located = manifest.counts.students_located,
            students_indexed = manifest.counts.students_indexed,
            students_unresolved = manifest.counts.students_unresolved,
            duplicate_students = manifest.counts.duplicate_students,
            exam_slots = manifest.counts.exam_slots,
            inputs = manifest.inputs.len(),
            warnings = manifest.warnings.len(),
            "loaded index run manifest"
        );
        for input in &manifest.inputs {
            info!(role = %input.role, path = %input.path, sha256 = %input.sha256, "run input");
        }
    } else {
        warn!(path = %manifest_path.display(), "index run manifest missing");
    }

    Ok(())
}
