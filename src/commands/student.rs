use anyhow::Result;
use tracing::info;

use super::pipeline::PreparedRun;
use crate::cli::StudentArgs;
use crate::model::{StudentSchedule, normalize_roll_number};
use crate::util::{write_json_pretty, write_json_stdout};

pub fn run(args: StudentArgs) -> Result<()> {
    let prepared = PreparedRun::prepare(&args.source)?;
    let schedule = parse_student(&prepared, &args.roll)?;

    info!(
        roll_number = %schedule.roll_number,
        classes = schedule.weekly_schedule.len(),
        exams = schedule.exam_schedule.len(),
        "parsed student schedule"
    );

    match &args.output {
        Some(path) => {
            write_json_pretty(path, &schedule)?;
            info!(path = %path.display(), "wrote student schedule");
            Ok(())
        }
        None => write_json_stdout(&schedule),
    }
}

pub fn parse_student(prepared: &PreparedRun, roll_number: &str) -> Result<StudentSchedule> {
    let roll_number = normalize_roll_number(roll_number);
    let timetable = prepared.extract_student(&roll_number)?;
    let entry = prepared.build_entry(&roll_number, timetable);
    Ok(StudentSchedule::from_entry(
        &roll_number,
        entry,
        Some(prepared.exam_type()),
    ))
}
