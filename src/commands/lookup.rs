use anyhow::Result;
use tracing::info;

use crate::cli::LookupArgs;
use crate::error::ExtractError;
use crate::model::{ScheduleIndex, normalize_roll_number};
use crate::util::{read_json, write_json_stdout};

pub fn run(args: LookupArgs) -> Result<()> {
    let index: ScheduleIndex = read_json(&args.index)?;

    let Some(schedule) = index.student(&args.roll) else {
        return Err(ExtractError::NotFound {
            roll_number: normalize_roll_number(&args.roll),
            source_name: args.index.display().to_string(),
        }
        .into());
    };

    info!(
        roll_number = %schedule.roll_number,
        classes = schedule.weekly_schedule.len(),
        exams = schedule.exam_schedule.len(),
        "found student in index"
    );
    write_json_stdout(&schedule)
}
