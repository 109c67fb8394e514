use std::collections::BTreeSet;

use anyhow::{Result, bail};
use tracing::{info, warn};

use super::pipeline::profile_slots;
use crate::cli::RetimeArgs;
use crate::extract::slots::SlotTable;
use crate::model::ScheduleIndex;
use crate::util::{read_json, write_json_pretty};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetimeReport {
    pub updated: usize,
    /// Start times with no counterpart in the target table, left unchanged.
    pub unmapped: BTreeSet<String>,
}

pub fn run(args: RetimeArgs) -> Result<()> {
    if args.from == args.to {
        bail!("--from and --to name the same slot profile ({})", args.from.as_str());
    }

    let mut index: ScheduleIndex = read_json(&args.index)?;
    let report = retime_index(&mut index, &profile_slots(args.from), &profile_slots(args.to));

    let output = args.output.clone().unwrap_or_else(|| args.index.clone());
    write_json_pretty(&output, &index)?;

    if !report.unmapped.is_empty() {
        warn!(
            start_times = %report.unmapped.iter().cloned().collect::<Vec<String>>().join(", "),
            "start times without a counterpart were left unchanged"
        );
    }
    info!(
        path = %output.display(),
        from = args.from.as_str(),
        to = args.to.as_str(),
        updated = report.updated,
        "retimed schedule index"
    );

    Ok(())
}

/// Moves every weekly session from its `from` slot to the matching `to` slot.
pub fn retime_index(index: &mut ScheduleIndex, from: &SlotTable, to: &SlotTable) -> RetimeReport {
    let counterparts = from.counterparts_in(to);
    let mut report = RetimeReport::default();

    for entry in index.schedules.values_mut() {
        for session in &mut entry.weekly_schedule {
            let start = session.start_time.trim();
            let target = from
                .position_of_start(start)
                .and_then(|position| counterparts.get(position).copied().flatten())
                .and_then(|position| to.get(position));

            match target {
                Some(slot) => {
                    session.start_time = slot.start.clone();
                    session.end_time = slot.end.clone();
                    report.updated += 1;
                }
                None => {
                    report.unmapped.insert(start.to_string());
                }
            }
        }
    }

    report
}
