use std::path::Path;

use anyhow::{Result, bail};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cli::{ModeArg, SlotProfile, SourceArgs};
use crate::document::{DocumentSource, open_document};
use crate::error::ExtractError;
use crate::extract::assemble::{assemble_exams, assemble_weekly};
use crate::extract::exams::{
    ExamSlot, course_names_from_slots, detect_exam_type, exams_for_courses, extract_exam_slots,
};
use crate::extract::layout::{parse_layout_block, split_layout_blocks};
use crate::extract::locator::{correlate_table, locate_students, pages_for_student};
use crate::extract::slots::SlotTable;
use crate::extract::table::parse_timetable_grid;
use crate::extract::{ExtractionContext, ExtractionMode, StudentTimetable};
use crate::fixups::CosmeticFixups;
use crate::model::{DEFAULT_EXAM_TYPE, StudentEntry, normalize_roll_number};
use crate::reference::{ReferencePaths, ReferenceTables};

pub struct Datesheet {
    pub exam_type: String,
    pub slots: Vec<ExamSlot>,
}

/// A student header found in the timetable, with its recovered timetable
/// when the geometry could be resolved.
#[derive(Debug, Clone)]
pub struct LocatedStudent {
    pub roll_number: String,
    pub location: String,
    pub timetable: Option<StudentTimetable>,
}

/// Opened documents and loaded tables for one command invocation.
pub struct PreparedRun {
    pub context: ExtractionContext,
    pub timetable: Box<dyn DocumentSource>,
    pub mode: ExtractionMode,
    pub datesheet: Option<Datesheet>,
    pub fixups: CosmeticFixups,
    pub warnings: Vec<String>,
}

pub fn slot_table(source: &SourceArgs) -> Result<SlotTable> {
    match &source.slots {
        Some(explicit) => SlotTable::parse(explicit),
        None => Ok(profile_slots(source.slot_profile)),
    }
}

pub fn profile_slots(profile: SlotProfile) -> SlotTable {
    match profile {
        SlotProfile::Regular => SlotTable::regular(),
        SlotProfile::Ramadan => SlotTable::ramadan(),
    }
}

impl PreparedRun {
    pub fn prepare(source: &SourceArgs) -> Result<Self> {
        if !(0.0..=1.0).contains(&source.similarity_threshold) {
            bail!(
                "similarity threshold must be between 0 and 1, got {}",
                source.similarity_threshold
            );
        }

        let paths = ReferencePaths {
            metadata: source.metadata.clone(),
            faculty: source.faculty.clone(),
            course_map: source.course_map.clone(),
        };
        let (references, mut warnings) = ReferenceTables::load(&paths);

        let mut context = ExtractionContext::new(references, slot_table(source)?)?;
        context.similarity_threshold = source.similarity_threshold;
        context.legacy_exam_room = source.legacy_exam_room;

        let timetable = open_document(&source.timetable, source.timetable_tables.as_deref())?;

        let datesheet = match &source.datesheet {
            Some(path) => Some(load_datesheet(
                &mut context,
                path,
                source.datesheet_tables.as_deref(),
            )?),
            None => None,
        };

        let mode = match source.mode {
            ModeArg::Auto => ExtractionMode::detect(timetable.as_ref())?,
            ModeArg::Table => ExtractionMode::Table,
            ModeArg::Layout => ExtractionMode::Layout,
        };

        let (fixups, fixup_warnings) = CosmeticFixups::load(source.fixups.as_deref());
        warnings.extend(fixup_warnings);

        info!(
            timetable = %timetable.name(),
            pages = timetable.page_count(),
            mode = mode.as_str(),
            requested_mode = source.mode.as_str(),
            slots = context.slots.slots().len(),
            "prepared extraction run"
        );

        Ok(Self {
            context,
            timetable,
            mode,
            datesheet,
            fixups,
            warnings,
        })
    }

    pub fn exam_type(&self) -> String {
        self.datesheet
            .as_ref()
            .map(|datesheet| datesheet.exam_type.clone())
            .unwrap_or_else(|| DEFAULT_EXAM_TYPE.to_string())
    }

    /// Every student header in document order. Pages (table mode) or blocks
    /// (layout mode) are processed in parallel and merged back in order.
    pub fn extract_all(&self) -> Result<Vec<LocatedStudent>> {
        match self.mode {
            ExtractionMode::Table => {
                let pages = (0..self.timetable.page_count())
                    .into_par_iter()
                    .map(|page| self.extract_page(page))
                    .collect::<Result<Vec<Vec<LocatedStudent>>>>()?;
                Ok(pages.into_iter().flatten().collect())
            }
            ExtractionMode::Layout => {
                let text = self.timetable.layout_text()?;
                let blocks = split_layout_blocks(&self.context, &text);
                Ok(blocks
                    .par_iter()
                    .enumerate()
                    .map(|(position, block)| LocatedStudent {
                        roll_number: block.roll_number.clone(),
                        location: format!("layout block {}", position + 1),
                        timetable: parse_layout_block(&self.context, &block.text),
                    })
                    .collect())
            }
        }
    }

    fn extract_page(&self, page: usize) -> Result<Vec<LocatedStudent>> {
        let text = self.timetable.page_text(page)?;
        let rolls = locate_students(&self.context.patterns, &text);
        if rolls.is_empty() {
            return Ok(Vec::new());
        }

        let tables = self.timetable.tables(page)?;
        let mut located = Vec::with_capacity(rolls.len());
        for roll_number in rolls {
            let timetable = correlate_table(self.timetable.as_ref(), page, &tables, &roll_number)?
                .map(|index| parse_timetable_grid(&self.context, &tables[index]));
            located.push(LocatedStudent {
                roll_number,
                location: format!("page {}", page + 1),
                timetable,
            });
        }
        Ok(located)
    }

    /// Recovers a single student's timetable straight from the document.
    pub fn extract_student(&self, roll_number: &str) -> Result<StudentTimetable> {
        let roll_number = normalize_roll_number(roll_number);
        let not_found = || ExtractError::NotFound {
            roll_number: roll_number.clone(),
            source_name: self.timetable.name(),
        };

        match self.mode {
            ExtractionMode::Table => {
                let pages = pages_for_student(
                    &self.context.patterns,
                    self.timetable.as_ref(),
                    &roll_number,
                )?;
                let Some(&first_page) = pages.first() else {
                    return Err(not_found().into());
                };

                for page in pages {
                    let tables = self.timetable.tables(page)?;
                    if let Some(index) =
                        correlate_table(self.timetable.as_ref(), page, &tables, &roll_number)?
                    {
                        info!(roll_number = %roll_number, page = page + 1, "found student table");
                        return Ok(parse_timetable_grid(&self.context, &tables[index]));
                    }
                }

                Err(ExtractError::UnresolvedGeometry {
                    roll_number: roll_number.clone(),
                    location: format!("page {}", first_page + 1),
                }
                .into())
            }
            ExtractionMode::Layout => {
                let text = self.timetable.layout_text()?;
                let blocks = split_layout_blocks(&self.context, &text);
                let Some(block) = blocks
                    .iter()
                    .find(|block| block.roll_number == roll_number)
                else {
                    return Err(not_found().into());
                };

                parse_layout_block(&self.context, &block.text).ok_or_else(|| {
                    ExtractError::UnresolvedGeometry {
                        roll_number: roll_number.clone(),
                        location: "layout block without a time-slot header".to_string(),
                    }
                    .into()
                })
            }
        }
    }

    /// Assembles, attaches exams and applies cosmetic fixups.
    pub fn build_entry(&self, roll_number: &str, timetable: StudentTimetable) -> StudentEntry {
        let weekly_schedule = assemble_weekly(roll_number, timetable.sessions);
        let exam_schedule = match &self.datesheet {
            Some(datesheet) => assemble_exams(exams_for_courses(
                &self.context.patterns,
                &datesheet.slots,
                &timetable.course_codes,
                self.context.legacy_exam_room,
            )),
            None => Vec::new(),
        };

        let mut entry = StudentEntry {
            weekly_schedule,
            exam_schedule,
        };
        self.fixups.apply(&mut entry);
        entry
    }
}

fn load_datesheet(
    context: &mut ExtractionContext,
    path: &Path,
    tables_sidecar: Option<&Path>,
) -> Result<Datesheet> {
    let document = open_document(path, tables_sidecar)?;

    let first_page_text = if document.page_count() > 0 {
        document.page_text(0)?
    } else {
        warn!(path = %path.display(), "datesheet has no pages");
        String::new()
    };
    let exam_type = detect_exam_type(&first_page_text, path);
    let slots = extract_exam_slots(document.as_ref(), &context.patterns)?;

    let mut mined = 0usize;
    for (code, name) in course_names_from_slots(&context.patterns, &slots) {
        if context.references.add_course_name(&code, &name) {
            mined += 1;
        }
    }

    info!(
        path = %path.display(),
        exam_type = %exam_type,
        slots = slots.len(),
        course_names_added = mined,
        "loaded datesheet"
    );

    Ok(Datesheet { exam_type, slots })
}
