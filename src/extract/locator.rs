use anyhow::Result;
use tracing::debug;

use super::patterns::Patterns;
use crate::document::{DocumentSource, TableRegion};
use crate::model::normalize_roll_number;

/// Height in points of the band above a table that carries its student header.
pub const STUDENT_BAND_HEIGHT: f32 = 50.0;

/// Roll numbers announced on a page, in order of first appearance.
pub fn locate_students(patterns: &Patterns, text: &str) -> Vec<String> {
    let mut rolls = Vec::<String>::new();
    for header in patterns.find_student_headers(text) {
        if !rolls.contains(&header.roll_number) {
            rolls.push(header.roll_number);
        }
    }
    rolls
}

/// Index of the first table on `page` whose header band names `roll_number`.
pub fn correlate_table(
    document: &dyn DocumentSource,
    page: usize,
    tables: &[TableRegion],
    roll_number: &str,
) -> Result<Option<usize>> {
    let wanted = normalize_roll_number(roll_number);
    for (index, table) in tables.iter().enumerate() {
        let band = table.bbox.band_above(STUDENT_BAND_HEIGHT);
        let band_text = document.text_in_rect(page, band)?;
        if band_text.to_ascii_uppercase().contains(&wanted) {
            debug!(roll_number = %wanted, page = page + 1, table = index, "correlated table");
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Zero-based pages whose text carries the header for `roll_number`.
pub fn pages_for_student(
    patterns: &Patterns,
    document: &dyn DocumentSource,
    roll_number: &str,
) -> Result<Vec<usize>> {
    let wanted = normalize_roll_number(roll_number);
    let mut pages = Vec::new();
    for page in 0..document.page_count() {
        let text = document.page_text(page)?;
        if locate_students(patterns, &text).contains(&wanted) {
            pages.push(page);
        }
    }
    Ok(pages)
}
