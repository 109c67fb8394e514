use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

mod extracted;
mod poppler;

pub use extracted::{ExtractedDocument, ExtractedPage, PositionedWord};
pub use poppler::PopplerDocument;

/// Page-relative rectangle in PDF points, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.top && y <= self.bottom
    }

    /// The band of `height` points directly above this rectangle, clamped to the page top.
    pub fn band_above(&self, height: f32) -> Rect {
        Rect {
            x0: self.x0,
            top: (self.top - height).max(0.0),
            x1: self.x1,
            bottom: self.top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// A detected grid on a page. Cells may be missing and may span several lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    pub bbox: Rect,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableRegion {
    pub fn header(&self) -> &[Option<String>] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn body(&self) -> &[Vec<Option<String>>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Read access to a laid-out document. Pages are zero-based.
pub trait DocumentSource: Sync {
    fn name(&self) -> String;

    fn page_count(&self) -> usize;

    fn page_text(&self, page: usize) -> Result<String>;

    fn page_size(&self, page: usize) -> Result<PageSize>;

    fn tables(&self, page: usize) -> Result<Vec<TableRegion>>;

    fn text_in_rect(&self, page: usize, rect: Rect) -> Result<String>;

    /// Layout-preserving text of the whole document, pages joined by newlines.
    fn layout_text(&self) -> Result<String>;

    fn has_tables(&self) -> Result<bool> {
        for page in 0..self.page_count() {
            if !self.tables(page)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Opens `path` with the adapter matching its extension: `.json` files are
/// pre-extracted documents, everything else goes through poppler.
pub fn open_document(path: &Path, tables_sidecar: Option<&Path>) -> Result<Box<dyn DocumentSource>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let document = ExtractedDocument::open(path)
            .with_context(|| format!("failed to open extracted document {}", path.display()))?;
        return Ok(Box::new(document));
    }

    let document = PopplerDocument::open(path, tables_sidecar)
        .with_context(|| format!("failed to open pdf document {}", path.display()))?;
    Ok(Box::new(document))
}
