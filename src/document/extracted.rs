use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{DocumentSource, PageSize, Rect, TableRegion};
use crate::error::ExtractError;

const LINE_TOLERANCE: f32 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedWord {
    pub text: String,
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub layout_text: Option<String>,
    #[serde(default)]
    pub words: Vec<PositionedWord>,
    #[serde(default)]
    pub tables: Vec<TableRegion>,
}

/// A document whose pages were extracted ahead of time into JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(default)]
    pub name: String,
    pub pages: Vec<ExtractedPage>,
}

impl ExtractedDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = fs::read(path).map_err(|err| ExtractError::DocumentRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let mut document: ExtractedDocument =
            serde_json::from_slice(&raw).map_err(|err| ExtractError::DocumentRead {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        if document.name.is_empty() {
            document.name = path.display().to_string();
        }
        Ok(document)
    }

    fn page(&self, page: usize) -> Result<&ExtractedPage> {
        self.pages.get(page).with_context(|| {
            format!(
                "page {} out of range for {} ({} pages)",
                page + 1,
                self.name,
                self.pages.len()
            )
        })
    }
}

impl DocumentSource for ExtractedDocument {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        let page = self.page(page)?;
        if !page.text.trim().is_empty() || page.words.is_empty() {
            return Ok(page.text.clone());
        }
        Ok(join_words_into_lines(page.words.iter().collect()))
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        let page = self.page(page)?;
        Ok(PageSize {
            width: page.width,
            height: page.height,
        })
    }

    fn tables(&self, page: usize) -> Result<Vec<TableRegion>> {
        Ok(self.page(page)?.tables.clone())
    }

    fn text_in_rect(&self, page: usize, rect: Rect) -> Result<String> {
        let page = self.page(page)?;
        let inside = page
            .words
            .iter()
            .filter(|word| {
                let center_x = (word.x0 + word.x1) / 2.0;
                let center_y = (word.top + word.bottom) / 2.0;
                rect.contains_point(center_x, center_y)
            })
            .collect::<Vec<&PositionedWord>>();
        Ok(join_words_into_lines(inside))
    }

    fn layout_text(&self) -> Result<String> {
        Ok(self
            .pages
            .iter()
            .map(|page| page.layout_text.as_deref().unwrap_or(&page.text))
            .collect::<Vec<&str>>()
            .join("\n"))
    }
}

fn join_words_into_lines(mut words: Vec<&PositionedWord>) -> String {
    words.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut lines = Vec::<(f32, Vec<&PositionedWord>)>::new();
    for word in words {
        match lines.last_mut() {
            Some((line_top, members)) if (word.top - *line_top).abs() <= LINE_TOLERANCE => {
                members.push(word);
            }
            _ => lines.push((word.top, vec![word])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            members
                .iter()
                .map(|word| word.text.as_str())
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect::<Vec<String>>()
        .join("\n")
}
