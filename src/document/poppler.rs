use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{DocumentSource, PageSize, Rect, TableRegion};
use crate::error::ExtractError;

const FALLBACK_PAGE_SIZE: PageSize = PageSize {
    width: 842.0,
    height: 595.0,
};

/// Tabula's `-f JSON` output: one entry per detected table.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub(super) struct TabulaTableSet(pub Vec<TabulaTable>);

#[allow(dead_code)]
#[derive(Deserialize, Debug)]
pub(super) struct TabulaTable {
    #[serde(default)]
    pub extraction_method: String,
    pub page_number: usize,
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub right: f32,
    pub bottom: f32,
    pub data: Vec<Vec<TabulaCell>>,
}

#[derive(Deserialize, Debug)]
pub(super) struct TabulaCell {
    #[serde(default)]
    pub text: String,
}

/// A PDF read through poppler's command-line tools, with table geometry
/// taken from an optional Tabula JSON sidecar.
pub struct PopplerDocument {
    path: PathBuf,
    pages: Vec<String>,
    sizes: Vec<PageSize>,
    tables: Vec<Vec<TableRegion>>,
    layout: OnceLock<String>,
}

impl PopplerDocument {
    pub fn open(path: &Path, tables_sidecar: Option<&Path>) -> Result<Self> {
        if let Err(err) = fs::metadata(path) {
            return Err(ExtractError::DocumentRead {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
            .into());
        }

        let pages = extract_pages_with_pdftotext(path).map_err(|err| ExtractError::DocumentRead {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })?;

        let sizes = match read_page_sizes(path, pages.len()) {
            Ok(sizes) => sizes,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %format!("{err:#}"),
                    "pdfinfo unavailable; using fallback page size"
                );
                vec![FALLBACK_PAGE_SIZE; pages.len()]
            }
        };

        let sidecar_path = tables_sidecar
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_sidecar_path(path));
        let tables = if sidecar_path.exists() {
            let raw = fs::read(&sidecar_path)
                .with_context(|| format!("failed to read {}", sidecar_path.display()))?;
            let tables = tables_from_tabula_json(&raw, pages.len())
                .with_context(|| format!("failed to parse {}", sidecar_path.display()))?;
            info!(
                path = %sidecar_path.display(),
                tables = tables.iter().map(Vec::len).sum::<usize>(),
                "loaded table sidecar"
            );
            tables
        } else {
            debug!(path = %sidecar_path.display(), "no table sidecar; document has no table regions");
            vec![Vec::new(); pages.len()]
        };

        Ok(Self {
            path: path.to_path_buf(),
            pages,
            sizes,
            tables,
            layout: OnceLock::new(),
        })
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page >= self.pages.len() {
            bail!(
                "page {} out of range for {} ({} pages)",
                page + 1,
                self.path.display(),
                self.pages.len()
            );
        }
        Ok(())
    }
}

impl DocumentSource for PopplerDocument {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<String> {
        self.check_page(page)?;
        Ok(self.pages[page].clone())
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        self.check_page(page)?;
        Ok(self.sizes.get(page).copied().unwrap_or(FALLBACK_PAGE_SIZE))
    }

    fn tables(&self, page: usize) -> Result<Vec<TableRegion>> {
        self.check_page(page)?;
        Ok(self.tables.get(page).cloned().unwrap_or_default())
    }

    fn text_in_rect(&self, page: usize, rect: Rect) -> Result<String> {
        self.check_page(page)?;
        let page_number = (page + 1).to_string();

        let mut command = Command::new("pdftotext");
        command
            .arg("-enc")
            .arg("UTF-8")
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number)
            .arg("-x")
            .arg((rect.x0.floor() as i64).to_string())
            .arg("-y")
            .arg((rect.top.floor() as i64).to_string())
            .arg("-W")
            .arg((rect.width().ceil() as i64).to_string())
            .arg("-H")
            .arg((rect.height().ceil() as i64).to_string())
            .arg(&self.path)
            .arg("-");

        let output = run_poppler(command, "pdftotext")?;
        Ok(output.replace('\u{000C}', "").trim().to_string())
    }

    fn layout_text(&self) -> Result<String> {
        if let Some(text) = self.layout.get() {
            return Ok(text.clone());
        }

        let mut command = Command::new("pdftotext");
        command
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(&self.path)
            .arg("-");

        let text = run_poppler(command, "pdftotext")?.replace('\u{000C}', "\n");
        let _ = self.layout.set(text.clone());
        Ok(text)
    }
}

fn default_sidecar_path(pdf_path: &Path) -> PathBuf {
    let mut name = pdf_path.as_os_str().to_os_string();
    name.push(".tables.json");
    PathBuf::from(name)
}

fn run_poppler(mut command: Command, program: &str) -> Result<String> {
    let output = command
        .output()
        .with_context(|| format!("failed to execute {program}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} returned non-zero exit status: {}", stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
}

fn extract_pages_with_pdftotext(pdf_path: &Path) -> Result<Vec<String>> {
    let mut command = Command::new("pdftotext");
    command.arg("-enc").arg("UTF-8").arg(pdf_path).arg("-");
    let raw = run_poppler(command, "pdftotext")
        .with_context(|| format!("failed to extract text from {}", pdf_path.display()))?;

    let mut pages: Vec<String> = raw.split('\u{000C}').map(str::to_string).collect();
    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}

fn read_page_sizes(pdf_path: &Path, page_count: usize) -> Result<Vec<PageSize>> {
    let mut command = Command::new("pdfinfo");
    command
        .arg("-f")
        .arg("1")
        .arg("-l")
        .arg(page_count.max(1).to_string())
        .arg(pdf_path);
    let output = run_poppler(command, "pdfinfo")?;
    parse_pdfinfo_page_sizes(&output, page_count)
}

pub(super) fn parse_pdfinfo_page_sizes(output: &str, page_count: usize) -> Result<Vec<PageSize>> {
    let pattern = Regex::new(r"(?m)^Page\s+(\d+)\s+size:\s+([\d.]+)\s+x\s+([\d.]+)")
        .context("failed to compile pdfinfo page size regex")?;

    let mut sizes = vec![FALLBACK_PAGE_SIZE; page_count];
    let mut found = 0usize;
    for captures in pattern.captures_iter(output) {
        let page = captures[1].parse::<usize>().unwrap_or(0);
        let (Ok(width), Ok(height)) = (captures[2].parse::<f32>(), captures[3].parse::<f32>())
        else {
            continue;
        };
        if page == 0 || page > page_count {
            continue;
        }
        sizes[page - 1] = PageSize { width, height };
        found += 1;
    }

    if found == 0 && page_count > 0 {
        bail!("pdfinfo reported no per-page sizes");
    }
    Ok(sizes)
}

pub(super) fn tables_from_tabula_json(raw: &[u8], page_count: usize) -> Result<Vec<Vec<TableRegion>>> {
    let TabulaTableSet(tables) = serde_json::from_slice(raw)?;

    let mut by_page = BTreeMap::<usize, Vec<TableRegion>>::new();
    for table in tables {
        if table.page_number == 0 || table.page_number > page_count {
            warn!(page = table.page_number, "table sidecar references a missing page");
            continue;
        }

        let rows = table
            .data
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let text = cell.text.replace("\r\n", "\n").replace('\r', "\n");
                        if text.trim().is_empty() {
                            None
                        } else {
                            Some(text)
                        }
                    })
                    .collect::<Vec<Option<String>>>()
            })
            .collect::<Vec<_>>();

        by_page
            .entry(table.page_number - 1)
            .or_default()
            .push(TableRegion {
                bbox: Rect {
                    x0: table.left,
                    top: table.top,
                    x1: table.right,
                    bottom: table.bottom,
                },
                rows,
            });
    }

    let mut pages = vec![Vec::new(); page_count];
    for (page, mut tables) in by_page {
        tables.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));
        pages[page] = tables;
    }
    Ok(pages)
}
