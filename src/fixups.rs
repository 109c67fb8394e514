use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::model::StudentEntry;
use crate::util::read_json;

const LAB_SUFFIX: &str = " - Lab";

/// Presentation-only corrections applied after assembly. They never change
/// which sessions exist, only how subjects read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CosmeticFixups {
    /// Literal `(from, to)` substring replacements, applied in order.
    #[serde(default)]
    pub replacements: Vec<(String, String)>,
    /// Course-code prefixes (e.g. `CL`) whose weekly subjects are labs.
    #[serde(default)]
    pub lab_suffix_prefixes: Vec<String>,
}

impl CosmeticFixups {
    /// A missing or malformed file means no fixups; the failure is returned as a warning.
    pub fn load(path: Option<&Path>) -> (Self, Vec<String>) {
        let Some(path) = path else {
            return (Self::default(), Vec::new());
        };

        match read_json::<Self>(path) {
            Ok(fixups) => {
                info!(
                    path = %path.display(),
                    replacements = fixups.replacements.len(),
                    lab_prefixes = fixups.lab_suffix_prefixes.len(),
                    "loaded cosmetic fixups"
                );
                (fixups, Vec::new())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring fixups file");
                (Self::default(), vec![format!("{err:#}")])
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.lab_suffix_prefixes.is_empty()
    }

    pub fn fix_subject(&self, subject: &str) -> String {
        self.replacements
            .iter()
            .filter(|(from, _)| !from.is_empty())
            .fold(subject.to_string(), |fixed, (from, to)| fixed.replace(from, to))
    }

    pub fn apply(&self, entry: &mut StudentEntry) {
        if self.is_empty() {
            return;
        }

        for session in &mut entry.weekly_schedule {
            let mut subject = self.fix_subject(&session.subject);
            let is_lab = self
                .lab_suffix_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && subject.starts_with(prefix.as_str()));
            if is_lab && !subject.trim_end().ends_with("Lab") {
                subject = format!("{}{LAB_SUFFIX}", subject.trim_end());
            }
            session.subject = subject;
        }

        for exam in &mut entry.exam_schedule {
            exam.subject = self.fix_subject(&exam.subject);
        }
    }
}
