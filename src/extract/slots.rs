use anyhow::{Result, bail};

/// Hours below this are read as afternoon times recorded without AM/PM.
///
/// Classes run 8:00-17:30, so "2:00" means 14:00. A genuine early-morning or
/// midnight session would be misplaced; the policy is kept for compatibility
/// with existing indexes.
pub const AFTERNOON_CUTOFF_HOUR: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Parses a header label such as `8:00-9:30`, `8:00 - 9:30`, `8:00\n-9:30` or `8:00–9:30`.
    pub fn parse_label(label: &str) -> Option<Self> {
        let compact = label
            .chars()
            .filter(|character| !character.is_whitespace())
            .collect::<String>()
            .replace('–', "-");
        let (start, end) = compact.split_once('-')?;
        if parse_clock(start).is_none() || parse_clock(end).is_none() {
            return None;
        }
        Some(Self::new(start, end))
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

fn parse_clock(time: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = time.trim().split_once(':')?;
    let hours = hours.parse::<u32>().ok()?;
    let minutes = minutes.parse::<u32>().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some((hours, minutes))
}

/// Minutes since midnight after applying the afternoon rule.
pub fn resolved_minutes(time: &str) -> Option<u32> {
    let (mut hours, minutes) = parse_clock(time)?;
    if hours < AFTERNOON_CUTOFF_HOUR {
        hours += 12;
    }
    Some(hours * 60 + minutes)
}

/// The institution's fixed, ordered list of class periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    slots: Vec<TimeSlot>,
}

impl SlotTable {
    pub fn regular() -> Self {
        Self::from_pairs(&[
            ("8:00", "9:30"),
            ("9:30", "11:00"),
            ("11:00", "12:30"),
            ("12:30", "2:00"),
            ("2:00", "3:30"),
            ("3:30", "5:00"),
        ])
    }

    pub fn ramadan() -> Self {
        Self::from_pairs(&[
            ("8:00", "9:05"),
            ("9:10", "10:15"),
            ("10:20", "11:25"),
            ("11:30", "12:35"),
            ("12:40", "1:45"),
            ("2:00", "3:05"),
            ("3:10", "4:15"),
            ("4:15", "5:10"),
        ])
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            slots: pairs
                .iter()
                .map(|(start, end)| TimeSlot::new(start, end))
                .collect(),
        }
    }

    /// Parses a comma-separated list of `start-end` labels.
    pub fn parse(labels: &str) -> Result<Self> {
        let mut slots = Vec::new();
        for label in labels.split(',').map(str::trim).filter(|label| !label.is_empty()) {
            match TimeSlot::parse_label(label) {
                Some(slot) => slots.push(slot),
                None => bail!("invalid time slot label: {label}"),
            }
        }
        if slots.is_empty() {
            bail!("time slot list is empty");
        }
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    /// Position of the slot starting at `start`; `14:00` and `2:00` are the same start.
    pub fn position_of_start(&self, start: &str) -> Option<usize> {
        let wanted = resolved_minutes(start)?;
        self.slots
            .iter()
            .position(|slot| resolved_minutes(&slot.start) == Some(wanted))
    }

    /// For each slot of `self`, the position of its counterpart in `target`.
    ///
    /// Slots pair up by position, re-aligned wherever both tables share a
    /// start time: regular `2:00` maps to ramadan `2:00`, skipping the extra
    /// `12:40` period.
    pub fn counterparts_in(&self, target: &SlotTable) -> Vec<Option<usize>> {
        let mut next = 0usize;
        self.slots
            .iter()
            .map(|slot| {
                if let Some(shared) = target.position_of_start(&slot.start)
                    && shared >= next
                {
                    next = shared;
                }
                let mapped = (next < target.slots.len()).then_some(next);
                next += 1;
                mapped
            })
            .collect()
    }

    /// Locates the slot labels in a block's header line. `None` when fewer
    /// than two are present, in which case the block cannot be mapped.
    pub fn column_boundaries(&self, header_line: &str) -> Option<ColumnBoundaries> {
        let mut columns = Vec::<(usize, usize)>::new();
        for (slot_index, slot) in self.slots.iter().enumerate() {
            let offset = find_label_offset(header_line, &slot.label())
                .or_else(|| find_label_offset(header_line, &slot.start));
            if let Some(offset) = offset {
                if !columns.iter().any(|(existing, _)| *existing == offset) {
                    columns.push((offset, slot_index));
                }
            }
        }

        if columns.len() < 2 {
            return None;
        }
        columns.sort();
        Some(ColumnBoundaries { columns })
    }

    pub fn count_labels(&self, line: &str) -> usize {
        self.slots
            .iter()
            .filter(|slot| find_label_offset(line, &slot.label()).is_some())
            .count()
    }
}

/// Character offset of `label` in `line`. Hits glued to a preceding digit or
/// dash are skipped, so `8:00` does not match inside `18:00` and `12:30` does
/// not match the end of `11:00-12:30`.
fn find_label_offset(line: &str, label: &str) -> Option<usize> {
    line.match_indices(label)
        .find(|(byte_index, _)| {
            !line[..*byte_index]
                .chars()
                .next_back()
                .is_some_and(|previous| previous.is_ascii_digit() || previous == '-' || previous == '–')
        })
        .map(|(byte_index, _)| line[..byte_index].chars().count())
}

/// Left boundaries (character offsets) of the time-slot columns in layout text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBoundaries {
    /// `(offset, slot index)`, sorted by offset.
    columns: Vec<(usize, usize)>,
}

impl ColumnBoundaries {
    pub fn first_offset(&self) -> usize {
        self.columns.first().map(|(offset, _)| *offset).unwrap_or(0)
    }

    /// Slot index for text starting at `offset`. Text left of the first
    /// boundary belongs to the first column, text at or past the last
    /// boundary to the last one.
    pub fn column_for(&self, offset: usize) -> usize {
        let mut slot = self.columns.first().map(|(_, slot)| *slot).unwrap_or(0);
        for (boundary, slot_index) in &self.columns {
            if offset >= *boundary {
                slot = *slot_index;
            } else {
                break;
            }
        }
        slot
    }
}
