use alloc::vec::Vec;
use core::cmp::Ordering;

use super::NoteData;
use crate::{FELT_BYTES, Felt, FieldDecodingError, NoteError, StarkField, fields::felt_to_be_bytes};

// PROPERTY SELECTOR
// ================================================================================================

/// Selects a byte range of one note item.
///
/// `offset` is counted in bytes from the least significant end of the item's big-endian
/// encoding, so `offset = 0, length = 8` selects the whole item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySelector {
    pub index: usize,
    pub offset: usize,
    pub length: usize,
}

impl PropertySelector {
    pub const fn new(index: usize, offset: usize, length: usize) -> Self {
        Self { index, offset, length }
    }

    /// Selects the whole item at `index`.
    pub const fn item(index: usize) -> Self {
        Self { index, offset: 0, length: FELT_BYTES }
    }

    /// Extracts the selected property of `items` as an integer.
    pub fn extract(&self, items: &[Felt]) -> Result<u64, NoteError> {
        let item = items.get(self.index).ok_or(NoteError::SelectorIndexOutOfBounds {
            index: self.index,
            num_items: items.len(),
        })?;

        if self.offset + self.length > FELT_BYTES {
            return Err(NoteError::SelectorRangeOutOfBounds {
                offset: self.offset,
                length: self.length,
                max: FELT_BYTES,
            });
        }

        let bytes = felt_to_be_bytes(*item);
        let end = FELT_BYTES - self.offset;
        let start = end - self.length;
        Ok(bytes[start..end].iter().fold(0u64, |acc, byte| (acc << 8) | *byte as u64))
    }
}

// SELECT & SORT
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq = 1,
    Neq = 2,
    Lt = 3,
    Lte = 4,
    Gt = 5,
    Gte = 6,
}

impl Comparator {
    /// Returns true if `note_value <op> value` holds.
    pub fn compare(&self, note_value: u64, value: u64) -> bool {
        match self {
            Self::Eq => note_value == value,
            Self::Neq => note_value != value,
            Self::Lt => note_value < value,
            Self::Lte => note_value <= value,
            Self::Gt => note_value > value,
            Self::Gte => note_value >= value,
        }
    }
}

impl TryFrom<Felt> for Comparator {
    type Error = FieldDecodingError;

    fn try_from(value: Felt) -> Result<Self, Self::Error> {
        match value.as_int() {
            1 => Ok(Self::Eq),
            2 => Ok(Self::Neq),
            3 => Ok(Self::Lt),
            4 => Ok(Self::Lte),
            5 => Ok(Self::Gt),
            6 => Ok(Self::Gte),
            value => Err(FieldDecodingError::InvalidDiscriminant { kind: "comparator", value }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Select {
    pub selector: PropertySelector,
    pub value: Felt,
    pub comparator: Comparator,
}

/// Sort direction. `Nada` terminates the list of sort criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Nada = 0,
    Desc = 1,
    Asc = 2,
}

impl TryFrom<Felt> for SortOrder {
    type Error = FieldDecodingError;

    fn try_from(value: Felt) -> Result<Self, Self::Error> {
        match value.as_int() {
            0 => Ok(Self::Nada),
            1 => Ok(Self::Desc),
            2 => Ok(Self::Asc),
            value => Err(FieldDecodingError::InvalidDiscriminant { kind: "sort order", value }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub selector: PropertySelector,
    pub order: SortOrder,
}

// NOTE FILTER
// ================================================================================================

/// Criteria applied to the candidate notes of a read.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NoteFilter {
    pub selects: Vec<Select>,
    pub sorts: Vec<Sort>,
    /// Maximum number of notes returned. Zero means unlimited.
    pub limit: usize,
    pub offset: usize,
}

impl NoteFilter {
    pub fn with_select(mut self, select: Select) -> Self {
        self.selects.push(select);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Applies `filter` to `notes`: drops notes failing any select, orders the rest by the sort
/// criteria (stable, so ties keep their input order), then skips `offset` notes and keeps at
/// most `limit`.
pub fn pick_notes(notes: Vec<NoteData>, filter: &NoteFilter) -> Result<Vec<NoteData>, NoteError> {
    let mut selected = Vec::with_capacity(notes.len());
    for note in notes {
        if matches_all(&note, &filter.selects)? {
            selected.push(note);
        }
    }

    let sorts: Vec<Sort> =
        filter.sorts.iter().copied().take_while(|sort| sort.order != SortOrder::Nada).collect();

    if !sorts.is_empty() {
        // extract sort keys up front so that malformed selectors surface as errors
        let mut keyed = Vec::with_capacity(selected.len());
        for note in selected {
            let keys = sorts
                .iter()
                .map(|sort| sort.selector.extract(note.note.items()))
                .collect::<Result<Vec<_>, _>>()?;
            keyed.push((keys, note));
        }
        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &sorts));
        selected = keyed.into_iter().map(|(_, note)| note).collect();
    }

    let limit = if filter.limit == 0 { usize::MAX } else { filter.limit };
    Ok(selected.into_iter().skip(filter.offset).take(limit).collect())
}

fn matches_all(note: &NoteData, selects: &[Select]) -> Result<bool, NoteError> {
    for select in selects {
        let note_value = select.selector.extract(note.note.items())?;
        if !select.comparator.compare(note_value, select.value.as_int()) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare_keys(a: &[u64], b: &[u64], sorts: &[Sort]) -> Ordering {
    for ((a, b), sort) in a.iter().zip(b).zip(sorts) {
        let ordering = match sort.order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
            SortOrder::Nada => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// TESTS
// ================================================================================================
