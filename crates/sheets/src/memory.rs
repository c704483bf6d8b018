//! In-memory spreadsheet fake.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{SheetsError, SheetsResult};
use crate::gateway::{Row, SheetProperties, SheetsApi, SpreadsheetMeta};

/// In-memory [`SheetsApi`] with the same observable semantics as the real
/// values/batchUpdate endpoints, including their failure modes (duplicate
/// sheet titles, writes to a missing sheet).
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemorySheets {
    title: String,
    state: RwLock<SheetsState>,
}

#[derive(Debug, Default)]
struct SheetsState {
    sheets: Vec<Sheet>,
    next_id: i64,
}

#[derive(Debug)]
struct Sheet {
    id: i64,
    title: String,
    rows: Vec<Row>,
}

impl InMemorySheets {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: RwLock::new(SheetsState::default()),
        }
    }

    /// Raw rows of a sheet, header included. Test inspection helper.
    pub fn rows(&self, title: &str) -> Option<Vec<Row>> {
        self.read_state()
            .sheets
            .iter()
            .find(|sheet| sheet.title == title)
            .map(|sheet| sheet.rows.clone())
    }

    pub fn sheet_titles(&self) -> Vec<String> {
        self.read_state()
            .sheets
            .iter()
            .map(|sheet| sheet.title.clone())
            .collect()
    }

    // State stays well formed across panics (mutations are single push or
    // splice steps), so a poisoned guard is still usable.
    fn read_state(&self) -> RwLockReadGuard<'_, SheetsState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SheetsState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SheetsApi for InMemorySheets {
    async fn spreadsheet_meta(&self) -> SheetsResult<SpreadsheetMeta> {
        let state = self.read_state();
        Ok(SpreadsheetMeta {
            title: self.title.clone(),
            sheets: state
                .sheets
                .iter()
                .map(|sheet| SheetProperties {
                    title: sheet.title.clone(),
                    sheet_id: sheet.id,
                })
                .collect(),
        })
    }

    async fn add_sheet(&self, title: &str) -> SheetsResult<()> {
        let mut state = self.write_state();
        if state.sheets.iter().any(|sheet| sheet.title == title) {
            return Err(SheetsError::Api(
                400,
                format!("A sheet with the name \"{title}\" already exists"),
            ));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.sheets.push(Sheet {
            id,
            title: title.to_string(),
            rows: Vec::new(),
        });
        Ok(())
    }

    async fn delete_rows(&self, sheet_id: i64, start: i64, end: i64) -> SheetsResult<()> {
        let mut state = self.write_state();
        let sheet = state
            .sheets
            .iter_mut()
            .find(|sheet| sheet.id == sheet_id)
            .ok_or_else(|| SheetsError::Api(400, format!("No sheet with id: {sheet_id}")))?;
        let start = (start.max(0) as usize).min(sheet.rows.len());
        let end = (end.max(0) as usize).min(sheet.rows.len());
        if start < end {
            sheet.rows.drain(start..end);
        }
        Ok(())
    }

    async fn put_values(&self, range: &str, rows: Vec<Row>) -> SheetsResult<()> {
        let (title, cells) = split_range(range)?;
        let start_row = row_number(cells)
            .ok_or_else(|| SheetsError::Api(400, format!("Unable to parse range: {range}")))?;

        let mut state = self.write_state();
        let sheet = find_sheet(&mut state, title)?;
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start_row - 1 + offset;
            if sheet.rows.len() <= index {
                sheet.rows.resize(index + 1, Row::new());
            }
            sheet.rows[index] = row;
        }
        Ok(())
    }

    async fn append_values(&self, sheet: &str, rows: Vec<Row>) -> SheetsResult<()> {
        let mut state = self.write_state();
        let sheet = find_sheet(&mut state, sheet)?;
        sheet.rows.extend(rows);
        Ok(())
    }

    async fn get_values(&self, range: &str) -> SheetsResult<Vec<Row>> {
        let (title, cells) = split_range(range)?;
        let state = self.read_state();
        let sheet = state
            .sheets
            .iter()
            .find(|sheet| sheet.title == title)
            .ok_or_else(|| SheetsError::Api(400, format!("Unable to parse range: {range}")))?;

        match row_number(cells) {
            // A column read, e.g. "A:A": one single-cell row per stored row.
            None => Ok(sheet
                .rows
                .iter()
                .map(|row| row.first().cloned().map(|cell| vec![cell]).unwrap_or_default())
                .collect()),
            Some(row) => Ok(sheet.rows.get(row - 1).cloned().into_iter().collect()),
        }
    }
}

fn split_range(range: &str) -> SheetsResult<(&str, &str)> {
    range
        .split_once('!')
        .ok_or_else(|| SheetsError::Api(400, format!("Unable to parse range: {range}")))
}

/// First row addressed by a cell range: `"A2:M2"` is row 2, `"A:A"` spans
/// the whole column and has none.
fn row_number(cells: &str) -> Option<usize> {
    let first = cells.split(':').next()?;
    let digits: String = first.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|row| *row >= 1)
}

fn find_sheet<'a>(state: &'a mut SheetsState, title: &str) -> SheetsResult<&'a mut Sheet> {
    state
        .sheets
        .iter_mut()
        .find(|sheet| sheet.title == title)
        .ok_or_else(|| SheetsError::Api(400, format!("Unable to parse range: {title}")))
}
