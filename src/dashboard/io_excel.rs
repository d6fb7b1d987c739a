// Reading vote records from Excel workbooks.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::{debug, info};
use snafu::prelude::*;
use crate::dashboard::{
    io_common::{check_headers, RawVoteRow, ReadVotes},
    *,
};

pub fn read_excel_votes(path: &Path, worksheet: Option<&str>) -> DashboardResult<ReadVotes> {
    let p = path.display().to_string();
    debug!("read_excel_votes: path: {:?} worksheet: {:?}", &p, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path: p.clone() })?;

    let wrange = match worksheet {
        // A worksheet name was provided, use it.
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu {
                name,
                path: p.clone(),
            })?
            .context(OpeningExcelSnafu { path: p.clone() })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path: p.clone() })?
            .context(OpeningExcelSnafu { path: p.clone() })?,
    };
    info!(
        "read_excel_votes: {:?}: {} rows",
        &p,
        wrange.height().saturating_sub(1)
    );
    records_from_range(&wrange, &p)
}

/// Interprets a worksheet whose first row is the header.
/// Records are numbered with their row in the worksheet, starting at 1.
pub fn records_from_range(wrange: &Range<DataType>, path: &str) -> DashboardResult<ReadVotes> {
    // The range starts at the first non-empty cell of the worksheet.
    let header_row = wrange.start().map(|(r, _)| r as u64 + 1).unwrap_or(1);
    let mut rows = wrange.rows();
    let header: Vec<String> = rows
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| read_cell(c).trim().to_string())
        .collect();
    check_headers(header.iter().map(|s| s.as_str()))?;

    let mut res = ReadVotes::default();
    for (idx, row) in rows.enumerate() {
        let lineno = header_row + 1 + idx as u64;
        let values: Vec<String> = row.iter().map(read_cell).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            debug!("records_from_range: skipping empty row {:?}", lineno);
            continue;
        }
        let cells: HashMap<&str, String> = header
            .iter()
            .map(|h| h.as_str())
            .zip(values.into_iter())
            .collect();
        let raw = RawVoteRow::from_named_cells(&cells);
        debug!("records_from_range: lineno: {:?} row: {:?}", lineno, &raw);
        res.push(lineno, raw.into_record(lineno)?);
    }
    Ok(res)
}

/// The textual content of a cell, as it would have been exported to CSV.
fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        // Identifiers are often stored as numbers.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => {
            if *b {
                "True".to_string()
            } else {
                "False".to_string()
            }
        }
        x => x.to_string(),
    }
}
