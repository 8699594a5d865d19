use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::history::{state_label, HistoryData};
use crate::selection::SelectionState;
use crate::table::{materialize_all, Cell};

pub struct ExportReport {
    pub path: PathBuf,
    pub states: usize,
    pub dates: usize,
}

pub fn default_export_path() -> PathBuf {
    PathBuf::from(format!(
        "svs-history-{}.xlsx",
        Utc::now().format("%Y%m%d-%H%M%S")
    ))
}

/// Writes the current table to an .xlsx workbook: every included row
/// (not just the visible page), three columns per selected date.
pub fn export_table(
    data: &HistoryData,
    selection: &SelectionState,
    path: &Path,
) -> Result<ExportReport> {
    let view = materialize_all(data, selection);

    let mut rows = Vec::with_capacity(view.rows.len() + 1);
    let mut header = vec!["State".to_string()];
    for date in &view.columns {
        header.push(format!("{date} Prep"));
        header.push(format!("{date} Castle"));
        header.push(format!("{date} Opponent"));
    }
    rows.push(header);

    for row in &view.rows {
        let mut cells = vec![state_label(&row.state)];
        for cell in &row.cells {
            match cell {
                Cell::NoData => {
                    cells.push("No Data".to_string());
                    cells.push(String::new());
                    cells.push(String::new());
                }
                Cell::NoMatch => {
                    cells.push("No Match".to_string());
                    cells.push(String::new());
                    cells.push(String::new());
                }
                Cell::Played {
                    prep,
                    castle,
                    opposition,
                } => {
                    cells.push(prep.label().to_string());
                    cells.push(castle.label().to_string());
                    cells.push(opposition.label().to_string());
                }
            }
        }
        rows.push(cells);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("SvS History")?;
        write_rows(sheet, &rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        states: view.rows.len(),
        dates: view.columns.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
