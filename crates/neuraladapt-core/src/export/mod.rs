//! Spreadsheet export: one `.xlsx` workbook per plan, with a `Summary`
//! sheet and a `Sessions` sheet.

mod rows;

pub use rows::{
    CellValue, SESSION_COLUMNS, SUMMARY_COLUMNS, SessionRow, SummaryRow, session_rows,
    summary_rows,
};

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::workout::WorkoutPlan;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create artifact directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
}

/// Write the workbook to `{artifact_dir}/{artifact_id}.xlsx`, creating the
/// directory if needed. Returns the written path.
pub fn export_plan(
    plan: &WorkoutPlan,
    artifact_dir: &Path,
    artifact_id: &str,
) -> Result<PathBuf, ExportError> {
    let path = artifact_dir.join(format!("{artifact_id}.xlsx"));
    write_workbook(plan, &path)?;
    Ok(path)
}

/// Write the workbook to an explicit path, creating parent directories.
pub fn write_workbook(plan: &WorkoutPlan, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut workbook = build_workbook(plan)?;
    workbook.save(path)?;

    info!(path = %path.display(), program = %plan.program_name, "wrote plan workbook");
    Ok(())
}

fn build_workbook(plan: &WorkoutPlan) -> Result<Workbook, XlsxError> {
    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    write_headers(summary, &SUMMARY_COLUMNS, &bold)?;
    for (i, row) in summary_rows(plan).iter().enumerate() {
        let r = sheet_row(i)?;
        if row.bold {
            summary.write_string_with_format(r, 0, &row.key, &bold)?;
            summary.write_string_with_format(r, 1, &row.value, &bold)?;
        } else {
            summary.write_string(r, 0, &row.key)?;
            summary.write_string(r, 1, &row.value)?;
        }
    }

    let sessions = workbook.add_worksheet();
    sessions.set_name("Sessions")?;
    write_headers(sessions, &SESSION_COLUMNS, &bold)?;
    for (i, row) in session_rows(plan).iter().enumerate() {
        let r = sheet_row(i)?;
        sessions.write_number(r, 0, f64::from(row.week))?;
        sessions.write_string(r, 1, &row.day)?;
        sessions.write_string(r, 2, &row.emphasis)?;
        sessions.write_number(r, 3, f64::from(row.session_minutes))?;
        sessions.write_string(r, 4, &row.lift)?;
        write_cell(sessions, r, 5, &row.sets)?;
        write_cell(sessions, r, 6, &row.reps)?;
        sessions.write_string(r, 7, &row.intensity)?;
        write_cell(sessions, r, 8, &row.rest)?;
        sessions.write_string(r, 9, &row.notes)?;
    }

    Ok(workbook)
}

/// Data rows start below the header row.
fn sheet_row(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index + 1).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_headers(
    sheet: &mut Worksheet,
    columns: &[(&str, f64)],
    bold: &Format,
) -> Result<(), XlsxError> {
    for (col, (header, width)) in (0u16..).zip(columns) {
        sheet.set_column_width(col, *width)?;
        sheet.write_string_with_format(0, col, *header, bold)?;
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<(), XlsxError> {
    match value {
        // Spreadsheet numbers are doubles; prescriptions never approach 2^53.
        CellValue::Number(n) => sheet.write_number(row, col, *n as f64)?,
        CellValue::Text(s) => sheet.write_string(row, col, s)?,
    };
    Ok(())
}
