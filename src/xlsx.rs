use crate::table::{Table, TableCell};
use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::path::Path;

pub const SHEET_NAME: &str = "Seating Chart";

const LABEL_COLUMN_WIDTH: f64 = 12.0;
const SEAT_COLUMN_WIDTH: f64 = 15.0;
const ROW_HEIGHT: f64 = 25.0;

fn data_to_cell(data: &Data) -> TableCell {
    match data {
        Data::Empty => TableCell::Empty,
        Data::String(s) => TableCell::Text(s.clone()),
        Data::Int(i) => TableCell::Number(*i as f64),
        Data::Float(f) => TableCell::Number(*f),
        Data::Bool(b) => TableCell::Text(b.to_string()),
        Data::DateTime(dt) => TableCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => TableCell::Text(s.clone()),
        Data::Error(_) => TableCell::Empty,
    }
}

/// Reads the first worksheet of an `.xlsx`/`.xls`/`.xlsb`/`.ods` file.
///
/// Cells keep their sheet coordinates: a sheet whose data starts at `B3`
/// still yields two leading empty rows and one leading empty column.
pub fn read_table(path: &Path) -> anyhow::Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.to_string_lossy()))?;
    let Some(first) = workbook.sheet_names().first().cloned() else {
        return Err(anyhow!("workbook has no worksheets"));
    };
    let range = workbook
        .worksheet_range(&first)
        .with_context(|| format!("failed to read worksheet {}", first))?;

    let (top, left) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<TableCell>> = vec![Vec::new(); top];
    for row in range.rows() {
        let mut cells = vec![TableCell::Empty; left];
        cells.extend(row.iter().map(data_to_cell));
        while matches!(cells.last(), Some(TableCell::Empty)) {
            cells.pop();
        }
        rows.push(cells);
    }
    Ok(Table::new(rows))
}

/// Writes `table` as a single-sheet workbook sized for a seating chart.
pub fn write_table(table: &Table, path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(SHEET_NAME)
        .context("failed to name worksheet")?;

    let wrap = Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let width = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    for col in 0..width {
        let col = u16::try_from(col).context("column index overflow")?;
        let w = if col == 0 {
            LABEL_COLUMN_WIDTH
        } else {
            SEAT_COLUMN_WIDTH
        };
        sheet
            .set_column_width(col, w)
            .context("failed to set column width")?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(r).context("row index overflow")?;
        sheet
            .set_row_height(r, ROW_HEIGHT)
            .context("failed to set row height")?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c).context("column index overflow")?;
            match cell {
                TableCell::Empty => {}
                TableCell::Text(s) => {
                    sheet
                        .write_string_with_format(r, c, s, &wrap)
                        .with_context(|| format!("failed to write cell {}:{}", r, c))?;
                }
                TableCell::Number(n) => {
                    sheet
                        .write_number(r, c, *n)
                        .with_context(|| format!("failed to write cell {}:{}", r, c))?;
                }
            }
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("failed to save workbook {}", path.to_string_lossy()))?;
    Ok(())
}
