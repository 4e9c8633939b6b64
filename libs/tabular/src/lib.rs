//! Tabular document formatting for the roster directory server.
//!
//! A [`Sheet`] is an in-memory table (header row + typed cells) that can be
//! rendered to a CSV byte stream, a styled spreadsheet workbook, or a PDF
//! listing. The reverse direction is deliberately narrow: [`read_text_column`]
//! pulls the first column of a named worksheet out of an uploaded workbook,
//! which is all the bulk-import path needs.
//!
//! Documents are built and parsed entirely in memory, so callers should cap
//! upload and export sizes before reaching this crate.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Color, Format, Workbook};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook write error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("workbook read error: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),
    #[error("PDF render error: {0}")]
    Pdf(String),
}

/// A single table cell. `Empty` renders as a blank field in every format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Plain-text rendering used by the CSV and PDF writers.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// An in-memory table: one header row plus zero or more data rows.
///
/// Rows shorter than the header are padded with blanks on output; rows are
/// never truncated.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Render the sheet as a CSV byte stream: header row first, then one
    /// record per data row.
    pub fn to_csv(&self) -> Result<Vec<u8>, TabularError> {
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            writer.write_record(&self.columns)?;
            for row in &self.rows {
                let mut record: Vec<String> = row.iter().map(Cell::render).collect();
                while record.len() < self.columns.len() {
                    record.push(String::new());
                }
                writer.write_record(&record)?;
            }
            writer.flush()?;
        }
        Ok(buf)
    }

    /// Render the sheet as an `.xlsx` workbook with a bold, filled header row
    /// and autofit columns.
    pub fn to_workbook(&self, sheet_name: &str) -> Result<Vec<u8>, TabularError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        let header = Format::new().set_bold().set_background_color(Color::Silver);
        for (col, name) in self.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name.as_str(), &header)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            let row_num = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let col_num = c as u16;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(row_num, col_num, s.as_str())?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row_num, col_num, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        worksheet.autofit();
        Ok(workbook.save_to_buffer()?)
    }

    /// Render the sheet as a landscape A4 PDF listing.
    ///
    /// Columns share the printable width evenly and long values are clipped
    /// to their column; the listing flows onto additional pages as needed.
    pub fn to_pdf(&self, title: &str) -> Result<Vec<u8>, TabularError> {
        use printpdf::{BuiltinFont, Mm, PdfDocument};

        const PAGE_WIDTH: f32 = 297.0;
        const PAGE_HEIGHT: f32 = 210.0;
        const MARGIN: f32 = 20.0;
        const ROW_STEP: f32 = 5.5;

        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "listing");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| TabularError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| TabularError::Pdf(e.to_string()))?;

        let columns = self.columns.len().max(1);
        let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
        // Rough character budget per column at the 9pt body size.
        let max_chars = ((col_width / 1.8) as usize).max(4);

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;

        current.use_text(title, 14.0, Mm(MARGIN), Mm(y), &bold);
        y -= 10.0;

        for (i, name) in self.columns.iter().enumerate() {
            let x = MARGIN + i as f32 * col_width;
            current.use_text(clipped(name, max_chars), 9.0, Mm(x), Mm(y), &bold);
        }
        y -= ROW_STEP + 1.5;

        for row in &self.rows {
            if y < MARGIN {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "listing");
                current = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT - MARGIN;
            }
            for (i, cell) in row.iter().enumerate() {
                let x = MARGIN + i as f32 * col_width;
                current.use_text(clipped(&cell.render(), max_chars), 9.0, Mm(x), Mm(y), &font);
            }
            y -= ROW_STEP;
        }

        doc.save_to_bytes()
            .map_err(|e| TabularError::Pdf(e.to_string()))
    }
}

fn clipped(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Read the first column of the named worksheet from `.xlsx` bytes.
///
/// The first row is treated as a header and skipped. Empty and
/// whitespace-only cells are dropped; non-text cells are rendered through
/// their display form. Returns [`TabularError::MissingSheet`] when the
/// workbook has no worksheet with the given name.
pub fn read_text_column(bytes: &[u8], sheet_name: &str) -> Result<Vec<String>, TabularError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(TabularError::MissingSheet(sheet_name.to_string()));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut values = Vec::new();
    for row in range.rows().skip(1) {
        let Some(cell) = row.first() else { continue };
        let text = match cell {
            Data::Empty => continue,
            Data::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        };
        if !text.is_empty() {
            values.push(text);
        }
    }
    Ok(values)
}
