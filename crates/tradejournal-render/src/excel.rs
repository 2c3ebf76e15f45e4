//! Excel journal renderer
//!
//! Serializes a [`JournalLayout`] into a single-sheet XLSX workbook:
//! - Header row with column widths, frozen in place
//! - Date header, data, and summary rows with their fills and heights
//! - Merged blocks (slot cells, reason span, screenshot area, summaries)
//! - Dropdown lists on categorical and time cells
//! - Conditional fills on data rows, first matching rule wins
//!
//! Derived cells are written as formulas, so balances and drawdowns update
//! live as the trader fills in results.
//!
//! ## Example Output Structure
//!
//! ```text
//! | Time Slot | Entry | Exit | Signal | ... | Result(R) | Cum. Result | Balance | ...
//! |-----------|-------|------|--------|-----|-----------|-------------|---------|-----
//! |            Monday 2025-04-28  (merged 1..27)                                     |
//! | 18:30     |       |      |        |     | 0         | =T3         | =IF(..) |
//! |           |       |      |        |     | 0         | =U3+T4      | =IF(..) |
//! | ...
//! | Daily Summary     | ...                  | =SUM(T3:T10) | =U10     | =W10    |
//! ```

use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, ConditionalFormatFormula, DataValidation,
    Format, FormatAlign, Workbook, Worksheet,
};
use tracing::{debug, info};
use tradejournal_core::highlight::{Comparison, HighlightCondition, Tone};
use tradejournal_core::{
    col, CellValue, HighlightRule, JournalLayout, RenderError, Renderer, RowKind, Validation,
    COLUMNS, COLUMN_COUNT,
};

/// Excel journal renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Font used by header, date and summary rows
    pub font_name: String,
    /// Worksheet name
    pub sheet_name: String,
    /// Whether to install conditional fills on data rows
    pub include_highlights: bool,
    /// Whether to install dropdown lists on data rows
    pub include_dropdowns: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            font_name: "Dana".into(),
            sheet_name: "Trading Journal".into(),
            include_highlights: true,
            include_dropdowns: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font of styled rows
    pub fn font(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Set the worksheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Skip conditional fills (plain template)
    pub fn no_highlights(mut self) -> Self {
        self.include_highlights = false;
        self
    }

    /// Skip dropdown lists
    pub fn no_dropdowns(mut self) -> Self {
        self.include_dropdowns = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, layout: &JournalLayout) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.sheet_name)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        for (idx, column) in COLUMNS.iter().enumerate() {
            sheet.set_column_width(idx as u16, column.width.width()).ok();
        }

        for row in &layout.rows {
            let row0 = row.number - 1;
            if let Some(height) = row.kind.height() {
                sheet.set_row_height(row0, height).ok();
            }
            let columns = match row.kind {
                RowKind::DateHeader => 1..=1,
                _ => 1..=COLUMN_COUNT,
            };
            for column in columns {
                let format = formats.get(cell_style(row.kind, column));
                write_cell(sheet, row0, column - 1, row.cells.get(&column), format)?;
            }
        }

        write_merges(sheet, layout, &formats)?;

        if self.include_dropdowns {
            for validation in &layout.validations {
                add_dropdown(sheet, validation)?;
            }
        }

        if self.include_highlights {
            for rule in &layout.highlights {
                add_highlight(sheet, rule, &formats)?;
            }
        }

        sheet.set_freeze_panes(1, 0).ok();

        debug!(
            merges = layout.merges.len(),
            validations = layout.validations.len(),
            highlights = layout.highlights.len(),
            "worksheet populated"
        );

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        info!(bytes = buffer.len(), rows = layout.rows.len(), "workbook rendered");
        Ok(buffer)
    }

    /// Create reusable formats
    fn create_formats(&self) -> JournalFormats {
        let font = self.font_name.as_str();
        let centered = || {
            Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
        };

        let header = centered()
            .set_bold()
            .set_font_name(font)
            .set_background_color(0xCCE5FF)
            .set_text_wrap()
            .set_reading_direction(2);

        let date_header = centered()
            .set_bold()
            .set_font_name(font)
            .set_font_size(14)
            .set_font_color(0xFFFFFF)
            .set_background_color(0x4169E1);

        let summary = |fill: u32| {
            centered()
                .set_bold()
                .set_font_name(font)
                .set_text_wrap()
                .set_background_color(fill)
        };

        let data = |shaded: bool| {
            let base = if shaded {
                centered().set_background_color(0xF5F5F5)
            } else {
                centered()
            };
            DataFormats {
                plain: base.clone(),
                wrapped: base.clone().set_text_wrap(),
                time: base.set_num_format("hh:mm"),
            }
        };

        JournalFormats {
            header,
            date_header,
            data_plain: data(false),
            data_shaded: data(true),
            daily: summary(0xE6E6FA),
            weekly: summary(0x4682B4).set_font_color(0xFFFFFF),
            monthly: summary(0x87CEEB),
            positive: Format::new().set_background_color(Tone::Positive.fill_color()),
            negative: Format::new().set_background_color(Tone::Negative.fill_color()),
        }
    }
}

/// Merge each block, then restore the value of its top-left cell
fn write_merges(
    sheet: &mut Worksheet,
    layout: &JournalLayout,
    formats: &JournalFormats,
) -> Result<(), RenderError> {
    for range in &layout.merges {
        let Some(row) = layout.row(range.first_row) else {
            return Err(RenderError::InvalidData(format!(
                "merge starts on missing row {}",
                range.first_row
            )));
        };
        let format = formats.get(cell_style(row.kind, range.first_col));
        sheet
            .merge_range(
                range.first_row - 1,
                range.first_col - 1,
                range.last_row - 1,
                range.last_col - 1,
                "",
                format,
            )
            .map_err(|e| RenderError::Format(e.to_string()))?;
        if let Some(value) = row.cells.get(&range.first_col) {
            write_cell(sheet, range.first_row - 1, range.first_col - 1, Some(value), format)?;
        }
    }
    Ok(())
}

/// Which precreated format a cell uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellStyle {
    Header,
    DateHeader,
    Data { shaded: bool, content: DataContent },
    DailySummary,
    WeeklySummary,
    MonthlySummary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DataContent {
    Plain,
    Wrapped,
    Time,
}

fn cell_style(kind: RowKind, column: u16) -> CellStyle {
    match kind {
        RowKind::Header => CellStyle::Header,
        RowKind::DateHeader => CellStyle::DateHeader,
        RowKind::Data { shaded } => {
            let content = match column {
                col::ENTRY_TIME | col::EXIT_TIME => DataContent::Time,
                col::REASON_FIRST..=col::PLAN_ADHERENCE => DataContent::Wrapped,
                _ => DataContent::Plain,
            };
            CellStyle::Data { shaded, content }
        }
        RowKind::DailySummary => CellStyle::DailySummary,
        RowKind::WeeklySummary => CellStyle::WeeklySummary,
        RowKind::MonthlySummary => CellStyle::MonthlySummary,
    }
}

struct DataFormats {
    plain: Format,
    wrapped: Format,
    time: Format,
}

/// Reusable formats for the journal sheet
struct JournalFormats {
    header: Format,
    date_header: Format,
    data_plain: DataFormats,
    data_shaded: DataFormats,
    daily: Format,
    weekly: Format,
    monthly: Format,
    positive: Format,
    negative: Format,
}

impl JournalFormats {
    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Header => &self.header,
            CellStyle::DateHeader => &self.date_header,
            CellStyle::Data { shaded, content } => {
                let set = if shaded { &self.data_shaded } else { &self.data_plain };
                match content {
                    DataContent::Plain => &set.plain,
                    DataContent::Wrapped => &set.wrapped,
                    DataContent::Time => &set.time,
                }
            }
            CellStyle::DailySummary => &self.daily,
            CellStyle::WeeklySummary => &self.weekly,
            CellStyle::MonthlySummary => &self.monthly,
        }
    }

    fn fill(&self, tone: Tone) -> &Format {
        match tone {
            Tone::Positive => &self.positive,
            Tone::Negative => &self.negative,
        }
    }
}

/// Write one cell at 0-indexed coordinates; an absent or empty value becomes a styled blank
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    column: u16,
    value: Option<&CellValue>,
    format: &Format,
) -> Result<(), RenderError> {
    let written = match value {
        Some(CellValue::Text(text)) if !text.is_empty() => {
            sheet.write_string_with_format(row, column, text.as_str(), format)
        }
        Some(CellValue::Number(number)) => {
            sheet.write_number_with_format(row, column, *number, format)
        }
        Some(CellValue::Formula(formula)) => {
            sheet.write_formula_with_format(row, column, formula.as_str(), format)
        }
        _ => sheet.write_blank(row, column, format),
    };
    written
        .map(|_| ())
        .map_err(|e| RenderError::Format(e.to_string()))
}

fn add_dropdown(sheet: &mut Worksheet, validation: &Validation) -> Result<(), RenderError> {
    if validation.options.is_empty() {
        return Ok(());
    }
    let options: Vec<&str> = validation.options.iter().map(String::as_str).collect();
    let dropdown = DataValidation::new()
        .allow_list_strings(&options)
        .map_err(|e| RenderError::Format(e.to_string()))?;
    let range = validation.range;
    sheet
        .add_data_validation(
            range.first_row - 1,
            range.first_col - 1,
            range.last_row - 1,
            range.last_col - 1,
            &dropdown,
        )
        .map_err(|e| RenderError::Format(e.to_string()))?;
    Ok(())
}

fn add_highlight(
    sheet: &mut Worksheet,
    rule: &HighlightRule,
    formats: &JournalFormats,
) -> Result<(), RenderError> {
    let (row, column) = (rule.row - 1, rule.col - 1);
    let fill = formats.fill(rule.tone).clone();
    let added = match &rule.condition {
        HighlightCondition::Compare { op, value } => {
            let cell_rule = match op {
                Comparison::GreaterThan => ConditionalFormatCellRule::GreaterThan(*value),
                Comparison::GreaterThanOrEqual => {
                    ConditionalFormatCellRule::GreaterThanOrEqualTo(*value)
                }
                Comparison::LessThan => ConditionalFormatCellRule::LessThan(*value),
            };
            let conditional_format = ConditionalFormatCell::new()
                .set_rule(cell_rule)
                .set_format(fill)
                .set_stop_if_true(true);
            sheet.add_conditional_format(row, column, row, column, &conditional_format)
        }
        HighlightCondition::Text(condition) => {
            let formula = format!("={}", condition.formula(&rule.cell()));
            let conditional_format = ConditionalFormatFormula::new()
                .set_rule(formula.as_str())
                .set_format(fill)
                .set_stop_if_true(true);
            sheet.add_conditional_format(row, column, row, column, &conditional_format)
        }
    };
    added
        .map(|_| ())
        .map_err(|e| RenderError::Format(e.to_string()))
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, layout: &JournalLayout) -> Result<Vec<u8>, RenderError> {
        if layout.data_rows.is_empty() {
            return Err(RenderError::InvalidData("No data rows to render".into()));
        }
        self.render_to_bytes(layout)
    }
}
