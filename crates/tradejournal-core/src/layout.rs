//! Journal layout engine
//!
//! Lays out the whole journal in one top-to-bottom pass:
//!
//! ```text
//! row 1      header
//! row 2      Monday 2025-04-28            <- date header
//! row 3..10  4 slots x 2 sub-rows         <- data rows
//! row 11     Daily Summary
//! ...        Tuesday..Friday
//! row 52     Week 1 (2025-04-28 to 2025-05-02)
//! ...        further weeks
//! last       Monthly Summary
//! ```
//!
//! Derived cells are emitted as formula strings that address other rows by
//! number. The running counters live in a [`LayoutCursor`] that the day,
//! week and month builders advance; a row is never touched again once the
//! cursor has moved past it.
//!
//! Cumulative columns chain through [`DataRowLink::chain_from`]: the
//! previous data row of the same day, or the previous day's last data row at
//! a day boundary. The same links drive [`crate::preview`].

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::columns::{cell_ref, col, COLUMNS, SNAPSHOT_COLUMNS};
use crate::config::JournalConfig;
use crate::highlight::{self, HighlightRule};
use crate::options::{fixed_option_sets, TimeSlot, TIME_SLOTS};

/// Physical rows per time slot
pub const SUB_ROWS_PER_SLOT: u32 = 2;
/// Weekdays per week block
pub const DAYS_PER_WEEK: u32 = 5;
/// Data rows per day block
pub const DATA_ROWS_PER_DAY: u32 = TIME_SLOTS.len() as u32 * SUB_ROWS_PER_SLOT;
/// Date header + data rows + daily summary
pub const ROWS_PER_DAY: u32 = 1 + DATA_ROWS_PER_DAY + 1;
/// Day blocks + weekly summary
pub const ROWS_PER_WEEK: u32 = DAYS_PER_WEEK * ROWS_PER_DAY + 1;

/// Default Risk (%) placed in every slot
pub const DEFAULT_RISK_PCT: f64 = 1.0;
/// Default Result (R) placed in every data row
pub const DEFAULT_RESULT_R: f64 = 0.0;

const HEADER_ROW: u32 = 1;

/// Content of one cell
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Formula(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    Header,
    DateHeader,
    /// Trade entry row; `shaded` rows get the alternating background
    Data { shaded: bool },
    DailySummary,
    WeeklySummary,
    MonthlySummary,
}

impl RowKind {
    /// Row height in points, if the row has a fixed height
    pub fn height(self) -> Option<f64> {
        match self {
            RowKind::Header => None,
            RowKind::DateHeader => Some(35.0),
            RowKind::Data { .. } => Some(50.0),
            RowKind::DailySummary => Some(22.5),
            RowKind::WeeklySummary | RowKind::MonthlySummary => Some(30.0),
        }
    }

    pub fn is_data(self) -> bool {
        matches!(self, RowKind::Data { .. })
    }
}

/// One physical row
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutRow {
    pub number: u32,
    pub kind: RowKind,
    pub cells: BTreeMap<u16, CellValue>,
}

impl LayoutRow {
    fn new(number: u32, kind: RowKind) -> Self {
        Self {
            number,
            kind,
            cells: BTreeMap::new(),
        }
    }

    fn set(&mut self, column: u16, value: CellValue) {
        self.cells.insert(column, value);
    }

    fn text(&mut self, column: u16, value: impl Into<String>) {
        self.set(column, CellValue::Text(value.into()));
    }

    fn number(&mut self, column: u16, value: f64) {
        self.set(column, CellValue::Number(value));
    }

    fn formula(&mut self, column: u16, value: String) {
        self.set(column, CellValue::Formula(value));
    }
}

/// Rectangular block of cells, 1-indexed and inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRange {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn contains(&self, row: u32, column: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&column)
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }
}

/// Dropdown list constraint on a block of cells
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub range: CellRange,
    pub options: Vec<String>,
}

/// Position of one weekday in the grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayBlock {
    pub date: NaiveDate,
    pub header_row: u32,
    pub first_data_row: u32,
    pub last_data_row: u32,
    pub summary_row: u32,
}

/// Position of one week in the grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeekBlock {
    /// 1-based week number
    pub number: u32,
    /// Indices into [`JournalLayout::days`]
    pub days: Vec<usize>,
    pub summary_row: u32,
    pub label: String,
}

/// Dependency record of one data row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DataRowLink {
    pub row: u32,
    /// First row of the slot; holds the slot's Risk (%)
    pub slot_start_row: u32,
    /// Row the cumulative columns continue from; `None` on the first data row
    pub chain_from: Option<u32>,
    /// Index into [`JournalLayout::days`]
    pub day: usize,
    pub slot: TimeSlot,
}

/// Running counters of the single layout pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutCursor {
    /// Next row to emit
    pub row: u32,
    /// Next calendar date to consider for a day block
    pub date: NaiveDate,
    pub first_data_row: Option<u32>,
    pub last_data_row: Option<u32>,
    pub last_daily_summary_row: Option<u32>,
    pub last_weekly_summary_row: Option<u32>,
}

impl LayoutCursor {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            row: HEADER_ROW + 1,
            date: start_date,
            first_data_row: None,
            last_data_row: None,
            last_daily_summary_row: None,
            last_weekly_summary_row: None,
        }
    }

    fn next_row(&mut self) -> u32 {
        let row = self.row;
        self.row += 1;
        row
    }

    /// Advance `date` to the next weekday, leaving weekdays untouched
    fn skip_weekend(&mut self) {
        while matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun) {
            self.date += Duration::days(1);
        }
    }

    /// Row the monthly summary copies from, assuming it is emitted at `self.row`.
    ///
    /// Last weekly summary, else last daily summary, else the row before the
    /// first data row. A source below row 2 falls back to the row right above
    /// the monthly summary. `None` when there is no data at all or the source
    /// lies above the first data block.
    pub fn monthly_source_row(&self) -> Option<u32> {
        let first_data_row = self.first_data_row?;
        let mut source = self
            .last_weekly_summary_row
            .or(self.last_daily_summary_row)
            .unwrap_or_else(|| first_data_row.saturating_sub(1));
        if source < 2 {
            source = self.row.saturating_sub(1);
        }
        (source + 1 >= first_data_row).then_some(source)
    }
}

/// The complete grid description handed to a renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JournalLayout {
    pub config: JournalConfig,
    pub rows: Vec<LayoutRow>,
    pub merges: Vec<CellRange>,
    pub validations: Vec<Validation>,
    pub highlights: Vec<HighlightRule>,
    pub days: Vec<DayBlock>,
    pub weeks: Vec<WeekBlock>,
    pub data_rows: Vec<DataRowLink>,
    pub monthly_summary_row: u32,
}

impl JournalLayout {
    /// Lay out the journal for a validated configuration
    pub fn build(config: &JournalConfig) -> Self {
        let mut builder = LayoutBuilder::new(config);
        let mut cursor = LayoutCursor::new(config.start_date);

        builder.header();
        for week in 1..=config.weeks {
            builder.week(&mut cursor, week);
        }
        let monthly_summary_row = builder.monthly(&mut cursor);

        let layout = builder.finish(monthly_summary_row);
        debug!(
            rows = layout.rows.len(),
            days = layout.days.len(),
            merges = layout.merges.len(),
            validations = layout.validations.len(),
            highlights = layout.highlights.len(),
            "journal layout built"
        );
        layout
    }

    /// `header + weeks x (5 x 10 + 1) + monthly`
    pub fn expected_row_count(weeks: u32) -> u32 {
        1 + weeks * ROWS_PER_WEEK + 1
    }

    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn row(&self, number: u32) -> Option<&LayoutRow> {
        number
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx as usize))
            .filter(|r| r.number == number)
    }

    pub fn cell(&self, row: u32, column: u16) -> Option<&CellValue> {
        self.row(row).and_then(|r| r.cells.get(&column))
    }

    pub fn first_data_row(&self) -> Option<u32> {
        self.data_rows.first().map(|link| link.row)
    }

    pub fn data_link(&self, row: u32) -> Option<&DataRowLink> {
        self.data_rows.iter().find(|link| link.row == row)
    }

    /// Highlight rules installed on one cell, in evaluation order
    pub fn highlights_for(&self, row: u32, column: u16) -> Vec<&HighlightRule> {
        self.highlights
            .iter()
            .filter(|r| r.row == row && r.col == column)
            .collect()
    }

    /// Dropdown options covering one cell, if any
    pub fn validation_for(&self, row: u32, column: u16) -> Option<&Validation> {
        self.validations.iter().find(|v| v.range.contains(row, column))
    }
}

struct LayoutBuilder {
    config: JournalConfig,
    /// Capital as written into formulas
    capital: String,
    capital_value: f64,
    rows: Vec<LayoutRow>,
    merges: Vec<CellRange>,
    validations: Vec<Validation>,
    highlights: Vec<HighlightRule>,
    days: Vec<DayBlock>,
    weeks: Vec<WeekBlock>,
    data_rows: Vec<DataRowLink>,
}

impl LayoutBuilder {
    fn new(config: &JournalConfig) -> Self {
        Self {
            config: config.clone(),
            capital: config.initial_capital.to_string(),
            capital_value: config.initial_capital.to_f64().unwrap_or_default(),
            rows: Vec::new(),
            merges: Vec::new(),
            validations: Vec::new(),
            highlights: Vec::new(),
            days: Vec::new(),
            weeks: Vec::new(),
            data_rows: Vec::new(),
        }
    }

    fn finish(self, monthly_summary_row: u32) -> JournalLayout {
        JournalLayout {
            config: self.config,
            rows: self.rows,
            merges: self.merges,
            validations: self.validations,
            highlights: self.highlights,
            days: self.days,
            weeks: self.weeks,
            data_rows: self.data_rows,
            monthly_summary_row,
        }
    }

    fn merge(&mut self, first_row: u32, first_col: u16, last_row: u32, last_col: u16) {
        self.merges
            .push(CellRange::new(first_row, first_col, last_row, last_col));
    }

    fn push_row(&mut self, row: LayoutRow) {
        debug_assert_eq!(row.number as usize, self.rows.len() + 1, "rows must be contiguous");
        self.rows.push(row);
    }

    fn text_at(&self, row: u32, column: u16) -> Option<&str> {
        self.rows
            .get(row.checked_sub(1)? as usize)
            .and_then(|r| r.cells.get(&column))
            .and_then(CellValue::as_text)
    }

    fn header(&mut self) {
        let mut row = LayoutRow::new(HEADER_ROW, RowKind::Header);
        for (idx, column) in COLUMNS.iter().enumerate() {
            row.text(idx as u16 + 1, column.label);
        }
        self.push_row(row);
        self.merge(HEADER_ROW, col::REASON_FIRST, HEADER_ROW, col::REASON_LAST);
        self.merge(HEADER_ROW, col::SCREENSHOT_FIRST, HEADER_ROW, col::SCREENSHOT_LAST);
    }

    fn week(&mut self, cursor: &mut LayoutCursor, number: u32) {
        let first_day = self.days.len();
        for _ in 0..DAYS_PER_WEEK {
            self.day(cursor);
        }
        let day_indices: Vec<usize> = (first_day..self.days.len()).collect();
        let summaries: Vec<u32> = day_indices.iter().map(|&i| self.days[i].summary_row).collect();

        let label = format!("Week {} ({})", number, self.week_range(&day_indices));
        let summary_row = cursor.next_row();
        let mut row = LayoutRow::new(summary_row, RowKind::WeeklySummary);
        row.text(col::TIME_SLOT, label.clone());

        let list = |column: u16| {
            summaries
                .iter()
                .map(|&r| cell_ref(column, r))
                .collect::<Vec<_>>()
                .join(",")
        };
        row.formula(col::STOP_LOSS, guarded("AVERAGE", &list(col::STOP_LOSS)));
        row.formula(col::RISK, guarded("SUM", &list(col::RISK)));
        row.formula(col::TARGET_REWARD, guarded("SUM", &list(col::TARGET_REWARD)));
        row.formula(col::TRADE_DURATION, guarded("AVERAGE", &list(col::TRADE_DURATION)));
        row.formula(col::RESULT, format!("=SUM({})", list(col::RESULT)));
        if let Some(&last_daily) = summaries.last() {
            copy_snapshot(&mut row, last_daily);
        }
        self.push_row(row);
        self.summary_merges(summary_row);

        self.weeks.push(WeekBlock {
            number,
            days: day_indices,
            summary_row,
            label,
        });
        cursor.last_weekly_summary_row = Some(summary_row);
    }

    /// "<first date> to <last date>", read back from the day header text
    fn week_range(&self, day_indices: &[usize]) -> String {
        let date_of = |idx: usize| {
            let day = &self.days[idx];
            self.text_at(day.header_row, col::TIME_SLOT)
                .and_then(|text| text.split_once(' '))
                .map(|(_, date)| date.to_string())
                .unwrap_or_else(|| day.date.format("%Y-%m-%d").to_string())
        };
        match (day_indices.first(), day_indices.last()) {
            (Some(&first), Some(&last)) => format!("{} to {}", date_of(first), date_of(last)),
            _ => String::new(),
        }
    }

    fn day(&mut self, cursor: &mut LayoutCursor) {
        cursor.skip_weekend();
        let date = cursor.date;
        let day_index = self.days.len();

        let header_row = cursor.next_row();
        let mut row = LayoutRow::new(header_row, RowKind::DateHeader);
        row.text(col::TIME_SLOT, format!("{} {}", date.format("%A"), date.format("%Y-%m-%d")));
        self.push_row(row);
        self.merge(header_row, col::TIME_SLOT, header_row, col::DRAWDOWN);

        let first_data_row = cursor.row;
        cursor.first_data_row.get_or_insert(first_data_row);
        for slot in TIME_SLOTS {
            self.slot(cursor, slot, day_index);
        }
        let last_data_row = cursor.row - 1;
        self.merge(first_data_row, col::SCREENSHOT_FIRST, last_data_row, col::SCREENSHOT_LAST);

        let summary_row = cursor.next_row();
        let mut row = LayoutRow::new(summary_row, RowKind::DailySummary);
        row.text(col::TIME_SLOT, "Daily Summary");
        let span = |column: u16| {
            format!("{}:{}", cell_ref(column, first_data_row), cell_ref(column, last_data_row))
        };
        row.formula(col::STOP_LOSS, guarded("AVERAGE", &span(col::STOP_LOSS)));
        row.formula(col::RISK, guarded("SUM", &span(col::RISK)));
        row.formula(col::TARGET_REWARD, guarded("SUM", &span(col::TARGET_REWARD)));
        row.formula(col::TRADE_DURATION, guarded("AVERAGE", &span(col::TRADE_DURATION)));
        row.formula(col::RESULT, format!("=SUM({})", span(col::RESULT)));
        copy_snapshot(&mut row, last_data_row);
        self.push_row(row);
        self.summary_merges(summary_row);

        self.days.push(DayBlock {
            date,
            header_row,
            first_data_row,
            last_data_row,
            summary_row,
        });
        cursor.last_daily_summary_row = Some(summary_row);
        cursor.date += Duration::days(1);
    }

    fn slot(&mut self, cursor: &mut LayoutCursor, slot: TimeSlot, day: usize) {
        let slot_start_row = cursor.row;
        let slot_end_row = slot_start_row + SUB_ROWS_PER_SLOT - 1;

        for sub_row in 0..SUB_ROWS_PER_SLOT {
            let number = cursor.next_row();
            let link = DataRowLink {
                row: number,
                slot_start_row,
                chain_from: cursor.last_data_row,
                day,
                slot,
            };
            let mut row = LayoutRow::new(number, RowKind::Data { shaded: number % 2 == 0 });
            if sub_row == 0 {
                row.text(col::TIME_SLOT, slot.label());
                row.number(col::RISK, DEFAULT_RISK_PCT);
            }
            row.number(col::RESULT, DEFAULT_RESULT_R);
            self.data_formulas(&mut row, &link);
            self.push_row(row);

            self.merge(number, col::REASON_FIRST, number, col::REASON_LAST);
            self.highlights
                .extend(highlight::rules_for_row(number, self.capital_value));
            self.data_rows.push(link);
            cursor.last_data_row = Some(number);
        }

        for column in [col::TIME_SLOT, col::SIGNAL, col::STATUS, col::MOMENTUM, col::RISK] {
            self.merge(slot_start_row, column, slot_end_row, column);
        }

        let validate = |column: u16, options: Vec<String>| Validation {
            range: CellRange::new(slot_start_row, column, slot_end_row, column),
            options,
        };
        for (column, options) in fixed_option_sets() {
            self.validations
                .push(validate(column, options.iter().map(|s| s.to_string()).collect()));
        }
        self.validations
            .push(validate(col::ENTRY_TIME, slot.entry_options()));
        self.validations
            .push(validate(col::EXIT_TIME, slot.exit_options()));
    }

    fn data_formulas(&self, row: &mut LayoutRow, link: &DataRowLink) {
        let r = link.row;
        let at = |column: u16| cell_ref(column, r);
        let cap = &self.capital;
        let risk = cell_ref(col::RISK, link.slot_start_row);

        row.formula(
            col::TRADE_DURATION,
            format!(
                "=IF(AND({b}<>\"\",{c}<>\"\"),({c}-{b})*24*4,\"\")",
                b = at(col::ENTRY_TIME),
                c = at(col::EXIT_TIME)
            ),
        );

        match link.chain_from {
            None => {
                row.formula(col::CUMULATIVE_RESULT, format!("={}", at(col::RESULT)));
                row.formula(col::CUMULATIVE_MAX_REWARD, format!("={}", at(col::MAX_REWARD)));
                for (column, driver) in [
                    (col::BALANCE, col::RESULT),
                    (col::MAX_REWARD_BALANCE, col::MAX_REWARD),
                ] {
                    let d = at(driver);
                    row.formula(
                        column,
                        format!("=IF({d}=0,{cap},{cap}*(1+{d}*{risk}/100))"),
                    );
                }
                row.formula(col::MIN_BALANCE, format!("={}", at(col::BALANCE)));
                row.formula(col::MAX_BALANCE, format!("={}", at(col::BALANCE)));
            }
            Some(prev) => {
                let before = |column: u16| cell_ref(column, prev);
                row.formula(
                    col::CUMULATIVE_RESULT,
                    format!("={}+{}", before(col::CUMULATIVE_RESULT), at(col::RESULT)),
                );
                row.formula(
                    col::CUMULATIVE_MAX_REWARD,
                    format!("={}+{}", before(col::CUMULATIVE_MAX_REWARD), at(col::MAX_REWARD)),
                );
                for (column, driver) in [
                    (col::BALANCE, col::RESULT),
                    (col::MAX_REWARD_BALANCE, col::MAX_REWARD),
                ] {
                    let d = at(driver);
                    let p = before(column);
                    row.formula(
                        column,
                        format!("=IF({d}=0,{p},{p}+{d}*{cap}*{risk}/100)"),
                    );
                }
                row.formula(
                    col::MIN_BALANCE,
                    format!("=MIN({},{})", before(col::MIN_BALANCE), at(col::BALANCE)),
                );
                row.formula(
                    col::MAX_BALANCE,
                    format!("=MAX({},{})", before(col::MAX_BALANCE), at(col::BALANCE)),
                );
            }
        }

        let min = at(col::MIN_BALANCE);
        row.formula(
            col::DRAWDOWN,
            format!("=IF({min}={cap},0,({min}-{cap})/{cap}*100)"),
        );
    }

    fn summary_merges(&mut self, row: u32) {
        self.merge(row, col::TIME_SLOT, row, col::ENTRY_TIME);
        self.merge(row, col::EXIT_TIME, row, col::PLAN_ADHERENCE);
    }

    fn monthly(&mut self, cursor: &mut LayoutCursor) -> u32 {
        let source = cursor.monthly_source_row();
        let number = cursor.next_row();
        let mut row = LayoutRow::new(number, RowKind::MonthlySummary);
        row.text(col::TIME_SLOT, "Monthly Summary");
        if let Some(source) = source {
            for column in [
                col::STOP_LOSS,
                col::RISK,
                col::TARGET_REWARD,
                col::TRADE_DURATION,
                col::RESULT,
            ] {
                row.formula(column, format!("={}", cell_ref(column, source)));
            }
            copy_snapshot(&mut row, source);
        }
        self.push_row(row);
        self.summary_merges(number);
        number
    }
}

/// `=IFERROR(FUNC(args),"")`
fn guarded(function: &str, args: &str) -> String {
    format!("=IFERROR({}({}),\"\")", function, args)
}

/// Copy the point-in-time columns from `source` into a summary row
fn copy_snapshot(row: &mut LayoutRow, source: u32) {
    for column in SNAPSHOT_COLUMNS {
        row.formula(column, format!("={}", cell_ref(column, source)));
    }
}
