//! Column schema for the journal sheet
//!
//! The sheet has a fixed 36-column layout. Column positions are 1-indexed
//! and load-bearing: every formula the layout engine emits addresses cells
//! through the constants in [`col`], so the schema and the formulas cannot
//! drift apart.
//!
//! ```text
//! | 1 Time Slot | 2 Entry | 3 Exit | 4 Signal | 5 Status | 6 Momentum | 7 Enter type |
//! | 8 Trade Type | 9..13 Reason / Flex / Mistakes | 14 Plan Adherence | 15 Stop Loss (%) |
//! | 16 Risk (%) | 17 Target Reward (R) | 18 Trade Duration | 19 Max Reward (R) | 20 Result (R) |
//! | 21 Cum. Result | 22 Cum. Max Reward | 23 Balance | 24 Max Reward Balance | 25 Min Balance |
//! | 26 Max Balance | 27 Min Lows % Drawdown | 28..36 Trade Screenshot |
//! ```

use serde::Serialize;

/// 1-indexed column positions.
pub mod col {
    pub const TIME_SLOT: u16 = 1;
    pub const ENTRY_TIME: u16 = 2;
    pub const EXIT_TIME: u16 = 3;
    pub const SIGNAL: u16 = 4;
    pub const STATUS: u16 = 5;
    pub const MOMENTUM: u16 = 6;
    pub const ENTER_TYPE: u16 = 7;
    pub const TRADE_TYPE: u16 = 8;
    pub const REASON_FIRST: u16 = 9;
    pub const REASON_LAST: u16 = 13;
    pub const PLAN_ADHERENCE: u16 = 14;
    pub const STOP_LOSS: u16 = 15;
    pub const RISK: u16 = 16;
    pub const TARGET_REWARD: u16 = 17;
    pub const TRADE_DURATION: u16 = 18;
    pub const MAX_REWARD: u16 = 19;
    pub const RESULT: u16 = 20;
    pub const CUMULATIVE_RESULT: u16 = 21;
    pub const CUMULATIVE_MAX_REWARD: u16 = 22;
    pub const BALANCE: u16 = 23;
    pub const MAX_REWARD_BALANCE: u16 = 24;
    pub const MIN_BALANCE: u16 = 25;
    pub const MAX_BALANCE: u16 = 26;
    pub const DRAWDOWN: u16 = 27;
    pub const SCREENSHOT_FIRST: u16 = 28;
    pub const SCREENSHOT_LAST: u16 = 36;
}

/// Total number of physical columns
pub const COLUMN_COUNT: u16 = 36;

/// What a column holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Slot label, written by the generator
    Identifier,
    /// Entry/exit time picked from a per-slot dropdown
    Timestamp,
    /// Value picked from a fixed option set
    Categorical,
    /// Number typed by the user
    NumericInput,
    /// Number derived by a formula
    NumericFormula,
    /// Free-form notes
    FreeText,
    /// Blank column that only widens a merged span
    Spacer,
    /// Area for pasting a chart screenshot
    ImagePlaceholder,
}

/// Width class of a column, in spreadsheet character units
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthClass {
    Slot,
    Reason,
    Adherence,
    Compact,
    Money,
    Screenshot,
}

impl WidthClass {
    pub fn width(self) -> f64 {
        match self {
            WidthClass::Slot => 11.25,
            WidthClass::Reason => 10.0,
            WidthClass::Adherence => 20.0,
            WidthClass::Compact => 7.5,
            WidthClass::Money => 15.0,
            WidthClass::Screenshot => 8.0,
        }
    }
}

/// One column of the schema
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColumnDef {
    pub label: &'static str,
    pub width: WidthClass,
    pub role: ColumnRole,
}

const fn def(label: &'static str, width: WidthClass, role: ColumnRole) -> ColumnDef {
    ColumnDef { label, width, role }
}

use ColumnRole as R;
use WidthClass as W;

/// The header row, left to right.
///
/// "Enter type" replaces the old "Order Type" label, and the old
/// "Reason for Target/Limit" column is gone; two blank spacers keep the
/// Reason / Flex / Mistakes span five columns wide.
pub const COLUMNS: [ColumnDef; COLUMN_COUNT as usize] = [
    def("Time Slot", W::Slot, R::Identifier),
    def("Entry Time", W::Slot, R::Timestamp),
    def("Exit Time", W::Slot, R::Timestamp),
    def("Signal", W::Slot, R::Categorical),
    def("Status", W::Slot, R::Categorical),
    def("Momentum", W::Slot, R::Categorical),
    def("Enter type", W::Slot, R::Categorical),
    def("Trade Type", W::Slot, R::Categorical),
    def("Reason / Flex / Mistakes", W::Reason, R::FreeText),
    def("", W::Reason, R::Spacer),
    def("", W::Reason, R::Spacer),
    def("", W::Reason, R::Spacer),
    def("", W::Reason, R::Spacer),
    def("Plan Adherence", W::Adherence, R::Categorical),
    def("Stop Loss (%)", W::Compact, R::NumericInput),
    def("Risk (%)", W::Compact, R::NumericInput),
    def("Target Reward (R)", W::Compact, R::NumericInput),
    def("Trade Duration (min)", W::Compact, R::NumericFormula),
    def("Max Reward (R)", W::Compact, R::NumericInput),
    def("Result (R)", W::Compact, R::NumericInput),
    def("Cumulative Result (R)", W::Compact, R::NumericFormula),
    def("Cumulative Max Reward (R)", W::Compact, R::NumericFormula),
    def("Balance", W::Money, R::NumericFormula),
    def("Max Reward Balance", W::Money, R::NumericFormula),
    def("Min Balance", W::Money, R::NumericFormula),
    def("Max Balance", W::Money, R::NumericFormula),
    def("Min Lows % Drawdown", W::Money, R::NumericFormula),
    def("Trade Screenshot", W::Screenshot, R::ImagePlaceholder),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
    def("", W::Screenshot, R::Spacer),
];

/// Look up a column by its 1-indexed position
pub fn column(position: u16) -> Option<&'static ColumnDef> {
    position
        .checked_sub(1)
        .and_then(|idx| COLUMNS.get(idx as usize))
}

/// Header labels in column order
pub fn header_labels() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|c| c.label)
}

/// Columns copied verbatim from a child row into every summary row
pub const SNAPSHOT_COLUMNS: [u16; 7] = [
    col::CUMULATIVE_RESULT,
    col::CUMULATIVE_MAX_REWARD,
    col::BALANCE,
    col::MAX_REWARD_BALANCE,
    col::MIN_BALANCE,
    col::MAX_BALANCE,
    col::DRAWDOWN,
];

/// Convert a 1-indexed column number to its letter (1 -> A, 26 -> Z, 27 -> AA)
pub fn col_to_letter(position: u16) -> String {
    let mut result = String::new();
    let mut n = u32::from(position.max(1)) - 1;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// A1-style reference for a 1-indexed (column, row)
pub fn cell_ref(column: u16, row: u32) -> String {
    format!("{}{}", col_to_letter(column), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_thirty_six_columns() {
        assert_eq!(COLUMNS.len(), 36);
        assert_eq!(header_labels().count(), 36);
    }

    #[test]
    fn positions_match_labels() {
        assert_eq!(column(col::ENTER_TYPE).unwrap().label, "Enter type");
        assert_eq!(column(col::PLAN_ADHERENCE).unwrap().label, "Plan Adherence");
        assert_eq!(column(col::RESULT).unwrap().label, "Result (R)");
        assert_eq!(column(col::DRAWDOWN).unwrap().label, "Min Lows % Drawdown");
        assert_eq!(column(col::SCREENSHOT_FIRST).unwrap().label, "Trade Screenshot");
        assert!(column(0).is_none());
        assert!(column(37).is_none());
    }

    #[test]
    fn reason_span_is_five_columns_of_spacers() {
        assert_eq!(col::REASON_LAST - col::REASON_FIRST + 1, 5);
        for position in col::REASON_FIRST + 1..=col::REASON_LAST {
            assert_eq!(column(position).unwrap().role, ColumnRole::Spacer);
        }
        assert_eq!(col::SCREENSHOT_LAST - col::SCREENSHOT_FIRST + 1, 9);
    }

    #[test]
    fn removed_label_is_absent() {
        assert!(!header_labels().any(|l| l == "Reason for Target/Limit"));
        assert!(!header_labels().any(|l| l == "Order Type"));
    }

    #[test]
    fn col_to_letter_works() {
        assert_eq!(col_to_letter(1), "A");
        assert_eq!(col_to_letter(26), "Z");
        assert_eq!(col_to_letter(27), "AA");
        assert_eq!(col_to_letter(col::DRAWDOWN), "AA");
        assert_eq!(col_to_letter(col::SCREENSHOT_LAST), "AJ");
        assert_eq!(col_to_letter(52), "AZ");
        assert_eq!(col_to_letter(53), "BA");
    }

    #[test]
    fn widths_follow_classes() {
        assert_eq!(column(col::TIME_SLOT).unwrap().width.width(), 11.25);
        assert_eq!(column(col::PLAN_ADHERENCE).unwrap().width.width(), 20.0);
        assert_eq!(column(col::RESULT).unwrap().width.width(), 7.5);
        assert_eq!(column(col::BALANCE).unwrap().width.width(), 15.0);
        assert_eq!(column(col::SCREENSHOT_LAST).unwrap().width.width(), 8.0);
    }
}
