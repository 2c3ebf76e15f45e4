//! Dropdown option sets and trading time slots
//!
//! Six categorical columns take their values from fixed lists. Entry and exit
//! times are slot dependent: each slot gets its own lists, generated from the
//! slot's start time.

use serde::Serialize;
use std::fmt;

pub const STATUS_OPTIONS: [&str; 8] = [
    "Range",
    "Trend",
    "Pullback",
    "Undefined/Transition",
    "V-Range",
    "V-Trend",
    "V-Pullback",
    "V-Undefined/Transition",
];

pub const SIGNAL_OPTIONS: [&str; 6] = [
    "Weak", "Strong", "Normal", "V-Weak", "V-Strong", "V-Normal",
];

pub const MOMENTUM_OPTIONS: [&str; 4] =
    ["Decreasing", "Increasing", "V-Decreasing", "V-Increasing"];

pub const ENTER_TYPE_OPTIONS: [&str; 4] = [
    "2R (Normal)",
    "2R (Mid-Candle Pullback Entry)",
    "4R (Aggressive Stop)",
    "4R (Mid-Candle Pullback Entry)",
];

pub const TRADE_TYPE_OPTIONS: [&str; 2] = ["Reversal", "Continuation"];

/// The trailing space on the last entry is part of the value; highlight
/// rules compare exact strings.
pub const PLAN_ADHERENCE_OPTIONS: [&str; 5] = [
    "Full Adherence",
    "Entry Flaw",
    "Exit/Flexibility Flaw",
    "High Target Flaw",
    "Fear of entering ",
];

/// Plan adherence value that earns the positive highlight
pub const FULL_ADHERENCE: &str = "Full Adherence";

/// Last selectable exit time of the trading day
const LAST_EXIT_MINUTES: u16 = 23 * 60 + 30;

const QUARTER: u16 = 15;

/// Number of entry-time choices offered per slot
const ENTRY_CHOICES: u16 = 4;

/// One trading window. Each slot spans two physical rows of a day block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub hour: u8,
    pub minute: u8,
}

/// The four daily slots
pub const TIME_SLOTS: [TimeSlot; 4] = [
    TimeSlot::new(18, 30),
    TimeSlot::new(19, 30),
    TimeSlot::new(20, 30),
    TimeSlot::new(21, 30),
];

impl TimeSlot {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    fn start_minutes(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    /// Slot label as written into the Time Slot column ("18:30")
    pub fn label(self) -> String {
        self.to_string()
    }

    /// Four quarter-hour entry choices starting at the slot start
    pub fn entry_options(self) -> Vec<String> {
        let start = self.start_minutes();
        (0..ENTRY_CHOICES)
            .map(|i| format_minutes(start + QUARTER * i))
            .collect()
    }

    /// Quarter-hour exit choices from the slot start through 23:30.
    ///
    /// Never reaches 23:45 and never wraps past midnight.
    pub fn exit_options(self) -> Vec<String> {
        (self.start_minutes()..=LAST_EXIT_MINUTES)
            .step_by(QUARTER as usize)
            .map(format_minutes)
            .collect()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

fn format_minutes(total: u16) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Categorical columns with a fixed option set, paired with their values
pub fn fixed_option_sets() -> [(u16, &'static [&'static str]); 6] {
    use crate::columns::col;
    [
        (col::SIGNAL, &SIGNAL_OPTIONS[..]),
        (col::STATUS, &STATUS_OPTIONS[..]),
        (col::MOMENTUM, &MOMENTUM_OPTIONS[..]),
        (col::ENTER_TYPE, &ENTER_TYPE_OPTIONS[..]),
        (col::TRADE_TYPE, &TRADE_TYPE_OPTIONS[..]),
        (col::PLAN_ADHERENCE, &PLAN_ADHERENCE_OPTIONS[..]),
    ]
}
