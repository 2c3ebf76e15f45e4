//! Conditional highlight rules
//!
//! Every data row gets an ordered list of highlight rules per cell. Rules are
//! evaluated by the spreadsheet application, first match wins. The same rule
//! values can be evaluated here through [`first_match`], which is what the
//! tests and the preview use.

use serde::Serialize;

use crate::columns::{cell_ref, col};
use crate::options::FULL_ADHERENCE;

/// Fill applied when a rule matches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    /// Fill color as 0xRRGGBB
    pub fn fill_color(self) -> u32 {
        match self {
            Tone::Positive => 0x90EE90,
            Tone::Negative => 0xFFB6C1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::GreaterThanOrEqual => value >= threshold,
            Comparison::LessThan => value < threshold,
        }
    }
}

/// Exact, case-sensitive text matching against a value list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCondition {
    OneOf(&'static [&'static str]),
    NonBlankOneOf(&'static [&'static str]),
    NonBlankNoneOf(&'static [&'static str]),
}

impl TextCondition {
    /// Spreadsheet formula for this condition, anchored at `cell`
    pub fn formula(&self, cell: &str) -> String {
        let any_of = |values: &[&str]| {
            let exacts: Vec<String> = values
                .iter()
                .map(|v| format!("EXACT({},\"{}\")", cell, v))
                .collect();
            format!("OR({})", exacts.join(","))
        };
        match *self {
            TextCondition::OneOf(values) => any_of(values),
            TextCondition::NonBlankOneOf(values) => {
                format!("AND(NOT(ISBLANK({})),{})", cell, any_of(values))
            }
            TextCondition::NonBlankNoneOf(values) => {
                format!("AND(NOT(ISBLANK({})),NOT({}))", cell, any_of(values))
            }
        }
    }

    /// Evaluate against a cell's text; an empty string is a blank cell
    pub fn matches(&self, value: &str) -> bool {
        match *self {
            TextCondition::OneOf(values) => values.contains(&value),
            TextCondition::NonBlankOneOf(values) => !value.is_empty() && values.contains(&value),
            TextCondition::NonBlankNoneOf(values) => !value.is_empty() && !values.contains(&value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightCondition {
    Compare { op: Comparison, value: f64 },
    Text(TextCondition),
}

/// Value typed into a cell, for evaluating rules outside the spreadsheet
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellInput<'a> {
    Number(f64),
    Text(&'a str),
}

impl HighlightCondition {
    pub fn matches(&self, input: CellInput<'_>) -> bool {
        match (self, input) {
            (HighlightCondition::Compare { op, value }, CellInput::Number(n)) => {
                op.holds(n, *value)
            }
            (HighlightCondition::Text(cond), CellInput::Text(s)) => cond.matches(s),
            _ => false,
        }
    }
}

/// One rule on one cell. Rules for a cell are stored in evaluation order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HighlightRule {
    pub row: u32,
    pub col: u16,
    pub condition: HighlightCondition,
    pub tone: Tone,
}

impl HighlightRule {
    pub fn cell(&self) -> String {
        cell_ref(self.col, self.row)
    }
}

const SIGNAL_POSITIVE: &[&str] = &["Strong", "Normal", "V-Strong", "V-Normal"];
const SIGNAL_NEGATIVE: &[&str] = &["Weak", "V-Weak"];
const STATUS_RANGE: &[&str] = &["Range", "V-Range"];
const MOMENTUM_INCREASING: &[&str] = &["Increasing", "V-Increasing"];
const ADHERENCE_FULL: &[&str] = &[FULL_ADHERENCE];

/// Rule list installed on every data row
pub fn rules_for_row(row: u32, initial_capital: f64) -> Vec<HighlightRule> {
    let mut rules = Vec::new();
    let mut push = |col: u16, condition: HighlightCondition, tone: Tone| {
        rules.push(HighlightRule { row, col, condition, tone });
    };
    let compare = |op: Comparison, value: f64| HighlightCondition::Compare { op, value };

    push(col::STOP_LOSS, compare(Comparison::LessThan, 1.0), Tone::Positive);

    for c in [col::RESULT, col::CUMULATIVE_RESULT, col::CUMULATIVE_MAX_REWARD] {
        push(c, compare(Comparison::GreaterThan, 0.0), Tone::Positive);
        push(c, compare(Comparison::LessThan, 0.0), Tone::Negative);
    }

    for c in [col::BALANCE, col::MAX_REWARD_BALANCE, col::MIN_BALANCE, col::MAX_BALANCE] {
        push(c, compare(Comparison::GreaterThanOrEqual, initial_capital), Tone::Positive);
        push(c, compare(Comparison::LessThan, initial_capital), Tone::Negative);
    }

    push(col::DRAWDOWN, compare(Comparison::GreaterThanOrEqual, 0.0), Tone::Positive);
    push(col::DRAWDOWN, compare(Comparison::LessThan, 0.0), Tone::Negative);

    let text = HighlightCondition::Text;
    push(col::SIGNAL, text(TextCondition::OneOf(SIGNAL_POSITIVE)), Tone::Positive);
    push(col::SIGNAL, text(TextCondition::OneOf(SIGNAL_NEGATIVE)), Tone::Negative);

    push(col::STATUS, text(TextCondition::NonBlankOneOf(STATUS_RANGE)), Tone::Negative);
    push(col::STATUS, text(TextCondition::NonBlankNoneOf(STATUS_RANGE)), Tone::Positive);

    // Unlike Status, any unrecognized non-blank momentum is penalized.
    push(col::MOMENTUM, text(TextCondition::NonBlankOneOf(MOMENTUM_INCREASING)), Tone::Positive);
    push(col::MOMENTUM, text(TextCondition::NonBlankNoneOf(MOMENTUM_INCREASING)), Tone::Negative);

    push(col::PLAN_ADHERENCE, text(TextCondition::NonBlankOneOf(ADHERENCE_FULL)), Tone::Positive);
    push(col::PLAN_ADHERENCE, text(TextCondition::NonBlankNoneOf(ADHERENCE_FULL)), Tone::Negative);

    rules
}

/// Tone of the first rule on `(row, col)` matching `input`
pub fn first_match(
    rules: &[HighlightRule],
    row: u32,
    col: u16,
    input: CellInput<'_>,
) -> Option<Tone> {
    rules
        .iter()
        .filter(|r| r.row == row && r.col == col)
        .find(|r| r.condition.matches(input))
        .map(|r| r.tone)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: u32 = 7;

    fn tone(col: u16, input: CellInput<'_>) -> Option<Tone> {
        first_match(&rules_for_row(ROW, 25000.0), ROW, col, input)
    }

    #[test]
    fn stop_loss_below_one_is_positive() {
        assert_eq!(tone(col::STOP_LOSS, CellInput::Number(0.5)), Some(Tone::Positive));
        assert_eq!(tone(col::STOP_LOSS, CellInput::Number(1.0)), None);
    }

    #[test]
    fn result_sign_rules() {
        assert_eq!(tone(col::RESULT, CellInput::Number(2.0)), Some(Tone::Positive));
        assert_eq!(tone(col::RESULT, CellInput::Number(-1.0)), Some(Tone::Negative));
        assert_eq!(tone(col::RESULT, CellInput::Number(0.0)), None);
    }

    #[test]
    fn balance_compares_with_capital() {
        assert_eq!(tone(col::BALANCE, CellInput::Number(25000.0)), Some(Tone::Positive));
        assert_eq!(tone(col::MIN_BALANCE, CellInput::Number(24999.0)), Some(Tone::Negative));
    }

    #[test]
    fn drawdown_zero_is_positive() {
        assert_eq!(tone(col::DRAWDOWN, CellInput::Number(0.0)), Some(Tone::Positive));
        assert_eq!(tone(col::DRAWDOWN, CellInput::Number(-0.5)), Some(Tone::Negative));
    }

    #[test]
    fn signal_rules() {
        assert_eq!(tone(col::SIGNAL, CellInput::Text("V-Strong")), Some(Tone::Positive));
        assert_eq!(tone(col::SIGNAL, CellInput::Text("Weak")), Some(Tone::Negative));
        assert_eq!(tone(col::SIGNAL, CellInput::Text("strong")), None);
        assert_eq!(tone(col::SIGNAL, CellInput::Text("")), None);
    }

    #[test]
    fn status_penalizes_only_range() {
        assert_eq!(tone(col::STATUS, CellInput::Text("V-Range")), Some(Tone::Negative));
        assert_eq!(tone(col::STATUS, CellInput::Text("Trend")), Some(Tone::Positive));
        assert_eq!(tone(col::STATUS, CellInput::Text("Sideways")), Some(Tone::Positive));
        assert_eq!(tone(col::STATUS, CellInput::Text("")), None);
    }

    #[test]
    fn momentum_penalizes_anything_but_increasing() {
        assert_eq!(tone(col::MOMENTUM, CellInput::Text("Increasing")), Some(Tone::Positive));
        assert_eq!(tone(col::MOMENTUM, CellInput::Text("Decreasing")), Some(Tone::Negative));
        assert_eq!(tone(col::MOMENTUM, CellInput::Text("Flat")), Some(Tone::Negative));
        assert_eq!(tone(col::MOMENTUM, CellInput::Text("")), None);
    }

    #[test]
    fn fear_of_entering_is_negative() {
        assert_eq!(
            tone(col::PLAN_ADHERENCE, CellInput::Text("Full Adherence")),
            Some(Tone::Positive)
        );
        assert_eq!(
            tone(col::PLAN_ADHERENCE, CellInput::Text("Fear of entering ")),
            Some(Tone::Negative)
        );
        assert_eq!(
            tone(col::PLAN_ADHERENCE, CellInput::Text("Full Adherence ")),
            Some(Tone::Negative)
        );
    }

    #[test]
    fn text_rules_ignore_numbers() {
        assert_eq!(tone(col::STATUS, CellInput::Number(3.0)), None);
    }

    #[test]
    fn text_condition_formulas() {
        assert_eq!(
            TextCondition::OneOf(SIGNAL_NEGATIVE).formula("D7"),
            r#"OR(EXACT(D7,"Weak"),EXACT(D7,"V-Weak"))"#
        );
        assert_eq!(
            TextCondition::NonBlankNoneOf(STATUS_RANGE).formula("E7"),
            r#"AND(NOT(ISBLANK(E7)),NOT(OR(EXACT(E7,"Range"),EXACT(E7,"V-Range"))))"#
        );
    }

    #[test]
    fn rule_count_per_row() {
        // 1 stop loss + 3x2 sign + 4x2 capital + 2 drawdown + 4x2 text
        assert_eq!(rules_for_row(ROW, 1.0).len(), 25);
    }
}
