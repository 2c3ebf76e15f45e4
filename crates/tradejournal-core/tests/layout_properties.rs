//! Layout Property Test Suite
//!
//! Properties that must hold for every valid configuration:
//! 1. Row count follows `1 + weeks x 51 + 1`, rows contiguous
//! 2. Day blocks land on consecutive weekdays, never weekends
//! 3. Cumulative columns chain from the previous data row, or the previous
//!    day's last data row at a day boundary
//! 4. Rollups only reference rows above them
//! 5. Balance does not drift on zero-result rows
//! 6. Drawdown is zero exactly when min balance equals capital

use chrono::{Datelike, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tradejournal_core::columns::cell_ref;
use tradejournal_core::preview::{evaluate, TradeInputs};
use tradejournal_core::{col, CellValue, JournalConfig, JournalLayout, RowKind};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn layout(start: NaiveDate, weeks: u32) -> JournalLayout {
    JournalLayout::build(&JournalConfig::new(start, dec!(25000), weeks).unwrap())
}

/// Row numbers referenced by an A1-style formula
fn referenced_rows(formula: &str) -> Vec<u32> {
    let bytes = formula.as_bytes();
    let mut rows = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_uppercase() {
            let letters_start = i;
            while i < bytes.len() && bytes[i].is_ascii_uppercase() {
                i += 1;
            }
            let digits_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let letters = i - digits_start > 0 && digits_start - letters_start <= 2;
            let followed_by_paren = bytes.get(i) == Some(&b'(');
            if letters && !followed_by_paren {
                rows.push(formula[digits_start..i].parse().unwrap());
            }
        } else {
            i += 1;
        }
    }
    rows
}

fn starts() -> Vec<NaiveDate> {
    vec![
        date(2025, 4, 28), // Monday
        date(2025, 5, 1),  // Thursday
        date(2025, 5, 3),  // Saturday
        date(2025, 5, 4),  // Sunday
        date(2024, 12, 30), // crosses a year boundary
    ]
}

// ============================================================================
// PROPERTY 1: Row count and contiguity
// ============================================================================

#[test]
fn row_count_matches_closed_form() {
    for start in starts() {
        for weeks in 1..=4 {
            let layout = layout(start, weeks);
            assert_eq!(layout.row_count(), 1 + weeks * (5 * (1 + 8 + 1) + 1) + 1);
            assert_eq!(layout.row_count(), JournalLayout::expected_row_count(weeks));
            for (idx, row) in layout.rows.iter().enumerate() {
                assert_eq!(row.number, idx as u32 + 1, "rows must be contiguous");
            }
        }
    }
}

#[test]
fn block_counts_per_week() {
    let layout = layout(date(2025, 4, 28), 3);
    let count = |kind: RowKind| layout.rows.iter().filter(|r| r.kind == kind).count();
    assert_eq!(count(RowKind::Header), 1);
    assert_eq!(count(RowKind::DateHeader), 15);
    assert_eq!(count(RowKind::DailySummary), 15);
    assert_eq!(count(RowKind::WeeklySummary), 3);
    assert_eq!(count(RowKind::MonthlySummary), 1);
    assert_eq!(layout.rows.iter().filter(|r| r.kind.is_data()).count(), 120);
    assert_eq!(layout.data_rows.len(), 120);
}

// ============================================================================
// PROPERTY 2: Weekdays only
// ============================================================================

#[test]
fn days_are_consecutive_weekdays() {
    for start in starts() {
        let layout = layout(start, 4);
        assert_eq!(layout.days.len(), 20);
        for day in &layout.days {
            assert!(
                !matches!(day.date.weekday(), Weekday::Sat | Weekday::Sun),
                "{} is a weekend",
                day.date
            );
            assert!(day.date >= start);
        }
        for pair in layout.days.windows(2) {
            let gap = (pair[1].date - pair[0].date).num_days();
            let expected = if pair[0].date.weekday() == Weekday::Fri { 3 } else { 1 };
            assert_eq!(gap, expected, "{} -> {}", pair[0].date, pair[1].date);
        }
        for week in &layout.weeks {
            let mut weekdays: Vec<u32> = week
                .days
                .iter()
                .map(|&i| layout.days[i].date.weekday().num_days_from_monday())
                .collect();
            weekdays.sort_unstable();
            weekdays.dedup();
            assert_eq!(weekdays.len(), 5, "week {} has repeated weekdays", week.number);
        }
    }
}

#[test]
fn weekend_start_rolls_to_monday() {
    let layout = layout(date(2025, 5, 3), 1);
    assert_eq!(layout.days[0].date, date(2025, 5, 5));
    assert_eq!(
        layout.cell(2, col::TIME_SLOT),
        Some(&CellValue::Text("Monday 2025-05-05".into()))
    );
}

#[test]
fn midweek_start_spans_weekend() {
    let layout = layout(date(2025, 5, 1), 1);
    let dates: Vec<NaiveDate> = layout.days.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 5, 1),
            date(2025, 5, 2),
            date(2025, 5, 5),
            date(2025, 5, 6),
            date(2025, 5, 7),
        ]
    );
    assert_eq!(layout.weeks[0].label, "Week 1 (2025-05-01 to 2025-05-07)");
}

#[test]
fn reference_example_one_week() {
    let layout = layout(date(2025, 4, 28), 1);
    assert_eq!(layout.row(1).unwrap().kind, RowKind::Header);
    assert_eq!(layout.row(2).unwrap().kind, RowKind::DateHeader);
    assert_eq!(layout.first_data_row(), Some(3));
    let headers: Vec<&str> = layout
        .days
        .iter()
        .map(|d| layout.cell(d.header_row, col::TIME_SLOT).and_then(CellValue::as_text).unwrap())
        .collect();
    assert_eq!(
        headers,
        vec![
            "Monday 2025-04-28",
            "Tuesday 2025-04-29",
            "Wednesday 2025-04-30",
            "Thursday 2025-05-01",
            "Friday 2025-05-02",
        ]
    );
    assert_eq!(layout.data_rows.len(), 40);
    assert_eq!(layout.weeks.len(), 1);
    assert_eq!(layout.monthly_summary_row, 53);
}

// ============================================================================
// PROPERTY 3: Cumulative chaining
// ============================================================================

#[test]
fn cumulative_result_chains_per_rule() {
    let layout = layout(date(2025, 4, 28), 2);
    let first = layout.first_data_row().unwrap();
    for link in &layout.data_rows {
        let formula = layout
            .cell(link.row, col::CUMULATIVE_RESULT)
            .and_then(CellValue::as_formula)
            .unwrap();
        let own = cell_ref(col::RESULT, link.row);
        match link.chain_from {
            None => {
                assert_eq!(link.row, first);
                assert_eq!(formula, format!("={own}"));
            }
            Some(prev) => {
                assert_eq!(formula, format!("={}+{own}", cell_ref(col::CUMULATIVE_RESULT, prev)));
                let day = &layout.days[link.day];
                if link.row == day.first_data_row {
                    let previous_day = &layout.days[link.day - 1];
                    assert_eq!(prev, previous_day.last_data_row);
                } else {
                    assert_eq!(prev, link.row - 1);
                }
                assert!(layout.row(prev).unwrap().kind.is_data());
            }
        }
    }
}

#[test]
fn previewed_cumulative_result_matches_running_sum() {
    let layout = layout(date(2025, 4, 28), 1);
    let mut inputs = TradeInputs::new();
    for (i, link) in layout.data_rows.iter().enumerate() {
        let value = Decimal::from(i as i64 % 5) - dec!(2);
        inputs = inputs.result(link.row, value);
    }
    let preview = evaluate(&layout, &inputs).unwrap();
    let mut running = Decimal::ZERO;
    for row in &preview.rows {
        running += row.result;
        assert_eq!(row.cumulative_result, running);
    }
}

// ============================================================================
// PROPERTY 4: Rollups reference rows above
// ============================================================================

#[test]
fn formulas_reference_only_rows_above_or_same_row() {
    let layout = layout(date(2025, 4, 28), 4);
    for row in &layout.rows {
        for value in row.cells.values() {
            if let CellValue::Formula(formula) = value {
                for referenced in referenced_rows(formula) {
                    assert!(
                        referenced <= row.number,
                        "row {} formula {} references row {}",
                        row.number,
                        formula,
                        referenced
                    );
                    if !row.kind.is_data() {
                        assert!(
                            referenced < row.number,
                            "summary row {} references itself",
                            row.number
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn summary_snapshots_copy_last_child() {
    let layout = layout(date(2025, 4, 28), 2);
    for day in &layout.days {
        assert_eq!(
            layout.cell(day.summary_row, col::BALANCE),
            Some(&CellValue::Formula(format!("=W{}", day.last_data_row)))
        );
    }
    for week in &layout.weeks {
        let last_day = &layout.days[*week.days.last().unwrap()];
        assert_eq!(
            layout.cell(week.summary_row, col::CUMULATIVE_RESULT),
            Some(&CellValue::Formula(format!("=U{}", last_day.summary_row)))
        );
    }
    let last_week = layout.weeks.last().unwrap();
    assert_eq!(
        layout.cell(layout.monthly_summary_row, col::RESULT),
        Some(&CellValue::Formula(format!("=T{}", last_week.summary_row)))
    );
}

// ============================================================================
// PROPERTY 5: No balance drift
// ============================================================================

#[test]
fn zero_result_rows_carry_balance_exactly() {
    let layout = layout(date(2025, 4, 28), 2);
    let inputs = TradeInputs::new()
        .risk(3, dec!(0.75))
        .result(3, dec!(1.3))
        .result(10, dec!(-0.7))
        .result(57, dec!(2.1));
    let preview = evaluate(&layout, &inputs).unwrap();
    for link in &layout.data_rows {
        let row = preview.row(link.row).unwrap();
        if row.result.is_zero() {
            let expected = link
                .chain_from
                .map_or(dec!(25000), |prev| preview.row(prev).unwrap().balance);
            assert_eq!(row.balance, expected, "row {} drifted", link.row);
        }
    }
}

// ============================================================================
// PROPERTY 6: Drawdown sign
// ============================================================================

#[test]
fn drawdown_follows_min_balance() {
    let layout = layout(date(2025, 4, 28), 1);
    let inputs = TradeInputs::new()
        .result(3, dec!(2))
        .result(5, dec!(-3))
        .result(7, dec!(4));
    let preview = evaluate(&layout, &inputs).unwrap();
    for row in &preview.rows {
        if row.min_balance == dec!(25000) {
            assert!(row.drawdown_pct.is_zero());
        } else {
            assert_eq!(
                row.drawdown_pct.is_sign_negative(),
                row.min_balance < dec!(25000),
                "row {}",
                row.row
            );
        }
    }
    assert_eq!(preview.row(5).unwrap().min_balance, dec!(24750));
    assert_eq!(preview.row(5).unwrap().drawdown_pct, dec!(-1));
}

// ============================================================================
// Dropdowns and highlight rules
// ============================================================================

#[test]
fn every_data_cell_has_dropdowns_and_highlights() {
    let layout = layout(date(2025, 4, 28), 1);
    for link in &layout.data_rows {
        for column in [
            col::ENTRY_TIME,
            col::EXIT_TIME,
            col::SIGNAL,
            col::STATUS,
            col::MOMENTUM,
            col::ENTER_TYPE,
            col::TRADE_TYPE,
            col::PLAN_ADHERENCE,
        ] {
            assert!(
                layout.validation_for(link.row, column).is_some(),
                "row {} col {}",
                link.row,
                column
            );
        }
        assert_eq!(layout.highlights_for(link.row, col::RESULT).len(), 2);
        assert_eq!(layout.highlights_for(link.row, col::STOP_LOSS).len(), 1);
    }
    assert!(layout.highlights_for(11, col::RESULT).is_empty());
}

#[test]
fn layout_serializes_to_json() {
    let layout = layout(date(2025, 4, 28), 1);
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["rows"].as_array().unwrap().len(), 53);
    assert_eq!(json["config"]["start_date"], "2025-04-28");
    assert_eq!(json["rows"][2]["kind"]["kind"], "data");
    assert!(json["days"][0]["date"].is_string());
}
