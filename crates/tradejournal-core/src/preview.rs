//! Preview evaluation of the journal's derived columns
//!
//! Replays the chaining rules of the generated formulas over sample inputs,
//! using exact decimal arithmetic. Walks [`JournalLayout::data_rows`] in
//! order, so a row always continues from the same row its formulas
//! reference.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::layout::{JournalLayout, DEFAULT_RESULT_R};
use crate::JournalError;

/// User-entered values keyed by row number. Missing rows use placeholders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradeInputs {
    results: BTreeMap<u32, Decimal>,
    max_rewards: BTreeMap<u32, Decimal>,
    /// Keyed by the slot's first row
    risks: BTreeMap<u32, Decimal>,
}

impl TradeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Result (R) of a data row
    pub fn result(mut self, row: u32, value: Decimal) -> Self {
        self.results.insert(row, value);
        self
    }

    /// Set Max Reward (R) of a data row
    pub fn max_reward(mut self, row: u32, value: Decimal) -> Self {
        self.max_rewards.insert(row, value);
        self
    }

    /// Set Risk (%) of the slot starting at `slot_row`
    pub fn risk(mut self, slot_row: u32, value: Decimal) -> Self {
        self.risks.insert(slot_row, value);
        self
    }
}

/// Derived values of one data row
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowPreview {
    pub row: u32,
    pub result: Decimal,
    pub cumulative_result: Decimal,
    pub cumulative_max_reward: Decimal,
    pub balance: Decimal,
    pub max_reward_balance: Decimal,
    pub min_balance: Decimal,
    pub max_balance: Decimal,
    pub drawdown_pct: Decimal,
}

/// What a daily summary row would show
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayPreview {
    pub date: NaiveDate,
    pub summary_row: u32,
    pub result_total: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub rows: Vec<RowPreview>,
    pub days: Vec<DayPreview>,
}

impl Preview {
    pub fn row(&self, row: u32) -> Option<&RowPreview> {
        self.rows.iter().find(|r| r.row == row)
    }

    /// Balance after the last data row
    pub fn final_balance(&self) -> Option<Decimal> {
        self.rows.last().map(|r| r.balance)
    }
}

/// Evaluate the derived columns of `layout` for `inputs`
pub fn evaluate(layout: &JournalLayout, inputs: &TradeInputs) -> Result<Preview, JournalError> {
    for &row in inputs.results.keys().chain(inputs.max_rewards.keys()) {
        if layout.data_link(row).is_none() {
            return Err(JournalError::InvalidInput(format!("row {row} is not a data row")));
        }
    }
    for &row in inputs.risks.keys() {
        if !layout.data_rows.iter().any(|link| link.slot_start_row == row) {
            return Err(JournalError::InvalidInput(format!(
                "row {row} does not start a time slot"
            )));
        }
    }

    let capital = layout.config.initial_capital;
    let hundred = Decimal::ONE_HUNDRED;
    let default_risk = Decimal::ONE;
    let default_result = Decimal::try_from(DEFAULT_RESULT_R).unwrap_or_default();

    let mut computed: BTreeMap<u32, RowPreview> = BTreeMap::new();
    let mut rows = Vec::with_capacity(layout.data_rows.len());

    for link in &layout.data_rows {
        let result = inputs.results.get(&link.row).copied().unwrap_or(default_result);
        let max_reward = inputs.max_rewards.get(&link.row).copied().unwrap_or(Decimal::ZERO);
        let risk = inputs.risks.get(&link.slot_start_row).copied().unwrap_or(default_risk);
        let overflow =
            || JournalError::InvalidInput(format!("row {} overflows the balance", link.row));

        let prev = link.chain_from.and_then(|r| computed.get(&r));
        let step = |previous: Decimal, driver: Decimal| {
            if driver.is_zero() {
                return Ok(previous);
            }
            driver
                .checked_mul(capital)
                .and_then(|v| v.checked_mul(risk))
                .and_then(|v| v.checked_div(hundred))
                .and_then(|v| previous.checked_add(v))
                .ok_or_else(overflow)
        };

        let balance = step(prev.map_or(capital, |p| p.balance), result)?;
        let max_reward_balance = step(prev.map_or(capital, |p| p.max_reward_balance), max_reward)?;
        let min_balance = prev.map_or(balance, |p| p.min_balance.min(balance));
        let max_balance = prev.map_or(balance, |p| p.max_balance.max(balance));
        let drawdown_pct = if min_balance == capital {
            Decimal::ZERO
        } else {
            min_balance
                .checked_sub(capital)
                .and_then(|v| v.checked_div(capital))
                .and_then(|v| v.checked_mul(hundred))
                .ok_or_else(overflow)?
        };
        let cumulative_result = prev
            .map_or(Decimal::ZERO, |p| p.cumulative_result)
            .checked_add(result)
            .ok_or_else(overflow)?;
        let cumulative_max_reward = prev
            .map_or(Decimal::ZERO, |p| p.cumulative_max_reward)
            .checked_add(max_reward)
            .ok_or_else(overflow)?;

        let preview = RowPreview {
            row: link.row,
            result,
            cumulative_result,
            cumulative_max_reward,
            balance,
            max_reward_balance,
            min_balance,
            max_balance,
            drawdown_pct,
        };
        computed.insert(link.row, preview.clone());
        rows.push(preview);
    }

    let mut days = Vec::with_capacity(layout.days.len());
    for day in &layout.days {
        let day_rows: Vec<&RowPreview> = rows
            .iter()
            .filter(|r| (day.first_data_row..=day.last_data_row).contains(&r.row))
            .collect();
        let Some(closing) = day_rows.last() else {
            continue;
        };
        let result_total = day_rows
            .iter()
            .try_fold(Decimal::ZERO, |total, r| total.checked_add(r.result))
            .ok_or_else(|| {
                JournalError::InvalidInput(format!("day {} overflows the result total", day.date))
            })?;
        days.push(DayPreview {
            date: day.date,
            summary_row: day.summary_row,
            result_total,
            closing_balance: closing.balance,
        });
    }

    Ok(Preview { rows, days })
}
