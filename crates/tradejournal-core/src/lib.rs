//! # tradejournal-core
//!
//! Layout and formula engine for the tradejournal spreadsheet generator.
//!
//! This crate provides:
//! - The fixed 36-column schema and dropdown option sets
//! - `JournalLayout`: the complete grid description (cells, formulas,
//!   merges, dropdowns, highlight rules) built in one pass from a `JournalConfig`
//! - A preview evaluator replaying the formula chaining over sample inputs
//! - The `Renderer` trait implemented by export backends
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use tradejournal_core::{JournalConfig, JournalLayout};
//!
//! let config = JournalConfig::parse("2025-04-28", "25000", 1).unwrap();
//! let layout = JournalLayout::build(&config);
//!
//! assert_eq!(layout.row_count(), JournalLayout::expected_row_count(1));
//! assert_eq!(layout.first_data_row(), Some(3));
//! ```

pub mod columns;
pub mod config;
pub mod highlight;
pub mod layout;
pub mod options;
pub mod preview;

pub use columns::{col, ColumnDef, ColumnRole, COLUMNS, COLUMN_COUNT};
pub use config::{JournalConfig, JournalSettings};
pub use highlight::{HighlightCondition, HighlightRule, Tone};
pub use layout::{
    CellRange, CellValue, DataRowLink, DayBlock, JournalLayout, LayoutRow, RowKind, Validation,
    WeekBlock,
};
pub use options::{TimeSlot, TIME_SLOTS};
pub use preview::{Preview, TradeInputs};

use thiserror::Error;

// ============================================================================
// Traits
// ============================================================================

/// Export backend turning a layout into a document
pub trait Renderer {
    type Output;

    /// Render the journal layout to the output format
    fn render(&self, layout: &JournalLayout) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid generation input
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Invalid date format '{0}': expected YYYY-MM-DD")]
    InvalidStartDate(String),

    #[error("Number of weeks must be between 1 and 4, got {0}")]
    WeeksOutOfRange(u32),

    #[error("Initial capital must be a positive number, got '{0}'")]
    InvalidCapital(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
