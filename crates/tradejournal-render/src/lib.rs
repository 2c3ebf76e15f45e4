//! # tradejournal-render
//!
//! Export backends for tradejournal layouts.
//!
//! This crate provides:
//! - XLSX workbooks with formulas, dropdowns and conditional fills
//!
//! ## Example
//!
//! ```rust,ignore
//! use tradejournal_core::{JournalConfig, JournalLayout, Renderer};
//! use tradejournal_render::ExcelRenderer;
//!
//! let config = JournalConfig::parse("2025-04-28", "25000", 4)?;
//! let layout = JournalLayout::build(&config);
//!
//! let xlsx_bytes = ExcelRenderer::new().render(&layout)?;
//! std::fs::write(config.default_file_name(), xlsx_bytes)?;
//! ```

pub mod excel;

pub use excel::ExcelRenderer;
