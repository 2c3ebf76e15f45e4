//! Exit code semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: the requested output was produced |
//! | 1 | Failure: invalid input, or no workbook could be written |
//!
//! A launcher failure after a successful write does not change the exit code.

use std::process;

/// Exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: the requested output was produced
    Success = 0,
    /// Failure: nothing was produced
    Failure = 1,
}

impl ExitCode {
    /// Determine exit code from a command outcome
    pub fn from_outcome<T, E>(outcome: &Result<T, E>) -> Self {
        if outcome.is_ok() {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }

    /// Convert to std::process::ExitCode for main()
    pub fn to_process_exit_code(self) -> process::ExitCode {
        process::ExitCode::from(self as u8)
    }
}
