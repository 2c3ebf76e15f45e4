//! Opening the written workbook in the OS default application

use std::path::Path;
use tracing::{info, warn};

/// Hand `path` to the platform opener. Failures are logged and reported as
/// `false`; they never fail the command.
pub fn open_document(path: &Path) -> bool {
    match open::that(path) {
        Ok(()) => {
            info!(path = %path.display(), "opened workbook");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to open workbook");
            false
        }
    }
}
