//! Backup file naming and retention.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default number of backups kept on disk.
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Number of backups reported as "recent" by the stats endpoint.
pub const RECENT_BACKUPS: usize = 5;

const PREFIX: &str = "wedding-db_";
const SUFFIX: &str = ".db";

/// `wedding-db_{YYYYmmdd_HHMMSS}.db`
pub fn backup_filename(at: Timestamp) -> String {
    format!("{PREFIX}{}{SUFFIX}", at.format("%Y%m%d_%H%M%S"))
}

/// Accept only bare file names for restore requests.
pub fn validate_backup_filename(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(CoreError::Validation(format!(
            "Invalid backup file name '{name}'"
        )));
    }
    Ok(())
}

/// Split `newest_first` into the entries to keep and those to delete.
pub fn split_retention<T>(mut newest_first: Vec<T>, keep: usize) -> (Vec<T>, Vec<T>) {
    let expired = if newest_first.len() > keep {
        newest_first.split_off(keep)
    } else {
        Vec::new()
    };
    (newest_first, expired)
}

/// Size in megabytes with two decimals, as shown in the stats message.
pub fn format_megabytes(bytes: i64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}
