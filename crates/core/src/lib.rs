//! Wedding site domain logic.
//!
//! Pure functions and types with no I/O beyond in-memory image codecs:
//!
//! - [`site_data`]: the JSON site document, load normalization and save merge rules.
//! - [`collections`]: ordered lists inside the document (slides, story, gallery).
//! - [`uploads`]: upload directories, file naming and path containment.
//! - [`imaging`]: image optimization and thumbnails.
//! - [`payments`]: bank transfer accounts.
//! - [`blessings`]: guest blessing rules and paging.
//! - [`backups`]: backup naming and retention.

pub mod backups;
pub mod blessings;
pub mod collections;
pub mod error;
pub mod imaging;
pub mod payments;
pub mod site_data;
pub mod types;
pub mod uploads;
