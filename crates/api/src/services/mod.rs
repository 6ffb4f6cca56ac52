//! Operations shared by several handler modules.
//!
//! Handlers that mutate the site document or the backup set hold
//! [`AppState::write_lock`](crate::state::AppState::write_lock) while calling
//! into these modules; the functions here never take it themselves.

pub mod backup;
pub mod document;
pub mod files;
