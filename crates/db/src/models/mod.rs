//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row, plus the `Deserialize` DTOs its endpoints accept.

pub mod backup;
pub mod blessing;
pub mod setting;
pub mod site_section;
pub mod telegram_config;
pub mod upload;
