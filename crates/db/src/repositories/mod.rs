//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod backup_repo;
pub mod blessing_repo;
pub mod setting_repo;
pub mod site_data_repo;
pub mod telegram_config_repo;
pub mod upload_repo;

pub use backup_repo::BackupRepo;
pub use blessing_repo::BlessingRepo;
pub use setting_repo::SettingRepo;
pub use site_data_repo::SiteDataRepo;
pub use telegram_config_repo::TelegramConfigRepo;
pub use upload_repo::UploadRepo;
