use std::path::{Path, PathBuf};

use wedding_core::backups::DEFAULT_MAX_BACKUPS;
use wedding_core::uploads::{DEFAULT_MAX_UPLOAD_BYTES, IMAGES_ROOT, IMAGE_SUBDIRS};

/// Fallback couple details used when `settings` has no value.
#[derive(Debug, Clone)]
pub struct CoupleDefaults {
    pub groom_name: String,
    pub bride_name: String,
    pub contact_email: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running from the site checkout.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// SQLite URL (default: `sqlite://data/wedding.db`).
    pub database_url: String,
    /// Directory holding `index.html`, `admin.html` and `public/`.
    pub site_root: PathBuf,
    /// Where backup snapshots are written.
    pub backup_dir: PathBuf,
    /// Number of backups kept by retention.
    pub max_backups: usize,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Telegram Bot API base URL.
    pub telegram_api_base: String,
    pub couple_defaults: CoupleDefaults,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `5001`                     |
    /// | `DATABASE_URL`          | `sqlite://data/wedding.db` |
    /// | `SITE_ROOT`             | `.`                        |
    /// | `BACKUP_DIR`            | `data/backups`             |
    /// | `MAX_BACKUPS`           | `5`                        |
    /// | `MAX_UPLOAD_BYTES`      | `5242880`                  |
    /// | `CORS_ORIGINS`          | `*`                        |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `TELEGRAM_API_BASE`     | `https://api.telegram.org` |
    /// | `DEFAULT_GROOM_NAME`    | `Groom`                    |
    /// | `DEFAULT_BRIDE_NAME`    | `Bride`                    |
    /// | `DEFAULT_CONTACT_EMAIL` | (empty)                    |
    pub fn from_env() -> Self {
        let port: u16 = env_or("PORT", "5001")
            .parse()
            .expect("PORT must be a valid u16");

        let max_backups: usize = env_or("MAX_BACKUPS", &DEFAULT_MAX_BACKUPS.to_string())
            .parse()
            .expect("MAX_BACKUPS must be a valid usize");

        let max_upload_bytes: usize =
            env_or("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port,
            database_url: env_or("DATABASE_URL", "sqlite://data/wedding.db"),
            site_root: PathBuf::from(env_or("SITE_ROOT", ".")),
            backup_dir: PathBuf::from(env_or("BACKUP_DIR", "data/backups")),
            max_backups,
            max_upload_bytes,
            cors_origins,
            request_timeout_secs,
            telegram_api_base: env_or("TELEGRAM_API_BASE", "https://api.telegram.org"),
            couple_defaults: CoupleDefaults {
                groom_name: env_or("DEFAULT_GROOM_NAME", "Groom"),
                bride_name: env_or("DEFAULT_BRIDE_NAME", "Bride"),
                contact_email: env_or("DEFAULT_CONTACT_EMAIL", ""),
            },
        }
    }

    /// `{site_root}/public/images`
    pub fn images_root(&self) -> PathBuf {
        self.site_root.join(IMAGES_ROOT)
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }

    /// Create the backup directory, the image sub-directories and the
    /// directory holding the database file.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        if let Some(dir) = sqlite_parent_dir(&self.database_url) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::create_dir_all(&self.backup_dir)?;

        let images = self.images_root();
        for sub in IMAGE_SUBDIRS {
            std::fs::create_dir_all(images.join(sub))?;
        }
        Ok(())
    }
}

/// Directory part of a file-backed SQLite URL, if it has one.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}
