//! Upload naming and storage layout.
//!
//! Every uploaded image lands under `public/images/{dir}/` in the site root.
//! The upload `type` sent by the admin form decides both the directory and
//! the stored file name; this module is the single source of those rules and
//! of the filename sanitizing that keeps client input inside the images root.

use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;

/// Extensions accepted for image uploads (lowercase).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Extensions that go through the optimizer after upload.
pub const OPTIMIZABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Default upload size limit (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Directory (relative to the site root) holding every uploaded image.
pub const IMAGES_ROOT: &str = "public/images";

/// Sub-directories created at startup.
pub const IMAGE_SUBDIRS: &[&str] = &[
    "gallery",
    "story",
    "couple",
    "qr",
    "banner",
    "thumbs",
    "background",
    "event",
    "general",
];

/// Upload types whose files are stored in `background/`.
const BACKGROUND_TYPES: &[&str] = &[
    "story-background",
    "bigevent-background",
    "giftregistry-background",
    "background",
];

/// Reduce a client-supplied file name to a safe basename.
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; whitespace becomes `_`;
/// everything before the last path separator is dropped and leading dots
/// are stripped so the result can never address a parent or hidden file.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Validate that `filename` carries an allowed image extension and return it.
pub fn validate_image_extension(filename: &str) -> Result<String, CoreError> {
    match extension_of(filename) {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        _ => Err(CoreError::Validation(format!(
            "Unsupported file format. Allowed: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        ))),
    }
}

/// Directory under the images root for an upload type.
pub fn upload_dir(upload_type: &str) -> &'static str {
    match upload_type {
        "banner" => "banner",
        "gallery" => "gallery",
        "story" => "story",
        "couple" | "groom" | "bride" => "couple",
        "event" => "event",
        "qr" | "groomQR" | "brideQR" => "qr",
        t if BACKGROUND_TYPES.contains(&t) => "background",
        _ => "general",
    }
}

/// Directory for the simple image endpoint, which only knows content types.
pub fn image_dir(upload_type: &str) -> &'static str {
    match upload_type {
        "story" | "gallery" | "couple" | "event" => upload_dir(upload_type),
        _ => "general",
    }
}

/// Directory for file listing and deletion by type.
pub fn listing_dir(upload_type: &str) -> &'static str {
    match upload_type {
        "story" | "gallery" | "couple" | "banner" | "qr" => upload_dir(upload_type),
        _ => "general",
    }
}

/// Stored file name for the main upload endpoint.
///
/// Couple portraits and QR codes use fixed names so a new upload replaces
/// the old file; banners keep the original stem for readability; anything
/// else is `{type}_{unix}.ext`.
pub fn upload_filename(upload_type: &str, original: &str, ext: &str, unix_secs: i64) -> String {
    match upload_type {
        "groom" => format!("groom_image.{ext}"),
        "bride" => format!("bride_image.{ext}"),
        "groomQR" => format!("groom_qr.{ext}"),
        "brideQR" => format!("bride_qr.{ext}"),
        "banner" => {
            let safe = secure_filename(original);
            let stem = safe.rsplit_once('.').map_or(safe.as_str(), |(stem, _)| stem);
            format!("banner_{unix_secs}_{stem}.{ext}")
        }
        other => format!("{}_{unix_secs}.{ext}", secure_filename(other)),
    }
}

/// Stored file name for a section background: `{type}_{8 hex}.ext`.
pub fn background_filename(upload_type: &str, ext: &str) -> String {
    let tag = short_hex();
    format!("{}_{tag}.{ext}", secure_filename(upload_type))
}

/// Stored file name for an uploaded payment QR code.
pub fn qr_filename(ext: &str, unix_secs: i64) -> String {
    format!("qr_{unix_secs}_{}.{ext}", short_hex())
}

/// Eight lowercase hex characters from a fresh v4 UUID.
fn short_hex() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Public URL of an uploaded file in the main upload style
/// (`./public/images/{dir}/{file}`).
pub fn relative_url(dir: &str, filename: &str) -> String {
    format!("./{IMAGES_ROOT}/{dir}/{filename}")
}

/// Public URL in the absolute style (`/public/images/{dir}/{file}`).
pub fn absolute_url(dir: &str, filename: &str) -> String {
    format!("/{IMAGES_ROOT}/{dir}/{filename}")
}

/// Resolve a public image URL to a path relative to the images root.
///
/// `/public/images/...` and `./public/images/...` keep their sub-path; any
/// other value is treated as a bare file name at the images root. Paths
/// that would escape the images root are rejected.
pub fn resolve_image_url(url: &str) -> Result<PathBuf, CoreError> {
    let prefixed = url
        .strip_prefix("./")
        .unwrap_or(url)
        .trim_start_matches('/')
        .strip_prefix(IMAGES_ROOT)
        .and_then(|rest| rest.strip_prefix('/'));

    let relative = match prefixed {
        Some(rest) => PathBuf::from(rest),
        None => {
            let base = url.rsplit(['/', '\\']).next().unwrap_or("");
            PathBuf::from(base)
        }
    };

    ensure_contained(&relative)?;
    Ok(relative)
}

/// Reject paths that are empty, absolute, or contain `..`.
pub fn ensure_contained(path: &Path) -> Result<(), CoreError> {
    let mut normal = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => {
                return Err(CoreError::Validation(format!(
                    "Path '{}' escapes the images directory",
                    path.display()
                )))
            }
        }
    }
    if normal == 0 {
        return Err(CoreError::Validation("Empty file path".to_string()));
    }
    Ok(())
}

/// Validate a bare file name received from a client (no directories).
pub fn validate_plain_filename(name: &str) -> Result<(), CoreError> {
    if name.is_empty()
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(CoreError::Validation(format!("Invalid file name '{name}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn secure_filename_strips_paths_and_oddities() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename(r"C:\photos\Our Day.JPG"), "Our_Day.JPG");
        assert_eq!(secure_filename(".hidden.png"), "hidden.png");
        assert_eq!(secure_filename("ảnh cưới.jpg"), "nh_ci.jpg");
    }

    #[test]
    fn extension_is_lowercased_and_checked() {
        assert_eq!(validate_image_extension("A.JPG").unwrap(), "jpg");
        assert_matches!(validate_image_extension("notes.txt"), Err(CoreError::Validation(_)));
        assert_matches!(validate_image_extension("noext"), Err(CoreError::Validation(_)));
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn directories_follow_upload_type() {
        assert_eq!(upload_dir("groom"), "couple");
        assert_eq!(upload_dir("brideQR"), "qr");
        assert_eq!(upload_dir("story-background"), "background");
        assert_eq!(upload_dir("banner"), "banner");
        assert_eq!(upload_dir("whatever"), "general");
        assert_eq!(image_dir("banner"), "general");
        assert_eq!(listing_dir("qr"), "qr");
        assert_eq!(listing_dir("event"), "general");
    }

    #[test]
    fn filenames_follow_upload_type() {
        assert_eq!(upload_filename("groom", "x.png", "png", 1), "groom_image.png");
        assert_eq!(upload_filename("groomQR", "x.png", "png", 1), "groom_qr.png");
        assert_eq!(
            upload_filename("banner", "Beach Sunset.JPG", "jpg", 1700000000),
            "banner_1700000000_Beach_Sunset.jpg"
        );
        assert_eq!(
            upload_filename("gallery", "whatever.png", "png", 1700000000),
            "gallery_1700000000.png"
        );
    }

    #[test]
    fn generated_names_carry_eight_hex_chars() {
        let name = background_filename("story-background", "webp");
        let tag = name
            .strip_prefix("story-background_")
            .and_then(|rest| rest.strip_suffix(".webp"))
            .unwrap();
        assert_eq!(tag.len(), 8);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));

        assert!(qr_filename("png", 5).starts_with("qr_5_"));
    }

    #[test]
    fn urls_use_both_styles() {
        assert_eq!(relative_url("banner", "a.jpg"), "./public/images/banner/a.jpg");
        assert_eq!(absolute_url("qr", "b.png"), "/public/images/qr/b.png");
    }

    #[test]
    fn resolve_image_url_accepts_known_prefixes() {
        assert_eq!(
            resolve_image_url("/public/images/story/a.jpg").unwrap(),
            PathBuf::from("story/a.jpg")
        );
        assert_eq!(
            resolve_image_url("./public/images/gallery/b.png").unwrap(),
            PathBuf::from("gallery/b.png")
        );
        assert_eq!(
            resolve_image_url("https://cdn.example.com/x/c.webp").unwrap(),
            PathBuf::from("c.webp")
        );
    }

    #[test]
    fn resolve_image_url_rejects_traversal() {
        assert_matches!(
            resolve_image_url("/public/images/../../data/wedding.db"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(resolve_image_url("/public/images/"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn plain_filenames_reject_separators() {
        assert!(validate_plain_filename("a.jpg").is_ok());
        assert!(validate_plain_filename("../a.jpg").is_err());
        assert!(validate_plain_filename("..").is_err());
        assert!(validate_plain_filename("").is_err());
    }
}
