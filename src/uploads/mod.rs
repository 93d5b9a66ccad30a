use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Filename extensions accepted for uploaded images. The check is a
/// case-sensitive suffix match, so `photo.PNG` is rejected.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Prefix of every generated image filename.
const FILE_PREFIX: &str = "item-";

/// URL prefix the upload directory is served under.
pub const URL_PREFIX: &str = "/uploads/";

/// Returns the accepted extension of `file_name`, or `None` when the name
/// does not end in `.` plus one of [`ALLOWED_EXTENSIONS`].
pub fn image_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    ALLOWED_EXTENSIONS.iter().copied().find(|allowed| *allowed == ext)
}

/// Disk storage for uploaded images.
///
/// Files are written under `item-<ms-timestamp>.<ext>` inside `dir`, created
/// if missing. Stored filenames are always generated here; caller-supplied
/// names only contribute the extension.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `data` to a fresh timestamp-named file and returns the URL it
    /// is served at. A second save in the same millisecond bumps the stamp
    /// until an unused name is found; `create_new` keeps that check atomic.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> AppResult<String> {
        let ext = image_extension(original_name)
            .ok_or_else(|| AppError::BadRequest("Only image files are allowed!".to_string()))?;

        fs::create_dir_all(&self.dir).await?;

        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let file_name = format!("{FILE_PREFIX}{stamp}.{ext}");
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&file_name))
                .await
            {
                Ok(mut file) => {
                    file.write_all(data).await?;
                    // tokio files buffer internally; without this the bytes may
                    // land after the response does.
                    file.flush().await?;
                    debug!(file = %file_name, bytes = data.len(), "Stored image");
                    return Ok(format!("{URL_PREFIX}{file_name}"));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => stamp += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Removes the file a stored `imageUrl` points at. A file already gone
    /// from disk is not an error, and a URL outside `/uploads/` is ignored.
    pub async fn remove_by_url(&self, image_url: &str) -> AppResult<()> {
        let Some(file_name) = image_url.strip_prefix(URL_PREFIX) else {
            return Ok(());
        };
        match fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => {
                debug!(file = %file_name, "Removed image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use tempfile::tempdir;

    // ── Extension matching ─────────────────────────────────────────────────────

    #[test]
    fn accepts_the_four_image_extensions() {
        for name in ["a.jpg", "b.jpeg", "c.png", "d.gif"] {
            assert!(image_extension(name).is_some(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_other_extensions_and_bare_names() {
        for name in ["script.exe", "archive.tar.gz", "noext", "png", "photo.PNG", "x.jpg "] {
            assert!(image_extension(name).is_none(), "{name} should be rejected");
        }
    }

    #[test]
    fn matches_only_the_final_extension() {
        assert_eq!(image_extension("backup.tar.png"), Some("png"));
        assert_eq!(image_extension("image.png.exe"), None);
    }

    // ── Saving ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn save_writes_the_bytes_and_returns_an_uploads_url() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let url = store.save("photo.png", b"fake png bytes").await.unwrap();
        assert!(url.starts_with("/uploads/item-"), "unexpected url {url}");
        assert!(url.ends_with(".png"), "unexpected url {url}");

        let on_disk =
            std::fs::read(dir.path().join(url.strip_prefix("/uploads/").unwrap())).unwrap();
        assert_eq!(on_disk, b"fake png bytes");
    }

    #[tokio::test]
    async fn save_creates_the_directory_lazily() {
        let root = tempdir().unwrap();
        let dir = root.path().join("uploads");
        assert!(!dir.exists());

        let store = UploadStore::new(&dir);
        store.save("photo.jpg", b"jpg").await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn save_rejects_bad_extension_before_touching_disk() {
        let root = tempdir().unwrap();
        let dir = root.path().join("uploads");
        let store = UploadStore::new(&dir);

        let err = store.save("malware.exe", b"nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Only image files are allowed!");
        assert!(!dir.exists(), "rejected upload must not create the directory");
    }

    #[tokio::test]
    async fn rapid_saves_get_distinct_filenames() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        // A tight loop lands many saves in the same millisecond, so the stamp
        // bump is what keeps the names apart.
        let mut urls = HashSet::new();
        for _ in 0..20 {
            urls.insert(store.save("burst.gif", b"frame").await.unwrap());
        }
        assert_eq!(urls.len(), 20, "every save must get its own filename");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 20);
    }

    // ── Removal ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn remove_by_url_deletes_the_file() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let url = store.save("photo.png", b"bytes").await.unwrap();
        store.remove_by_url(&url).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn remove_by_url_tolerates_a_missing_file() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        store
            .remove_by_url("/uploads/item-1700000000000.png")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_by_url_ignores_urls_outside_uploads() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        store.remove_by_url("https://elsewhere.example/x.png").await.unwrap();
        store.remove_by_url("").await.unwrap();
    }
}
