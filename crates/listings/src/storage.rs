//! Image artifacts on disk.

use std::io;
use std::path::{Path, PathBuf};

use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use tokio::fs;
use tracing::{debug, warn};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

const MAX_EXTENSION_LEN: usize = 10;

/// The public uploads directory. Files are named `<cuid>.<original ext>`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, file_name: &str) -> io::Result<PathBuf> {
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name.starts_with('.')
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid image file name {file_name:?}"),
            ));
        }
        Ok(self.dir.join(file_name))
    }

    /// Write the upload under a generated name and return that name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> io::Result<String> {
        let file_name = generated_name(original_name);
        let path = self.path_of(&file_name)?;
        fs::write(&path, bytes).await?;
        debug!(file = %file_name, size = bytes.len(), "stored image");
        Ok(file_name)
    }

    /// Delete an image. An already missing file is not an error.
    pub async fn remove(&self, file_name: &str) -> io::Result<()> {
        let path = self.path_of(file_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file = %file_name, "removed image");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                warn!(file = %file_name, "image already absent");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

fn generated_name(original_name: &str) -> String {
    let id = CUID.create_id();
    match extension_of(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id,
    }
}

fn extension_of(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generated_name_keeps_extension() {
        let name = generated_name("Foto Casa.JPG");
        assert!(name.ends_with(".jpg"));
        assert_ne!(generated_name("a.png"), generated_name("a.png"));
    }

    #[test]
    fn suspicious_extensions_are_dropped() {
        assert_eq!(extension_of("archivo"), None);
        assert_eq!(extension_of("x.p/ng"), None);
        assert_eq!(extension_of("x.webp"), Some("webp".into()));
    }

    #[tokio::test]
    async fn save_then_remove_twice() {
        let temp_dir = TempDir::new().unwrap();
        let store = ImageStore::open(temp_dir.path().join("uploads")).await.unwrap();

        let name = store.save("casa.png", b"png-bytes").await.unwrap();
        let path = store.path_of(&name).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");

        store.remove(&name).await.unwrap();
        assert!(!path.exists());
        store.remove(&name).await.unwrap();
    }

    #[test]
    fn path_traversal_is_rejected() {
        let store = ImageStore {
            dir: PathBuf::from("uploads"),
        };
        assert!(store.path_of("../secret").is_err());
        assert!(store.path_of("").is_err());
    }
}
