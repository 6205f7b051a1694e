//! Filesystem note store: a local notes checkout laid out as `<category>/<file>.md`.

use std::path::{Component, Path, PathBuf};

use notecraft_core::workflow::NoteStore;
use notecraft_shared::{NotecraftError, Result};
use tracing::{debug, info};

/// [`NoteStore`] backed by a directory tree.
#[derive(Debug, Clone)]
pub(crate) struct FsNoteStore {
    root: PathBuf,
}

impl FsNoteStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store-relative path onto the root. Only plain relative paths are accepted.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !plain {
            return Err(NotecraftError::Store(format!(
                "note path '{path}' is outside the notes directory"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl NoteStore for FsNoteStore {
    async fn read_note(&self, path: &str) -> Result<Option<String>> {
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?full, "note does not exist yet");
                Ok(None)
            }
            Err(e) => Err(NotecraftError::io(full, e)),
        }
    }

    async fn write_note(&self, path: &str, content: &str, message: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| NotecraftError::io(parent, e))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| NotecraftError::io(&full, e))?;

        info!(path, message, "note written");
        Ok(())
    }

    async fn list_notes(&self) -> Result<Vec<String>> {
        let mut notes = Vec::new();
        if !tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(notes);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| NotecraftError::io(&dir, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| NotecraftError::io(&dir, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| NotecraftError::io(&path, e))?;

                if file_type.is_dir() {
                    // .git and friends
                    if !entry.file_name().to_string_lossy().starts_with('.') {
                        pending.push(path);
                    }
                } else if path.extension().is_some_and(|ext| ext == "md") {
                    if let Ok(relative) = path.strip_prefix(&self.root) {
                        notes.push(store_path(relative));
                    }
                }
            }
        }

        notes.sort();
        Ok(notes)
    }
}

/// `/`-separated form of a path relative to the store root.
fn store_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand a leading `~` in the configured notes directory.
pub(crate) fn resolve_notes_dir(raw: &str) -> Result<PathBuf> {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(raw)),
    };
    let home = dirs::home_dir()
        .ok_or_else(|| NotecraftError::config("could not determine home directory"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}
