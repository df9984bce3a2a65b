//! Repository access for DAK content
//!
//! [`DakRepository`] mirrors the GitHub contents API the workbench reads
//! from and commits to. [`LocalRepository`] implements it over a working
//! tree on disk, versioning files by the SHA-256 of their content.

use crate::{Result, SgexError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Location of a DAK repository at a branch or tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl RepositoryRef {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    /// Content version; empty for directories
    pub sha: String,
    pub download_url: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// Outcome of a create-or-update write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub path: String,
    /// Version of the file after the write
    pub sha: String,
    pub message: String,
    pub created: bool,
}

/// Read and write access to DAK repository content
#[async_trait::async_trait]
pub trait DakRepository: Send + Sync {
    /// Raw text of a file
    async fn get_file_content(&self, location: &RepositoryRef, path: &str) -> Result<String>;

    /// Entries of a directory, sorted by name
    async fn get_directory_contents(
        &self,
        location: &RepositoryRef,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>>;

    /// Create a file, or update it when `previous_sha` matches its current version
    async fn create_or_update_file(
        &self,
        location: &RepositoryRef,
        path: &str,
        content: &str,
        message: &str,
        previous_sha: Option<&str>,
    ) -> Result<CommitResult>;

    /// Delete a file whose current version is `sha`
    async fn delete_file(
        &self,
        location: &RepositoryRef,
        path: &str,
        message: &str,
        sha: &str,
    ) -> Result<()>;
}

/// Content version of a file
pub fn content_sha(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Repository backed by a local working tree
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a repository-relative path, refusing to leave the root
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(SgexError::invalid_argument(format!(
                        "path '{}' escapes the repository root",
                        path
                    )));
                }
            }
        }
        Ok(self.root.join(relative))
    }

    async fn current_sha(&self, full: &Path) -> Result<Option<String>> {
        match tokio::fs::read(full).await {
            Ok(bytes) => Ok(Some(content_sha(&bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SgexError::io_error(full, e)),
        }
    }
}

#[async_trait::async_trait]
impl DakRepository for LocalRepository {
    async fn get_file_content(&self, location: &RepositoryRef, path: &str) -> Result<String> {
        trace!(
            "Reading {}/{}@{}: {}",
            location.owner, location.repo, location.git_ref, path
        );
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SgexError::not_found(path)),
            Err(e) => Err(SgexError::io_error(full, e)),
        }
    }

    async fn get_directory_contents(
        &self,
        location: &RepositoryRef,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>> {
        trace!(
            "Listing {}/{}@{}: {}",
            location.owner, location.repo, location.git_ref, path
        );
        let full = self.resolve(path)?;
        let mut reader = match tokio::fs::read_dir(&full).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SgexError::not_found(path));
            }
            Err(e) => return Err(SgexError::io_error(full, e)),
        };

        let prefix = path.trim_matches('/');
        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| SgexError::io_error(&full, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let entry_path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SgexError::io_error(entry.path(), e))?;

            if file_type.is_dir() {
                entries.push(DirectoryEntry {
                    name,
                    path: entry_path,
                    sha: String::new(),
                    download_url: None,
                    entry_type: EntryType::Dir,
                });
            } else {
                let bytes = tokio::fs::read(entry.path())
                    .await
                    .map_err(|e| SgexError::io_error(entry.path(), e))?;
                entries.push(DirectoryEntry {
                    name,
                    path: entry_path,
                    sha: content_sha(&bytes),
                    download_url: Some(format!("file://{}", entry.path().display())),
                    entry_type: EntryType::File,
                });
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn create_or_update_file(
        &self,
        location: &RepositoryRef,
        path: &str,
        content: &str,
        message: &str,
        previous_sha: Option<&str>,
    ) -> Result<CommitResult> {
        let full = self.resolve(path)?;
        let current = self.current_sha(&full).await?;

        match (&current, previous_sha) {
            (Some(actual), Some(expected)) if actual != expected => {
                return Err(SgexError::Conflict {
                    path: path.to_string(),
                    expected: expected.to_string(),
                    actual: actual.clone(),
                });
            }
            (Some(actual), None) => {
                return Err(SgexError::Conflict {
                    path: path.to_string(),
                    expected: "<none>".to_string(),
                    actual: actual.clone(),
                });
            }
            (None, Some(_)) => return Err(SgexError::not_found(path)),
            _ => {}
        }

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SgexError::io_error(parent, e))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| SgexError::io_error(&full, e))?;

        debug!(
            "Committed {} to {}/{}@{}: {}",
            path, location.owner, location.repo, location.git_ref, message
        );
        Ok(CommitResult {
            path: path.to_string(),
            sha: content_sha(content.as_bytes()),
            message: message.to_string(),
            created: current.is_none(),
        })
    }

    async fn delete_file(
        &self,
        location: &RepositoryRef,
        path: &str,
        message: &str,
        sha: &str,
    ) -> Result<()> {
        let full = self.resolve(path)?;
        let Some(actual) = self.current_sha(&full).await? else {
            return Err(SgexError::not_found(path));
        };
        if actual != sha {
            return Err(SgexError::Conflict {
                path: path.to_string(),
                expected: sha.to_string(),
                actual,
            });
        }

        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| SgexError::io_error(&full, e))?;
        debug!(
            "Deleted {} from {}/{}@{}: {}",
            path, location.owner, location.repo, location.git_ref, message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tempfile::TempDir;

    fn location() -> RepositoryRef {
        RepositoryRef::new("WorldHealthOrganization", "smart-immunizations", "main")
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalRepository::new(temp_dir.path());

        let commit = repo
            .create_or_update_file(&location(), "input/fsh/a.fsh", "* #A \"A\"\n", "add", None)
            .await
            .unwrap();
        assert!(commit.created);
        assert_eq!(commit.sha, content_sha(b"* #A \"A\"\n"));

        let content = repo
            .get_file_content(&location(), "input/fsh/a.fsh")
            .await
            .unwrap();
        assert_eq!(content, "* #A \"A\"\n");
    }

    #[tokio::test]
    async fn test_update_requires_matching_sha() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalRepository::new(temp_dir.path());
        let first = repo
            .create_or_update_file(&location(), "a.fsh", "one", "add", None)
            .await
            .unwrap();

        let stale = repo
            .create_or_update_file(&location(), "a.fsh", "two", "edit", Some("deadbeef"))
            .await
            .unwrap_err();
        assert_eq!(stale.kind(), ErrorKind::Conflict);

        let blind = repo
            .create_or_update_file(&location(), "a.fsh", "two", "edit", None)
            .await
            .unwrap_err();
        assert_eq!(blind.kind(), ErrorKind::Conflict);

        let updated = repo
            .create_or_update_file(&location(), "a.fsh", "two", "edit", Some(&first.sha))
            .await
            .unwrap();
        assert!(!updated.created);
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("input/fsh/codesystems")).unwrap();
        std::fs::write(temp_dir.path().join("input/fsh/b.fsh"), "b").unwrap();
        std::fs::write(temp_dir.path().join("input/fsh/a.fsh"), "a").unwrap();
        let repo = LocalRepository::new(temp_dir.path());

        let entries = repo
            .get_directory_contents(&location(), "input/fsh")
            .await
            .unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.fsh", "b.fsh", "codesystems"]);
        assert_eq!(entries[0].path, "input/fsh/a.fsh");
        assert_eq!(entries[0].sha, content_sha(b"a"));
        assert_eq!(entries[2].entry_type, EntryType::Dir);
    }

    #[tokio::test]
    async fn test_delete_and_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalRepository::new(temp_dir.path());
        let commit = repo
            .create_or_update_file(&location(), "a.fsh", "one", "add", None)
            .await
            .unwrap();

        repo.delete_file(&location(), "a.fsh", "remove", &commit.sha)
            .await
            .unwrap();
        let err = repo
            .get_file_content(&location(), "a.fsh")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_root() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalRepository::new(temp_dir.path());
        let err = repo
            .get_file_content(&location(), "../secret.fsh")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
