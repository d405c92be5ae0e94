//! Request-scoped workspace - the temporary files backing one PSI run.
//!
//! Every request gets a fresh [`Workspace`] keyed by a random
//! [`WorkspaceId`]. File paths are derived from the id, so concurrent
//! requests never touch each other's files. Cleanup is guaranteed:
//! [`Workspace::destroy`] removes the files explicitly, and a `Drop`
//! impl performs the same best-effort removal on any exit path that
//! skips it (error return, panic, task cancellation).

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Unique identifier for a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    /// Create a new random workspace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for WorkspaceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Where the receiver dataset comes from.
#[derive(Debug)]
pub enum ReceiverSource {
    /// Decoded receiver payload carried by the request; written into
    /// the workspace alongside the sender dataset.
    Inline(Vec<u8>),
    /// Preexisting file on disk, referenced but never copied or
    /// deleted by the workspace.
    Existing(PathBuf),
}

/// The temporary files backing one PSI run.
///
/// Owns `sender-<id>.csv` and `config-<id>.json` under the work
/// directory, plus `receiver-<id>.csv` when the request supplied a
/// receiver payload. Only files the workspace itself created are
/// removed on teardown.
pub struct Workspace {
    id: WorkspaceId,
    sender_path: PathBuf,
    receiver_path: PathBuf,
    config_path: PathBuf,
    /// Files this workspace created and must remove.
    owned: Vec<PathBuf>,
    created_at: DateTime<Utc>,
    cleaned: bool,
}

impl Workspace {
    /// Create a workspace under `work_dir` and write the request
    /// payloads into it.
    ///
    /// Files are opened with exclusive-create semantics: an already
    /// existing path fails instead of being overwritten, since that
    /// would mean an id collision or stale state from a crashed run.
    /// If any write fails, files created so far are removed before the
    /// error is returned.
    pub async fn create(
        work_dir: &Path,
        sender: &[u8],
        receiver: ReceiverSource,
        config: &serde_json::Value,
    ) -> Result<Self> {
        let id = WorkspaceId::new();
        tracing::debug!(workspace_id = %id, work_dir = %work_dir.display(), "Creating workspace");

        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|source| CoreError::WorkspaceIo {
                path: work_dir.to_path_buf(),
                source,
            })?;

        let mut owned = Vec::with_capacity(3);

        let sender_path = work_dir.join(format!("sender-{id}.csv"));
        if let Err(e) = write_new(&sender_path, sender).await {
            remove_all(&owned).await;
            return Err(e);
        }
        owned.push(sender_path.clone());

        let receiver_path = match receiver {
            ReceiverSource::Inline(bytes) => {
                let path = work_dir.join(format!("receiver-{id}.csv"));
                if let Err(e) = write_new(&path, &bytes).await {
                    remove_all(&owned).await;
                    return Err(e);
                }
                owned.push(path.clone());
                path
            }
            ReceiverSource::Existing(path) => {
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    remove_all(&owned).await;
                    return Err(CoreError::MissingInput(path));
                }
                path
            }
        };

        let config_path = work_dir.join(format!("config-{id}.json"));
        let config_bytes = match serde_json::to_vec(config) {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_all(&owned).await;
                return Err(e.into());
            }
        };
        if let Err(e) = write_new(&config_path, &config_bytes).await {
            remove_all(&owned).await;
            return Err(e);
        }
        owned.push(config_path.clone());

        tracing::debug!(
            workspace_id = %id,
            sender = %sender_path.display(),
            receiver = %receiver_path.display(),
            "Workspace created"
        );

        Ok(Self {
            id,
            sender_path,
            receiver_path,
            config_path,
            owned,
            created_at: Utc::now(),
            cleaned: false,
        })
    }

    /// Get the workspace ID.
    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    /// Path of the sender dataset file.
    pub fn sender_path(&self) -> &Path {
        &self.sender_path
    }

    /// Path of the receiver dataset file.
    pub fn receiver_path(&self) -> &Path {
        &self.receiver_path
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Remove all files this workspace created.
    ///
    /// Each removal is independently best-effort: one failure does not
    /// stop the others, and failures are logged rather than surfaced
    /// since they cannot change the outcome already computed.
    pub async fn destroy(mut self) {
        let lifetime_ms = (Utc::now() - self.created_at).num_milliseconds();
        tracing::debug!(workspace_id = %self.id, lifetime_ms, "Destroying workspace");
        for path in std::mem::take(&mut self.owned) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(
                    workspace_id = %self.id,
                    path = %path.display(),
                    error = %e,
                    "Failed to remove workspace file"
                );
            }
        }
        self.cleaned = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        // Fallback for exit paths that never reached destroy().
        for path in &self.owned {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(
                    workspace_id = %self.id,
                    path = %path.display(),
                    error = %e,
                    "Failed to remove workspace file on drop"
                );
            }
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("id", &self.id)
            .field("sender_path", &self.sender_path)
            .field("receiver_path", &self.receiver_path)
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Write `bytes` to `path`, failing if the path already exists.
async fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|source| CoreError::WorkspaceIo {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(bytes)
        .await
        .map_err(|source| CoreError::WorkspaceIo {
            path: path.to_path_buf(),
            source,
        })?;
    file.flush().await.map_err(|source| CoreError::WorkspaceIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Best-effort removal used when workspace creation fails part-way.
async fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}
