use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed { remaining: usize },
    NotPresent,
}

/// Administrator ids, mirrored to a JSON array file.
///
/// The file is the source of truth: every read and mutation reloads it under
/// the lock, so edits made by another process (the offline CLI) are seen and
/// never overwritten. Every mutation rewrites the whole file. A failed write
/// leaves the in-memory set mutated and is reported to the caller.
pub struct AdminStore {
    path: PathBuf,
    admins: Mutex<Vec<UserId>>,
}

impl AdminStore {
    /// Read the admin file. A missing file is created from `seed`; an
    /// unreadable one is left on disk untouched and `seed` is used in
    /// memory.
    pub async fn load(path: impl Into<PathBuf>, seed: &[UserId]) -> Self {
        let path = path.into();
        let admins = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<UserId>>(&bytes) {
                Ok(list) => dedup(list),
                Err(e) => {
                    warn!(
                        "Failed to parse {}: {}; using seed admins",
                        path.display(),
                        e
                    );
                    dedup(seed.to_vec())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let admins = dedup(seed.to_vec());
                match persist(&path, &admins).await {
                    Ok(()) => info!(
                        "Created {} with {} seed admin(s)",
                        path.display(),
                        admins.len()
                    ),
                    Err(e) => warn!("Failed to create {}: {}", path.display(), e),
                }
                admins
            }
            Err(e) => {
                warn!("Failed to read {}: {}; using seed admins", path.display(), e);
                dedup(seed.to_vec())
            }
        };

        Self {
            path,
            admins: Mutex::new(admins),
        }
    }

    /// Strict variant of [`AdminStore::load`] for offline tools: a missing
    /// file is an empty set, an unreadable one is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let admins = match tokio::fs::read(&path).await {
            Ok(bytes) => dedup(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            admins: Mutex::new(admins),
        })
    }

    /// In-memory store that is never written. Used where the file is not
    /// wanted.
    pub fn ephemeral(admins: Vec<UserId>) -> Self {
        Self {
            path: PathBuf::new(),
            admins: Mutex::new(dedup(admins)),
        }
    }

    pub async fn contains(&self, id: UserId) -> bool {
        self.current().await.contains(&id)
    }

    pub async fn list(&self) -> Vec<UserId> {
        self.current().await.clone()
    }

    pub async fn add(&self, id: UserId) -> Result<AddOutcome, StoreError> {
        let mut admins = self.current().await;
        if admins.contains(&id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        admins.push(id);
        self.flush(&admins).await?;
        info!(admin_id = id, "Admin added");
        Ok(AddOutcome::Added)
    }

    pub async fn remove(&self, id: UserId) -> Result<RemoveOutcome, StoreError> {
        let mut admins = self.current().await;
        let Some(pos) = admins.iter().position(|a| *a == id) else {
            return Ok(RemoveOutcome::NotPresent);
        };
        admins.remove(pos);
        self.flush(&admins).await?;
        info!(admin_id = id, remaining = admins.len(), "Admin removed");
        if admins.is_empty() {
            warn!("Admin set is now empty; orders will not reach anyone");
        }
        Ok(RemoveOutcome::Removed {
            remaining: admins.len(),
        })
    }

    /// Lock the set and bring it in line with the file. A missing or
    /// unreadable file keeps the in-memory set.
    async fn current(&self) -> MutexGuard<'_, Vec<UserId>> {
        let mut admins = self.admins.lock().await;
        if self.path.as_os_str().is_empty() {
            return admins;
        }
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<UserId>>(&bytes) {
                Ok(list) => *admins = dedup(list),
                Err(e) => warn!("Failed to parse {}: {}", self.path.display(), e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read {}: {}", self.path.display(), e),
        }
        admins
    }

    async fn flush(&self, admins: &[UserId]) -> Result<(), StoreError> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        persist(&self.path, admins).await
    }
}

fn dedup(list: Vec<UserId>) -> Vec<UserId> {
    let mut out = Vec::with_capacity(list.len());
    for id in list {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Write to a sibling temp file, then rename over the target.
async fn persist(path: &Path, admins: &[UserId]) -> Result<(), StoreError> {
    let body = serde_json::to_vec(admins)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
