//! Playable resource handles
//!
//! A [`ResourceHandle`] is a temporary, uniquely owned reference that lets a
//! media engine open the selected file. Handles are minted by a
//! [`ResourceBinder`] and released exactly once, when dropped. There is no
//! `Clone`: whoever holds the handle owns its lifetime.
//!
//! Replacing a pane's file drops its old handle before binding the new one;
//! tearing the pane down drops whatever it still holds.

use log::{trace, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::media::SourceFile;

#[derive(Debug, Default)]
struct BinderState {
    live: Mutex<HashSet<Uuid>>,
    created: AtomicU64,
    released: AtomicU64,
}

impl BinderState {
    fn release(&self, id: Uuid) {
        let removed = self.live.lock().unwrap_or_else(|e| e.into_inner()).remove(&id);
        if removed {
            self.released.fetch_add(1, Ordering::SeqCst);
            trace!("Released blob:{}", id);
        } else {
            warn!("Handle blob:{} released twice", id);
        }
    }
}

/// Mints playable handles and tracks which are live. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct ResourceBinder {
    state: Arc<BinderState>,
}

impl ResourceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new live handle for `file`
    pub fn bind(&self, file: &SourceFile) -> ResourceHandle {
        let id = Uuid::new_v4();
        self.state
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
        self.state.created.fetch_add(1, Ordering::SeqCst);
        trace!("Bound blob:{} -> {}", id, file.path().display());
        ResourceHandle {
            id,
            path: file.path().to_path_buf(),
            state: Arc::clone(&self.state),
        }
    }

    /// Handles bound and not yet released
    pub fn live_handles(&self) -> usize {
        self.state.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.state
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    pub fn created_count(&self) -> u64 {
        self.state.created.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> u64 {
        self.state.released.load(Ordering::SeqCst)
    }
}

/// Live playable handle. Released on drop.
#[derive(Debug)]
pub struct ResourceHandle {
    id: Uuid,
    path: PathBuf,
    state: Arc<BinderState>,
}

impl ResourceHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Blob-style URL naming this handle
    pub fn url(&self) -> String {
        format!("blob:{}", self.id)
    }

    /// File the handle resolves to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.state.release(self.id);
    }
}
