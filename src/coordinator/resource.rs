// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared model resource
//!
//! One [`ModelResource`] exists per coordinator. It owns the active model slot
//! behind a `tokio::sync::RwLock` and hands out scoped guards. Guards release
//! on drop, so every exit path of an operation gives access back.
//!
//! The tokio lock queues waiters in FIFO order: a pending writer blocks
//! readers that arrive after it, and writers are served in the order they
//! started waiting.

use super::errors::GatewayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Kind of access requested on the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State guarded by the resource lock
#[derive(Debug)]
pub struct ModelSlot<M> {
    /// Currently active model, if any has been loaded or committed
    pub active: Option<M>,
    /// Path the active model was loaded from
    pub source_path: Option<String>,
    /// Incremented on every committed install
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<M> ModelSlot<M> {
    fn empty() -> Self {
        Self {
            active: None,
            source_path: None,
            revision: 0,
            updated_at: None,
        }
    }

    /// Replaces the active model and bumps the revision
    pub fn install(&mut self, model: M, source_path: impl Into<String>) -> u64 {
        self.active = Some(model);
        self.source_path = Some(source_path.into());
        self.revision += 1;
        self.updated_at = Some(Utc::now());
        self.revision
    }
}

/// Non-blocking view of the resource used by health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Available,
    Busy,
}

/// Scoped access token on the model slot
pub enum ResourceGuard<'a, M> {
    Read(RwLockReadGuard<'a, ModelSlot<M>>),
    Write(RwLockWriteGuard<'a, ModelSlot<M>>),
}

impl<'a, M> ResourceGuard<'a, M> {
    pub fn access(&self) -> Access {
        match self {
            ResourceGuard::Read(_) => Access::Read,
            ResourceGuard::Write(_) => Access::Write,
        }
    }

    pub fn slot(&self) -> &ModelSlot<M> {
        match self {
            ResourceGuard::Read(guard) => guard,
            ResourceGuard::Write(guard) => guard,
        }
    }

    /// Mutable slot access; `None` for read guards
    pub fn slot_mut(&mut self) -> Option<&mut ModelSlot<M>> {
        match self {
            ResourceGuard::Read(_) => None,
            ResourceGuard::Write(guard) => Some(&mut **guard),
        }
    }

    /// Installs `model` as the active model. Requires write access.
    pub fn install(
        &mut self,
        model: M,
        source_path: impl Into<String>,
    ) -> Result<u64, GatewayError> {
        self.slot_mut()
            .map(|slot| slot.install(model, source_path))
            .ok_or(GatewayError::WriteAccessRequired)
    }
}

/// Revision and commit time of the active model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct ModelResource<M> {
    slot: RwLock<ModelSlot<M>>,
    lock_timeout: Option<Duration>,
}

impl<M> ModelResource<M> {
    /// Creates an empty resource. `lock_timeout` of `None` waits forever.
    pub fn new(lock_timeout: Option<Duration>) -> Self {
        Self {
            slot: RwLock::new(ModelSlot::empty()),
            lock_timeout,
        }
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout
    }

    pub async fn acquire(&self, access: Access) -> Result<ResourceGuard<'_, M>, GatewayError> {
        match access {
            Access::Read => self.read().await.map(ResourceGuard::Read),
            Access::Write => self.write().await.map(ResourceGuard::Write),
        }
    }

    pub async fn read(&self) -> Result<RwLockReadGuard<'_, ModelSlot<M>>, GatewayError> {
        match self.lock_timeout {
            None => Ok(self.slot.read().await),
            Some(limit) => tokio::time::timeout(limit, self.slot.read())
                .await
                .map_err(|_| GatewayError::ResourceBusy {
                    access: Access::Read.as_str(),
                    waited: limit,
                }),
        }
    }

    pub async fn write(&self) -> Result<RwLockWriteGuard<'_, ModelSlot<M>>, GatewayError> {
        match self.lock_timeout {
            None => Ok(self.slot.write().await),
            Some(limit) => tokio::time::timeout(limit, self.slot.write())
                .await
                .map_err(|_| GatewayError::ResourceBusy {
                    access: Access::Write.as_str(),
                    waited: limit,
                }),
        }
    }

    /// Revision and commit time of the active model, without waiting on
    /// the lock. `None` while a writer holds it.
    pub fn try_snapshot(&self) -> Option<SlotSnapshot> {
        self.slot.try_read().ok().map(|slot| SlotSnapshot {
            revision: slot.revision,
            updated_at: slot.updated_at,
        })
    }
}
