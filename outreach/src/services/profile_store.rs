//! Targeting profile persistence
//!
//! The profile is operator-editable JSON. Loading never fails: a missing or
//! unreadable file falls back to defaults. Saving is best effort.

use std::path::{Path, PathBuf};

use shared::{process_debug, process_warn, ProcessId, SharedError, TargetingProfile};
use tokio::fs;

use crate::error::{OutreachError, OutreachResult};

/// File name used inside the data directory
pub const PROFILE_FILE_NAME: &str = "targeting_profile.json";

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(PROFILE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the profile; `Ok(None)` when no file exists yet
    pub async fn try_load(&self) -> OutreachResult<Option<TargetingProfile>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut profile: TargetingProfile =
            serde_json::from_str(&content).map_err(|e| SharedError::DeserializationError {
                message: format!("{}: {e}", self.path.display()),
            })?;
        profile.connection_delay_range = profile.connection_delay_range.sanitized();
        Ok(Some(profile))
    }

    /// Read the profile, falling back to defaults on any problem
    ///
    /// A missing file is created with the defaults so the operator has something
    /// to edit; an unreadable one is left alone.
    pub async fn load(&self) -> TargetingProfile {
        match self.try_load().await {
            Ok(Some(profile)) => {
                process_debug!(ProcessId::current(), "🎯 Loaded targeting profile from {}", self.path.display());
                profile
            }
            Ok(None) => {
                process_debug!(
                    ProcessId::current(),
                    "🎯 No targeting profile at {}, writing defaults",
                    self.path.display()
                );
                let profile = TargetingProfile::default();
                self.save_best_effort(&profile).await;
                profile
            }
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Ignoring unreadable targeting profile: {}", e);
                TargetingProfile::default()
            }
        }
    }

    pub async fn save(&self, profile: &TargetingProfile) -> OutreachResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| OutreachError::storage(format!("write {}", self.path.display()), e))
    }

    /// Save, logging instead of failing
    pub async fn save_best_effort(&self, profile: &TargetingProfile) -> bool {
        match self.save(profile).await {
            Ok(()) => true,
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Could not save targeting profile: {}", e);
                false
            }
        }
    }
}
