//! Runtime configuration
//!
//! Endpoints and the data directory come from command line flags first, then
//! from `OUTREACH_*` environment variables (a `.env` file is loaded if present).

use std::path::PathBuf;
use std::sync::Arc;

use shared::{process_debug, ProcessId, TargetingProfile};

use crate::core::RateLimits;
use crate::error::OutreachResult;
use crate::services::{
    BrowserSelectors, FileLogStore, HttpContactDirectory, HttpOutreachChannel, ProfileStore, WebDriverSession,
};
use crate::strategies::{BrowserStrategy, DirectoryApiStrategy};

pub const ENV_DIRECTORY_URL: &str = "OUTREACH_DIRECTORY_URL";
pub const ENV_CHANNEL_URL: &str = "OUTREACH_CHANNEL_URL";
pub const ENV_API_TOKEN: &str = "OUTREACH_API_TOKEN";
pub const ENV_WEBDRIVER_URL: &str = "OUTREACH_WEBDRIVER_URL";
pub const ENV_DATA_DIR: &str = "OUTREACH_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachConfig {
    pub data_dir: PathBuf,
    pub directory_url: Option<String>,
    /// Falls back to `directory_url` when unset
    pub channel_url: Option<String>,
    pub api_token: Option<String>,
    pub webdriver_url: Option<String>,
    pub daily_limit: Option<u32>,
    pub weekly_limit: Option<u32>,
    pub browser_enabled: bool,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            directory_url: None,
            channel_url: None,
            api_token: None,
            webdriver_url: None,
            daily_limit: None,
            weekly_limit: None,
            browser_enabled: true,
        }
    }
}

impl OutreachConfig {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Self {
        // Already-set variables win over .env entries
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            data_dir: get(ENV_DATA_DIR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            directory_url: get(ENV_DIRECTORY_URL),
            channel_url: get(ENV_CHANNEL_URL),
            api_token: get(ENV_API_TOKEN),
            webdriver_url: get(ENV_WEBDRIVER_URL),
            ..defaults
        }
    }

    pub fn log_store(&self) -> FileLogStore {
        FileLogStore::in_dir(&self.data_dir)
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::in_dir(&self.data_dir)
    }

    /// Profile targets, overridden by explicit limits
    pub fn limits(&self, profile: &TargetingProfile) -> RateLimits {
        let base = RateLimits::from_profile(profile);
        RateLimits::new(
            self.daily_limit.unwrap_or(base.daily_limit),
            self.weekly_limit.unwrap_or(base.weekly_limit),
        )
    }

    /// Directory-API strategy, when a directory endpoint is configured
    pub fn directory_strategy(&self) -> OutreachResult<Option<DirectoryApiStrategy>> {
        let Some(directory_url) = self.directory_url.as_deref() else {
            process_debug!(ProcessId::current(), "No {} set; directory API strategy disabled", ENV_DIRECTORY_URL);
            return Ok(None);
        };
        let channel_url = self.channel_url.as_deref().unwrap_or(directory_url);

        let directory = HttpContactDirectory::new(directory_url, self.api_token.clone())?;
        let channel = HttpOutreachChannel::new(channel_url, self.api_token.clone())?;
        Ok(Some(DirectoryApiStrategy::new(Arc::new(directory), Arc::new(channel))))
    }

    /// Browser strategy plus its session (needed to close it afterwards)
    pub fn browser_strategy(&self) -> OutreachResult<Option<(BrowserStrategy, Arc<WebDriverSession>)>> {
        if !self.browser_enabled {
            return Ok(None);
        }
        let Some(webdriver_url) = self.webdriver_url.as_deref() else {
            process_debug!(ProcessId::current(), "No {} set; browser strategy disabled", ENV_WEBDRIVER_URL);
            return Ok(None);
        };
        let session = Arc::new(WebDriverSession::new(webdriver_url, BrowserSelectors::default())?);
        Ok(Some((BrowserStrategy::new(session.clone()), session)))
    }
}
