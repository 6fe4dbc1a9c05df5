//! Service implementations
//!
//! Implementations of the traits in `crate::traits`: the HTTP, WebDriver and
//! file-backed services used in production, plus the manual clock and
//! in-memory log store used by tests and dry runs.

pub mod clock;
pub mod http_api;
pub mod log_store;
pub mod profile_store;
pub mod webdriver;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use clock::{ManualClock, SystemClock};
pub use http_api::{HttpContactDirectory, HttpOutreachChannel};
pub use log_store::{FileLogStore, MemoryLogStore};
pub use profile_store::ProfileStore;
pub use webdriver::{BrowserSelectors, WebDriverSession};
