//! Service-specific tests
//!
//! Each service has its own test file; file-backed services run against a
//! temporary directory, HTTP clients and the WebDriver session against a local mock server.


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use chrono::{DateTime, TimeZone, Utc};
    use shared::{OutreachRecord, OutreachStatus};

    /// Wednesday 6 March 2024, 10:00 UTC
    pub fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap()
    }

    pub fn sent(company: &str, person: &str, at: DateTime<Utc>) -> OutreachRecord {
        OutreachRecord::new(company, at, OutreachStatus::Sent)
            .with_person_id(person)
            .with_name(format!("Person {person}"))
    }
}
