//! Pauses between outreach attempts and between companies

use rand::Rng;
use shared::DelayRange;
use std::time::Duration;

/// How long to wait before the next action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// No pause at all
    None,
    /// The same pause every time
    Fixed(Duration),
    /// Uniformly random pause within inclusive bounds
    Random { min: Duration, max: Duration },
}

impl DelayPolicy {
    /// Fixed pause used by the directory strategy when notes are not personalised
    pub const DIRECTORY_DEFAULT: DelayPolicy = DelayPolicy::Fixed(Duration::from_secs(5));

    /// Default cooldown between two companies of a multi-company campaign
    pub fn company_cooldown() -> Self {
        DelayPolicy::Random {
            min: Duration::from_secs(10 * 60),
            max: Duration::from_secs(15 * 60),
        }
    }

    pub fn from_range(range: DelayRange) -> Self {
        let range = range.sanitized();
        DelayPolicy::Random {
            min: range.min(),
            max: range.max(),
        }
    }

    /// Draw the next pause
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            DelayPolicy::None => Duration::ZERO,
            DelayPolicy::Fixed(delay) => delay,
            DelayPolicy::Random { min, max } if min >= max => min,
            DelayPolicy::Random { min, max } => {
                let millis = rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
                Duration::from_millis(millis)
            }
        }
    }

    /// Draw a pause and wait it out on the tokio timer
    pub async fn pause(&self) -> Duration {
        let delay = self.next_delay(&mut rand::thread_rng());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
