use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod lots;
pub mod metrics;
pub mod scheduler;
pub mod session;

pub use config::Config;
pub use error::{ConfigError, FetchError};
pub use metrics::Metrics;
pub use scheduler::RefreshScheduler;
pub use session::Session;

/// A single lot on the auction house.
///
/// The API does not hand out a lot id, so `start_time` is what identifies a
/// lot for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub item_id: String,
    pub buyout_price: i64,
    #[serde(default)]
    pub amount: i32,
    pub start_time: String,
}

impl Listing {
    /// Price of a single unit, treating a missing or zero amount as 1
    pub fn unit_price(&self) -> i64 {
        self.buyout_price / i64::from(self.amount.max(1))
    }
}

/// The item/region pair a session is polling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub region: String,
    pub item_id: String,
}

impl Target {
    pub fn new(region: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            item_id: item_id.into(),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.region, self.item_id)
    }
}
