//! Pickup-shelf freshness
//!
//! Once an order is ready the clock starts. Levels are advisory and only
//! drive dashboard highlighting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Hot,
    Warm,
    /// Getting cold, call the customer
    Urgent,
}

impl Freshness {
    pub fn label_ja(self) -> &'static str {
        match self {
            Freshness::Hot => "できたて",
            Freshness::Warm => "少し冷め",
            Freshness::Urgent => "至急",
        }
    }
}

/// Thresholds in seconds since `ready_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessThresholds {
    pub warm_after_secs: i64,
    pub urgent_after_secs: i64,
}

impl Default for FreshnessThresholds {
    fn default() -> Self {
        Self {
            warm_after_secs: 5 * 60,
            urgent_after_secs: 10 * 60,
        }
    }
}

impl FreshnessThresholds {
    /// Warm from `warm_after_secs` inclusive, urgent strictly after
    /// `urgent_after_secs`.
    pub fn classify(&self, waiting_secs: i64) -> Freshness {
        if waiting_secs > self.urgent_after_secs {
            Freshness::Urgent
        } else if waiting_secs >= self.warm_after_secs {
            Freshness::Warm
        } else {
            Freshness::Hot
        }
    }
}
