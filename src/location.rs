//! Location acquisition policy.
//!
//! The comparison engine only consumes an optional user position. This module
//! decides when a cached fix can be reused and when repeated failures should
//! stop automatic retries and ask the user for an address instead.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::comparison::model::Coordinates;
use crate::config::LocationConfig;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current(&self) -> anyhow::Result<Coordinates>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationPolicy {
    pub freshness: time::Duration,
    pub timeout: Duration,
    pub max_failures: u32,
}

impl Default for LocationPolicy {
    fn default() -> Self {
        Self::from(&LocationConfig::default())
    }
}

impl From<&LocationConfig> for LocationPolicy {
    fn from(cfg: &LocationConfig) -> Self {
        Self {
            freshness: time::Duration::minutes(cfg.freshness_minutes),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_failures: cfg.max_failures.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coords: Coordinates,
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationOutcome {
    Resolved(Coordinates),
    /// Failed, but another automatic attempt is allowed.
    Retry,
    /// Failed too often for this destination; ask for a manual address or
    /// hand off to an external map.
    PromptManualAddress,
}

impl LocationOutcome {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationOutcome::Resolved(c) => Some(*c),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LocationTracker {
    policy: LocationPolicy,
    last_fix: Option<LocationFix>,
    failures: HashMap<String, u32>,
}

impl LocationTracker {
    pub fn new(policy: LocationPolicy) -> Self {
        Self {
            policy,
            last_fix: None,
            failures: HashMap::new(),
        }
    }

    /// The cached fix, if still within the freshness window.
    pub fn cached(&self, now: OffsetDateTime) -> Option<Coordinates> {
        self.last_fix
            .filter(|fix| now - fix.timestamp < self.policy.freshness)
            .map(|fix| fix.coords)
    }

    pub fn last_fix(&self) -> Option<LocationFix> {
        self.last_fix
    }

    pub fn record_success(&mut self, coords: Coordinates, at: OffsetDateTime) {
        self.last_fix = Some(LocationFix {
            coords,
            timestamp: at,
        });
        self.failures.clear();
    }

    pub fn record_failure(&mut self, destination: &str) -> LocationOutcome {
        let count = self.failures.entry(destination.to_string()).or_insert(0);
        *count += 1;
        if *count >= self.policy.max_failures {
            LocationOutcome::PromptManualAddress
        } else {
            LocationOutcome::Retry
        }
    }

    pub fn failures(&self, destination: &str) -> u32 {
        self.failures.get(destination).copied().unwrap_or(0)
    }

    /// Reuses a fresh fix or asks `provider`, bounded by the policy timeout.
    ///
    /// Once `destination` has hit the failure limit the provider is not
    /// called again until a fix succeeds.
    pub async fn resolve(
        &mut self,
        destination: &str,
        provider: &dyn LocationProvider,
        now: OffsetDateTime,
    ) -> LocationOutcome {
        if let Some(coords) = self.cached(now) {
            debug!(destination, "using cached location");
            return LocationOutcome::Resolved(coords);
        }
        if self.failures(destination) >= self.policy.max_failures {
            return LocationOutcome::PromptManualAddress;
        }

        match tokio::time::timeout(self.policy.timeout, provider.current()).await {
            Ok(Ok(coords)) => {
                self.record_success(coords, now);
                LocationOutcome::Resolved(coords)
            }
            Ok(Err(e)) => {
                warn!(error = %e, destination, "location request failed");
                self.record_failure(destination)
            }
            Err(_) => {
                warn!(destination, timeout = ?self.policy.timeout, "location request timed out");
                self.record_failure(destination)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;

    struct Fixed(Coordinates);

    #[async_trait]
    impl LocationProvider for Fixed {
        async fn current(&self) -> anyhow::Result<Coordinates> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct Denied {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LocationProvider for Denied {
        async fn current(&self) -> anyhow::Result<Coordinates> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("permission denied")
        }
    }

    struct Hangs;

    #[async_trait]
    impl LocationProvider for Hangs {
        async fn current(&self) -> anyhow::Result<Coordinates> {
            std::future::pending().await
        }
    }

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);

    #[test]
    fn cache_expires_after_freshness_window() {
        let mut t = LocationTracker::new(LocationPolicy::default());
        let here = Coordinates::new(-23.55, -46.63);
        t.record_success(here, NOW);
        assert_eq!(t.cached(NOW + time::Duration::minutes(9)), Some(here));
        assert_eq!(t.cached(NOW + time::Duration::minutes(10)), None);
    }

    #[test]
    fn second_failure_prompts_for_address() {
        let mut t = LocationTracker::new(LocationPolicy::default());
        assert_eq!(t.record_failure("market-1"), LocationOutcome::Retry);
        assert_eq!(t.record_failure("market-2"), LocationOutcome::Retry);
        assert_eq!(t.record_failure("market-1"), LocationOutcome::PromptManualAddress);
        assert_eq!(t.failures("market-1"), 2);

        t.record_success(Coordinates::new(0.0, 0.0), NOW);
        assert_eq!(t.failures("market-1"), 0);
    }

    #[tokio::test]
    async fn resolve_caches_success() {
        let mut t = LocationTracker::new(LocationPolicy::default());
        let here = Coordinates::new(1.0, 2.0);
        let out = t.resolve("list", &Fixed(here), NOW).await;
        assert_eq!(out.coordinates(), Some(here));

        // a failing provider is not consulted while the fix is fresh
        let denied = Denied::default();
        let out = t.resolve("list", &denied, NOW + time::Duration::minutes(1)).await;
        assert_eq!(out, LocationOutcome::Resolved(here));
        assert_eq!(denied.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolve_stops_retrying_after_limit() {
        let mut t = LocationTracker::new(LocationPolicy::default());
        let denied = Denied::default();
        assert_eq!(t.resolve("m1", &denied, NOW).await, LocationOutcome::Retry);
        assert_eq!(t.resolve("m1", &denied, NOW).await, LocationOutcome::PromptManualAddress);
        assert_eq!(t.resolve("m1", &denied, NOW).await, LocationOutcome::PromptManualAddress);
        assert_eq!(denied.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolve_times_out() {
        let policy = LocationPolicy {
            timeout: Duration::from_millis(20),
            ..LocationPolicy::default()
        };
        let mut t = LocationTracker::new(policy);
        let out = t.resolve("m1", &Hangs, NOW).await;
        assert_eq!(out, LocationOutcome::Retry);
        assert_eq!(out.coordinates(), None);
    }
}
