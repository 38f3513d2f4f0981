use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::domain::CredentialId;

/// Surfaced when a credential's per-minute budget is spent; `retry_after_secs`
/// is the time left until the next window opens (always in 1..=60).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitExceeded {
    pub retry_after_secs: u64,
}

struct WindowSlot {
    bucket: i64,
    count: u32,
}

/// Fixed one-minute wall-clock windows keyed by credential.
///
/// Increment-and-check happens under a single lock shared by every request
/// handler, which is the only correctness-critical concurrency concern here.
/// Fixed windows permit up to a 2x burst at a boundary; acceptable for the
/// modest default budget of 60/min. Each credential keeps one slot that is
/// reset in place when its bucket rolls over, so stale windows never
/// accumulate.
#[derive(Default)]
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<CredentialId, WindowSlot>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one request against the credential's current window.
    pub fn check(
        &self,
        credential_id: CredentialId,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<(), RateLimitExceeded> {
        let bucket = now.timestamp().div_euclid(60);
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let slot = windows
            .entry(credential_id)
            .or_insert(WindowSlot { bucket, count: 0 });

        if slot.bucket != bucket {
            slot.bucket = bucket;
            slot.count = 0;
        }

        if slot.count >= limit {
            let retry_after_secs = (60 - now.timestamp().rem_euclid(60)) as u64;
            return Err(RateLimitExceeded { retry_after_secs });
        }

        slot.count += 1;
        Ok(())
    }
}
