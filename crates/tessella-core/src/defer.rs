//! Deferred notification counting.
//!
//! A single input gesture can cascade through several internal state
//! changes, each of which would normally raise its own notification. A
//! [`DeferralCounter`] batches these: while at least one scope is open,
//! notifications are marked pending instead of fired, and the caller fires a
//! single coalesced event when the counter returns to zero.
//!
//! # Example
//!
//! ```
//! use tessella_core::DeferralCounter;
//!
//! let defer = DeferralCounter::new();
//!
//! let (_, fire) = defer.scoped(|| {
//!     // several internal changes...
//!     defer.mark_pending();
//!     defer.mark_pending();
//! });
//! assert!(fire); // exactly one notification due
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counts nested deferral scopes and records whether a notification became
/// due while any scope was open.
#[derive(Debug, Default)]
pub struct DeferralCounter {
    level: AtomicUsize,
    pending: AtomicBool,
}

impl DeferralCounter {
    /// Creates a counter with no open scopes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether any deferral scope is currently open.
    pub fn is_deferred(&self) -> bool {
        self.level.load(Ordering::SeqCst) > 0
    }

    /// Records that the deferred notification should fire once the counter
    /// returns to zero. Outside any scope this is a no-op; callers should
    /// fire immediately in that case.
    pub fn mark_pending(&self) {
        if self.is_deferred() {
            self.pending.store(true, Ordering::SeqCst);
        }
    }

    /// Opens a scope around `f`.
    ///
    /// Returns `f`'s result and whether the coalesced notification is due:
    /// `true` only when this call closed the outermost scope and a
    /// notification was marked pending inside it.
    pub fn scoped<R>(&self, f: impl FnOnce() -> R) -> (R, bool) {
        self.level.fetch_add(1, Ordering::SeqCst);
        let result = f();
        let was_outermost = self.level.fetch_sub(1, Ordering::SeqCst) == 1;
        let fire = was_outermost && self.pending.swap(false, Ordering::SeqCst);
        (result, fire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_outside_scope_is_ignored() {
        let defer = DeferralCounter::new();
        defer.mark_pending();
        let (_, fire) = defer.scoped(|| {});
        assert!(!fire);
    }

    #[test]
    fn test_single_scope_coalesces() {
        let defer = DeferralCounter::new();
        let (_, fire) = defer.scoped(|| {
            defer.mark_pending();
            defer.mark_pending();
        });
        assert!(fire);
        // Pending state was consumed.
        let (_, fire) = defer.scoped(|| {});
        assert!(!fire);
    }

    #[test]
    fn test_nested_scopes_fire_at_outermost() {
        let defer = DeferralCounter::new();
        let (inner_fire, outer_fire) = {
            let ((_, inner), outer) = defer.scoped(|| {
                defer.scoped(|| {
                    defer.mark_pending();
                })
            });
            (inner, outer)
        };
        assert!(!inner_fire);
        assert!(outer_fire);
    }
}
