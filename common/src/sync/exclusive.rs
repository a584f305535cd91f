use core::sync::atomic::{AtomicBool, Ordering};

/// A binary ownership flag that is claimed without waiting.
///
/// Unlike [`SpinLock`](super::SpinLock) there is no guard: ownership is
/// held across calls (for example from `open` until `close` of a device
/// file), so the holder releases it explicitly.
///
/// Contended acquisition never spins; it reports failure immediately.
#[derive(Debug, Default)]
pub struct ExclusiveFlag {
    held: AtomicBool,
}

impl ExclusiveFlag {
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Claims the flag. Returns `false` if it is already held.
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Releases the flag unconditionally.
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let flag = ExclusiveFlag::new();
        assert!(flag.try_acquire());
        assert!(!flag.try_acquire());
        assert!(flag.is_held());

        flag.release();
        assert!(!flag.is_held());
        assert!(flag.try_acquire());
    }

    #[test]
    fn release_of_free_flag_is_harmless() {
        let flag = ExclusiveFlag::new();
        flag.release();
        assert!(flag.try_acquire());
    }
}
