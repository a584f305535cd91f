pub mod exclusive;
pub mod spinlock;

pub use exclusive::ExclusiveFlag;
pub use spinlock::{SpinLock, SpinLockGuard};
