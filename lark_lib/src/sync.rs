pub mod mutex;
pub mod spinlock;
