//! Small shared utilities: fixed-delay retry and input debouncing.

pub mod debounce;
pub mod retry;

pub use debounce::Debouncer;
pub use retry::{retry_fixed, RetryPolicy};
