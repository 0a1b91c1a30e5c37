//! Rate limiting for calls to the shared asset renderer.

mod limiter;

pub use limiter::RateLimiter;
