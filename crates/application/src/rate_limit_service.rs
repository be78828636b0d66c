//! Rate limiting ports and application service.
//!
//! Implements a fixed-window request throttle keyed by
//! `"{action}:{identifier}"`. State lives in an injected
//! [`RateLimitStore`]; it is an abuse heuristic, not an authoritative limit.
//! Also hosts the [`debounce`] and [`throttle`] call-shaping helpers.

mod config;
mod debounce;
mod ports;
mod service;
mod throttle;

#[cfg(test)]
mod tests;

pub use config::RateLimitPolicies;
pub use debounce::{Debounced, debounce};
pub use ports::RateLimitStore;
pub use service::{ANONYMOUS_IDENTIFIER, RateLimitService};
pub use throttle::{Throttled, throttle};
