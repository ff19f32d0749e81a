#![no_std]

//! Shared utility library for the staking contracts
//!
//! This library provides the helpers used by both the commitment teller and
//! the reward vault:
//! - Math utilities (checked arithmetic, rational rates)
//! - Time utilities (timestamps, deadlines)
//! - Validation utilities (amounts, address kinds)
//! - Storage helpers (TTL extension)
//! - Access control patterns
//! - Cooldown helpers

pub mod access_control;
pub mod math;
pub mod rate_limiting;
pub mod storage;
pub mod time;
pub mod validation;


pub use access_control::{AccessControl, AccessError};
pub use math::SafeMath;
pub use rate_limiting::Cooldown;
pub use storage::Storage;
pub use time::TimeUtils;
pub use validation::Validation;
