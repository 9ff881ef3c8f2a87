//! Share links and identity resolution.
//!
//! This module provides:
//! - The in-memory share link registry
//! - Resolution of a request's identity into an [`Authority`]

mod authority;
mod registry;

pub use authority::{Authority, EffectiveAuthority};
pub use registry::{
    generate_short_id, generate_token, Capability, CapabilityRegistry, Clock, Permission,
    SystemClock, DEFAULT_TTL_HOURS, MAX_TTL_HOURS,
};
