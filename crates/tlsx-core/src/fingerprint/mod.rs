//! Fingerprints computed from decoded hellos.

pub mod grease;
pub mod ja3;

pub use ja3::{compute_ja3, compute_ja3s, Ja3Result};
