//! Verdict Core
//!
//! Shared vocabulary for the verdict compliance engine: risk/decision enums
//! with their total order, typed identifiers, the canonical-encoding and
//! HMAC-SHA-256 signing primitives, and the traits behind which signal
//! producers and the evidence sideband live.
//!
//! Key features:
//! - Four-level risk hierarchy (Minimal < Limited < High < Unacceptable) with
//!   the single authoritative risk-to-decision table
//! - Deterministic canonicalization (sorted keys, explicit nulls,
//!   second-precision ISO-8601 UTC timestamps)
//! - Algorithm-tagged HMAC signatures with constant-time verification
//! - Three-outcome producer boundary (signal / absent / failed) so detector
//!   errors are data, never exceptions

pub mod canonical;
pub mod error;
pub mod signer;
pub mod traits;
pub mod types;

pub use canonical::*;
pub use error::*;
pub use signer::*;
pub use traits::*;
pub use types::*;
