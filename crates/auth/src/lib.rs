//! # CampusGig Auth Crate
//!
//! Phone OTP sign-in and the identity claims handed to the rest of the
//! system after a successful authentication.

pub mod identity;
pub mod otp;
pub mod types;

// Re-export main types for convenience
pub use identity::IdentityClaims;
pub use otp::{LocalOtpProvider, OtpProvider, OtpService, SendOutcome, VerifyOutcome};
pub use types::{AuthError, AuthResult};
