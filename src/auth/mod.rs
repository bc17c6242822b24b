//! Auth Module
//!
//! Wallet sign-in: challenge issuance, signature proof, and bearer sessions
//! stored in the cache.

mod authenticator;
mod profile;
mod session;
pub mod signature;

pub use authenticator::{Challenge, SessionAuthenticator};
pub use profile::{AddressProfile, ProfileLoader};
pub use session::{generate_token, normalize_identity, Session};
pub use signature::WalletProof;
