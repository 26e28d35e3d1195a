//! # Shield Key Exchange
//!
//! **Hybrid post-quantum KEM groups for the key-exchange phase of a
//! secure-transport handshake.**
//!
//! The handshake core keeps doing classical ECDHE for `x25519`/`secp256r1`.
//! Every other negotiated group id is looked up here and, if it names a KEM,
//! the key share is a KEM public key and the peer answers with a ciphertext:
//!
//! - **Group registry**: wire identifier → `'static` KEM scheme (pure, total)
//! - **Key-share generation** from an injected randomness stream
//! - **Per-handshake key store** tagged by group (classical or KEM)
//! - **Encapsulation / decapsulation** with the alert to send on failure
//! - **Client and server drivers** (offer, select, retry request)
//!
//! ## Quick Start
//!
//! ```rust
//! use shield_kex::config::KeyExchangeConfig;
//! use shield_kex::exchange::{ClientKeyExchange, PeerSelection, ServerDecision, ServerKeyExchange};
//! use shield_kex::groups::X25519_MLKEM768;
//! use shield_kex::rng::os_rng;
//!
//! let config = KeyExchangeConfig::default();
//! let server = ServerKeyExchange::new(&config).unwrap();
//!
//! let mut client = ClientKeyExchange::new();
//! let shares = client.offer(config.client_offer(), &mut os_rng()).unwrap();
//!
//! let decision = server.respond(&shares, &config.preferences, &mut os_rng()).unwrap();
//! if let ServerDecision::Accept { group, ciphertext, shared_secret } = decision {
//!     assert_eq!(group, X25519_MLKEM768);
//!     match client.on_server_share(group, &ciphertext).unwrap() {
//!         PeerSelection::Kem(secret) => assert_eq!(secret, shared_secret),
//!         PeerSelection::Classical(_) => unreachable!(),
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`groups`] | Named group ids and the group → KEM registry |
//! | [`kem`] | `KemScheme` seam; X25519, P-256, ML-KEM, Kyber, hybrid combiner, DHKEM |
//! | [`exchange`] | Key-share generation, key store, encapsulation, client/server drivers |
//! | [`config`] | Group preferences (serde / JSON) |
//! | [`alert`] | Alert codes reported to the handshake |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | Yes | Standard library support |
//! | `wasm` | No | WebAssembly support (`getrandom/js`) |

// Crate-level lint configuration: suppress stylistic warnings that don't affect correctness.
#![allow(
    clippy::empty_line_after_doc_comments,
    clippy::doc_lazy_continuation,
    unused_doc_comments
)]

// ── Public modules ──────────────────────────────────────────────────────────

/// Alert codes and their wire values.
pub mod alert;

/// Group preferences loaded from JSON.
pub mod config;

/// KEM, handshake, key-store and config errors.
pub mod error;

/// Key-exchange phase: key shares, key store, encapsulation, client and
/// server drivers.
pub mod exchange;

/// Named groups and the group → KEM registry.
pub mod groups;

/// Key encapsulation mechanisms.
pub mod kem;

/// Randomness adapters.
pub mod rng;

// ── Re-exports for convenience ──────────────────────────────────────────────

pub use alert::AlertCode;

pub use config::KeyExchangeConfig;

pub use error::{AlertError, ConfigError, KemError, KeyShareError, KexError};

pub use exchange::{
    decapsulate_for_kem, encapsulate_for_kem, generate_kem_key_pair, ClientKeyExchange,
    ClientKeyShareStore, KeyShare, PrivateKeyEntry, ServerDecision, ServerKeyExchange,
};

pub use groups::{resolve, GroupId};

pub use kem::{KemPublicKey, KemScheme, SharedSecret};

// ── Library metadata ────────────────────────────────────────────────────────

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
pub fn version() -> &'static str {
    VERSION
}

// ── Tests ───────────────────────────────────────────────────────────────────
