/// Key-exchange phase of the handshake
/// Key-share generation, per-handshake private-key storage, encapsulation to
/// a peer's key share, and the client and server drivers on top.

pub mod client;
pub mod encapsulate;
pub mod key_share;
pub mod keygen;
pub mod server;

// Re-export main types
pub use client::{ClientKeyExchange, KexPhase, KeyShare, PeerSelection, RetryDirective};
pub use encapsulate::{decapsulate_for_kem, encapsulate_for_kem};
pub use key_share::{ClassicalPrivateKey, ClientKeyShareStore, KemPrivateKey, PrivateKeyEntry};
pub use keygen::generate_kem_key_pair;
pub use server::{ServerDecision, ServerKeyExchange};
