/// Key Encapsulation Mechanisms
/// The `KemScheme` capability seam plus the bundled provider: X25519, P-256,
/// ML-KEM-768 (NIST FIPS 203), Kyber-512/768 (round 3), the hybrid
/// combiner and RFC 9180 DHKEM.
///
/// Every scheme is seed-driven: no scheme touches a randomness source itself.

pub mod dhkem;
pub mod hybrid;
pub mod kyber;
pub mod mlkem;
pub mod p256;
pub mod scheme;
pub mod types;
pub mod x25519;

// Re-export main types
pub use dhkem::DhKemX25519HkdfSha256;
pub use hybrid::HybridKem;
pub use kyber::{Kyber512Kem, Kyber768Kem};
pub use mlkem::MlKem768Kem;
pub use p256::P256Kem;
pub use scheme::KemScheme;
pub use types::{KemPublicKey, KemSecretKey, SharedSecret};
pub use x25519::X25519Kem;
