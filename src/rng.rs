/// Randomness plumbing.
///
/// Generation and encapsulation read their seeds from a caller-supplied
/// `std::io::Read`, so tests can pin the exact byte stream. `RngReader`
/// adapts any `rand_core::RngCore` (e.g. `OsRng`) to that interface.
use rand::rngs::OsRng;
use rand_core::RngCore;

pub struct RngReader<R: RngCore>(pub R);

impl<R: RngCore> std::io::Read for RngReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0
            .try_fill_bytes(buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        Ok(buf.len())
    }
}

/// Operating-system randomness as a byte stream.
pub fn os_rng() -> RngReader<OsRng> {
    RngReader(OsRng)
}
