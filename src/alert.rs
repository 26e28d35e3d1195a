/// Handshake alert codes surfaced by the key-exchange layer.
///
/// Values are the TLS 1.3 `AlertDescription` wire bytes so the surrounding
/// handshake can forward them without translation.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlertCode {
    /// No mutually acceptable group could be negotiated.
    HandshakeFailure = 40,
    /// Peer sent a key share, ciphertext or group that is invalid for the negotiation.
    IllegalParameter = 47,
    /// Peer message could not be decoded.
    DecodeError = 50,
    /// Local failure unrelated to the peer (e.g. randomness source exhausted).
    InternalError = 80,
}

impl AlertCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            40 => Some(AlertCode::HandshakeFailure),
            47 => Some(AlertCode::IllegalParameter),
            50 => Some(AlertCode::DecodeError),
            80 => Some(AlertCode::InternalError),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertCode::HandshakeFailure => "handshake_failure",
            AlertCode::IllegalParameter => "illegal_parameter",
            AlertCode::DecodeError => "decode_error",
            AlertCode::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for AlertCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(AlertCode::HandshakeFailure.as_u8(), 40);
        assert_eq!(AlertCode::IllegalParameter.as_u8(), 47);
        assert_eq!(AlertCode::DecodeError.as_u8(), 50);
        assert_eq!(AlertCode::InternalError.as_u8(), 80);
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(AlertCode::from_u8(47), Some(AlertCode::IllegalParameter));
        assert_eq!(AlertCode::from_u8(80), Some(AlertCode::InternalError));
        assert_eq!(AlertCode::from_u8(0), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AlertCode::IllegalParameter.to_string(), "illegal_parameter (47)");
    }
}
