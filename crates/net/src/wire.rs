//! Fixed-width wire framing shared by every channel.
//!
//! There are no length prefixes anywhere in this protocol: field numbers are
//! always exactly `field_width` little-endian bytes, and the one-time name
//! handshake done on connect is always exactly [`NAME_SIZE_LIMIT`] bytes,
//! zero-padded.

use crate::errors::NetError;

/// The fixed width, in bytes, of a connection's name handshake buffer.
pub const NAME_SIZE_LIMIT: usize = 128;

/// Encodes a party name into a zero-padded, fixed-width handshake buffer.
pub fn encode_name(name: &str) -> Result<[u8; NAME_SIZE_LIMIT], NetError> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_SIZE_LIMIT {
        return Err(NetError::UnknownPeer(name.to_string()));
    }
    let mut buf = [0u8; NAME_SIZE_LIMIT];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

/// Decodes a zero-padded handshake buffer back into a party name.
pub fn decode_name(buf: &[u8; NAME_SIZE_LIMIT]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_short_name() {
        let encoded = encode_name("server").unwrap();
        assert_eq!(encoded.len(), NAME_SIZE_LIMIT);
        assert_eq!(decode_name(&encoded), "server");
    }

    #[test]
    fn rejects_names_longer_than_the_limit() {
        let long_name = "a".repeat(NAME_SIZE_LIMIT + 1);
        assert!(encode_name(&long_name).is_err());
    }
}
