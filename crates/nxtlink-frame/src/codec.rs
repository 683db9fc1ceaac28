use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Envelope header: body length (2, little-endian).
pub const HEADER_SIZE: usize = 2;

/// Largest body a 16-bit length header can describe.
pub const MAX_BODY_LEN: usize = u16::MAX as usize;

/// Encode one packet into the stream envelope format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────┐
/// │ Length (2B)  │ Body             │
/// │ little-endian│ (Length bytes)   │
/// └──────────────┴──────────────────┘
/// ```
pub fn encode_envelope(body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLarge {
            size: body.len(),
            max: MAX_BODY_LEN,
        });
    }
    dst.reserve(HEADER_SIZE + body.len());
    dst.put_u16_le(body.len() as u16);
    dst.put_slice(body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_little_endian_length() {
        let mut buf = BytesMut::new();
        encode_envelope(&[0x00, 0x0B], &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x02, 0x00, 0x00, 0x0B]);
    }

    #[test]
    fn large_body_length_uses_both_bytes() {
        let body = vec![0xAA; 0x0123];
        let mut buf = BytesMut::new();
        encode_envelope(&body, &mut buf).unwrap();
        assert_eq!(&buf[..2], &[0x23, 0x01]);
        assert_eq!(buf.len(), HEADER_SIZE + body.len());
    }

    #[test]
    fn empty_body() {
        let mut buf = BytesMut::new();
        encode_envelope(b"", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x00, 0x00]);
    }

    #[test]
    fn body_too_large() {
        let body = vec![0u8; MAX_BODY_LEN + 1];
        let mut buf = BytesMut::new();
        let err = encode_envelope(&body, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::BodyTooLarge { size, .. } if size == MAX_BODY_LEN + 1));
        assert!(buf.is_empty());
    }
}
