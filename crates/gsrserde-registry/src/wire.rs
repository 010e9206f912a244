//! Schema registry wire frame.
//!
//! ```text
//! +---------+-------------+------------------------+---------+
//! | 0x03    | compression | schema version id (16) | body... |
//! +---------+-------------+------------------------+---------+
//! ```

use gsrserde_core::{RegistryError, HEADER_VERSION_BYTE};
use uuid::Uuid;

/// Compression byte for an uncompressed body.
pub const COMPRESSION_NONE: u8 = 0x00;
/// Compression byte for a zlib-compressed body.
pub const COMPRESSION_ZLIB: u8 = 0x05;

/// Header bytes before the body.
pub const HEADER_LEN: usize = 2 + 16;

/// A parsed registry frame, borrowing its body from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFrame<'a> {
    pub compression: u8,
    pub schema_version_id: Uuid,
    pub body: &'a [u8],
}

impl<'a> WireFrame<'a> {
    /// Parse and validate the frame header.
    pub fn parse(data: &'a [u8]) -> Result<Self, RegistryError> {
        if data.len() < HEADER_LEN {
            return Err(RegistryError::FrameTooShort {
                len: data.len(),
                min: HEADER_LEN,
            });
        }
        if data[0] != HEADER_VERSION_BYTE {
            return Err(RegistryError::UnknownHeaderVersion(data[0]));
        }
        let compression = data[1];
        if compression != COMPRESSION_NONE && compression != COMPRESSION_ZLIB {
            return Err(RegistryError::UnsupportedCompression(compression));
        }
        let schema_version_id = Uuid::from_slice(&data[2..HEADER_LEN])
            .map_err(|e| RegistryError::InvalidSchemaVersionId(e.to_string()))?;

        Ok(Self {
            compression,
            schema_version_id,
            body: &data[HEADER_LEN..],
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.compression == COMPRESSION_ZLIB
    }

    /// The body, if it is stored uncompressed.
    pub fn uncompressed_body(&self) -> Result<&'a [u8], RegistryError> {
        if self.is_compressed() {
            return Err(RegistryError::UnsupportedCompression(self.compression));
        }
        Ok(self.body)
    }

    /// Frame an uncompressed body.
    pub fn encode(schema_version_id: Uuid, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.push(HEADER_VERSION_BYTE);
        out.push(COMPRESSION_NONE);
        out.extend_from_slice(schema_version_id.as_bytes());
        out.extend_from_slice(body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_encoded_frame() {
        let id = Uuid::new_v4();
        let bytes = WireFrame::encode(id, br#"{"a":1}"#);
        assert_eq!(bytes[0], HEADER_VERSION_BYTE);
        assert_eq!(bytes.len(), HEADER_LEN + 7);

        let frame = WireFrame::parse(&bytes).unwrap();
        assert_eq!(frame.schema_version_id, id);
        assert!(!frame.is_compressed());
        assert_eq!(frame.uncompressed_body().unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn empty_body_is_legal() {
        let bytes = WireFrame::encode(Uuid::nil(), &[]);
        let frame = WireFrame::parse(&bytes).unwrap();
        assert!(frame.body.is_empty());
    }

    #[test]
    fn short_frame() {
        let err = WireFrame::parse(&[HEADER_VERSION_BYTE, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, RegistryError::FrameTooShort { len: 3, min: HEADER_LEN }));
    }

    #[test]
    fn wrong_header_byte() {
        let mut bytes = WireFrame::encode(Uuid::nil(), b"x");
        bytes[0] = 0x02;
        assert!(matches!(
            WireFrame::parse(&bytes).unwrap_err(),
            RegistryError::UnknownHeaderVersion(0x02)
        ));
    }

    #[test]
    fn unknown_compression() {
        let mut bytes = WireFrame::encode(Uuid::nil(), b"x");
        bytes[1] = 0x09;
        assert!(matches!(
            WireFrame::parse(&bytes).unwrap_err(),
            RegistryError::UnsupportedCompression(0x09)
        ));
    }

    #[test]
    fn zlib_frame_parses_but_body_is_rejected() {
        let mut bytes = WireFrame::encode(Uuid::nil(), b"x");
        bytes[1] = COMPRESSION_ZLIB;
        let frame = WireFrame::parse(&bytes).unwrap();
        assert!(frame.is_compressed());
        assert!(matches!(
            frame.uncompressed_body().unwrap_err(),
            RegistryError::UnsupportedCompression(COMPRESSION_ZLIB)
        ));
    }
}
