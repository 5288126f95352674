//! Byte-level symbol mapping (GPT-2 style).
//!
//! BPE merge rules are expressed over strings, but the input is arbitrary UTF-8
//! bytes. Every byte value is therefore mapped to a printable Unicode character
//! so that any byte sequence can be handled as an ordinary string:
//!
//! - Bytes 33-126 (`!` to `~`) map to themselves
//! - Bytes 161-172 (`¡` to `¬`) map to themselves
//! - Bytes 174-255 (`®` to `ÿ`) map to themselves
//! - The remaining 68 bytes (0-32, 127-160, 173) map to U+0100 onwards, in
//!   ascending byte order
//!
//! Space (0x20) becomes `Ġ` (U+0120), which is why GPT-2 vocabularies are full
//! of tokens such as `Ġthe`.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// First code point handed out to non-printable bytes.
const REMAP_BASE: u32 = 256;

/// Bijection between byte values and printable symbol characters.
#[derive(Debug, Clone)]
pub struct ByteCodec {
    /// Byte to symbol (indexed by byte value)
    byte_encoder: [char; 256],
    /// Symbol to byte
    byte_decoder: AHashMap<char, u8>,
}

impl ByteCodec {
    /// Build the byte/symbol tables.
    pub fn new() -> Self {
        let byte_encoder = Self::build_byte_encoder();
        let byte_decoder = byte_encoder
            .iter()
            .enumerate()
            .map(|(byte, &ch)| (ch, byte as u8))
            .collect();

        Self {
            byte_encoder,
            byte_decoder,
        }
    }

    fn is_printable(byte: u8) -> bool {
        matches!(byte, b'!'..=b'~' | 0xA1..=0xAC | 0xAE..=0xFF)
    }

    fn build_byte_encoder() -> [char; 256] {
        let mut byte_encoder = ['\0'; 256];
        let mut next = REMAP_BASE;

        for byte in 0u8..=255 {
            let codepoint = if Self::is_printable(byte) {
                byte as u32
            } else {
                let remapped = next;
                next += 1;
                remapped
            };
            // Never exceeds U+0143, far below the surrogate range.
            byte_encoder[byte as usize] = char::from_u32(codepoint).unwrap_or('\0');
        }

        byte_encoder
    }

    /// Symbol for a byte. Total over all 256 values.
    #[inline]
    pub fn to_symbol(&self, byte: u8) -> char {
        self.byte_encoder[byte as usize]
    }

    /// Byte for a symbol, or `None` if `ch` is outside the mapping's image.
    #[inline]
    pub fn get_byte(&self, ch: char) -> Option<u8> {
        self.byte_decoder.get(&ch).copied()
    }

    /// Byte for a symbol.
    pub fn to_byte(&self, ch: char) -> Result<u8> {
        self.get_byte(ch).ok_or(TokenizerError::UnmappedSymbol(ch))
    }

    /// Map raw bytes to their symbol string.
    pub fn encode_bytes(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.to_symbol(b)).collect()
    }

    /// Map a symbol string back to raw bytes, appending to `out`.
    pub fn decode_into(&self, symbols: &str, out: &mut Vec<u8>) -> Result<()> {
        for ch in symbols.chars() {
            out.push(self.to_byte(ch)?);
        }
        Ok(())
    }

    /// Map a symbol string back to raw bytes.
    pub fn decode_symbols(&self, symbols: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(symbols.len());
        self.decode_into(symbols, &mut out)?;
        Ok(out)
    }

    /// The symbol standing for a space byte (`Ġ`).
    #[inline]
    pub fn whitespace_marker(&self) -> char {
        self.to_symbol(b' ')
    }
}

impl Default for ByteCodec {
    fn default() -> Self {
        Self::new()
    }
}
