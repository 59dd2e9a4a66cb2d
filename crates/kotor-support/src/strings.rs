use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use encoding_rs::WINDOWS_1252;
use std::io::{self, Read, Write};

/// Failed to decode a string as WINDOWS-1252.
///
/// This means that the resource contained a string that could not be decoded using the
/// WINDOWS-1252 code page.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("could not decode string as WINDOWS-1252")]
pub struct DecodeStringError;

/// Failed to encode a string as WINDOWS-1252.
///
/// This means that a string contained characters that the WINDOWS-1252 code page cannot
/// represent.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("could not encode string as WINDOWS-1252")]
pub struct EncodeStringError;

/// Failed to read a string.
#[derive(Debug, thiserror::Error)]
pub enum ReadStringError {
    /// Failed to read a string because the bytes could not be decoded.
    #[error(transparent)]
    DecodeStringError(#[from] DecodeStringError),
    /// Failed to read a string because the underlying I/O failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// Failed to write a string.
#[derive(Debug, thiserror::Error)]
pub enum WriteStringError {
    /// Failed to write a string because it could not be encoded.
    #[error(transparent)]
    EncodeStringError(#[from] EncodeStringError),
    /// Failed to write a string because the underlying I/O failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// Decode a string using the WINDOWS-1252 code page.
pub fn decode_str(bytes: &[u8]) -> Result<String, DecodeStringError> {
    if bytes.is_empty() {
        return Ok("".to_string());
    }

    let (decoded, _enc, failed) = WINDOWS_1252.decode(bytes);
    if failed {
        Err(DecodeStringError)
    } else {
        Ok(decoded.to_string())
    }
}

/// Encode a string using the WINDOWS-1252 code page.
pub fn encode_str(string: &str) -> Result<Vec<u8>, EncodeStringError> {
    let (bytes, _enc, failed) = WINDOWS_1252.encode(string);
    if failed {
        Err(EncodeStringError)
    } else {
        Ok(bytes.into_owned())
    }
}

/// Extension trait for reading the string layouts used by BioWare resource files.
pub trait ReadStringsExt: Read {
    /// Read a fixed-size, optionally null-terminated WINDOWS-1252 string of `length` bytes.
    ///
    /// Lengths come from untrusted files, so the buffer only grows as data actually arrives.
    fn read_fixed_str(&mut self, length: usize) -> Result<String, ReadStringError> {
        let mut bytes = vec![];
        (&mut *self).take(length as u64).read_to_end(&mut bytes)?;
        if bytes.len() != length {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        if let Some(end) = bytes.iter().position(|&byte| byte == 0) {
            bytes.truncate(end);
        }
        Ok(decode_str(&bytes)?)
    }

    /// Read an u8 length, then a WINDOWS-1252 string of that many bytes.
    fn read_u8_length_prefixed_str(&mut self) -> Result<String, ReadStringError> {
        let len = self.read_u8()? as usize;
        self.read_fixed_str(len)
    }

    /// Read an u32 length, then a WINDOWS-1252 string of that many bytes.
    fn read_u32_length_prefixed_str(&mut self) -> Result<String, ReadStringError> {
        let len = self.read_u32::<LE>()? as usize;
        self.read_fixed_str(len)
    }
}

impl<T> ReadStringsExt for T where T: Read {}

/// Extension trait for writing the string layouts used by BioWare resource files.
pub trait WriteStringsExt: Write {
    /// Write a string into a fixed-size field, padding with NULL bytes.
    ///
    /// Strings that do not fit are an encoding error.
    fn write_fixed_str(&mut self, string: &str, length: usize) -> Result<(), WriteStringError> {
        let mut bytes = encode_str(string)?;
        if bytes.len() > length {
            return Err(EncodeStringError.into());
        }
        bytes.resize(length, 0);
        self.write_all(&bytes)?;
        Ok(())
    }

    /// Write the length as an u8, followed by the encoded bytes.
    fn write_u8_length_prefixed_str(&mut self, string: &str) -> Result<(), WriteStringError> {
        let bytes = encode_str(string)?;
        if bytes.len() > u8::MAX as usize {
            return Err(EncodeStringError.into());
        }
        self.write_u8(bytes.len() as u8)?;
        self.write_all(&bytes)?;
        Ok(())
    }

    /// Write the length as an u32, followed by the encoded bytes.
    fn write_u32_length_prefixed_str(&mut self, string: &str) -> Result<(), WriteStringError> {
        let bytes = encode_str(string)?;
        self.write_u32::<LE>(bytes.len() as u32)?;
        self.write_all(&bytes)?;
        Ok(())
    }
}

impl<T> WriteStringsExt for T where T: Write {}
