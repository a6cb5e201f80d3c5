//! Binary layout of a part header.
//!
//! All integers are little-endian; strings carry a 7-bit encoded byte length
//! (LEB128, at most five bytes) followed by UTF-8 bytes.
//!
//! ```text
//! magic       prefixed string "R5FILE"
//! version     i32
//! id          16 raw bytes
//! file_name   prefixed string
//! file_size   i64
//! part_number i32
//! part_count  i32
//! encrypted   u8 (0 / 1)
//! ```

use std::io::{self, Cursor, Read, Write};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use super::{Header, HeaderError};
use crate::common::constants::{
    CURRENT_HEADER_VERSION, ID_LEN, MAGIC, MAX_PART_COUNT, MIN_PART_COUNT,
};
use crate::common::id::PartSetId;

impl Header {
    /// Serializes the header, rejecting field values that could not be decoded again.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HeaderError> {
        self.check_writable()?;

        let mut out = Vec::with_capacity(64 + self.file_name.len());
        write_prefixed_str(&mut out, MAGIC)?;
        out.write_i32::<LittleEndian>(CURRENT_HEADER_VERSION)?;
        out.write_all(self.id.as_bytes())?;
        write_prefixed_str(&mut out, &self.file_name)?;
        out.write_i64::<LittleEndian>(self.file_size as i64)?;
        out.write_i32::<LittleEndian>(self.part_number as i32)?;
        out.write_i32::<LittleEndian>(self.part_count as i32)?;
        out.write_u8(u8::from(self.encrypted))?;
        Ok(out)
    }

    /// Writes the serialized header to `destination`, returning the number of bytes written.
    pub fn write_to(&self, mut destination: impl Write) -> Result<usize, HeaderError> {
        let bytes = self.to_bytes()?;
        destination.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Reads one header from `source`.
    ///
    /// Exactly the header's bytes are consumed, so the reader is left at the
    /// first payload byte.
    pub fn read_from(mut source: impl Read) -> Result<Header, HeaderError> {
        let source = &mut source;

        let magic_len = read_7bit_len(source)?;
        if magic_len != MAGIC.len() as u64 {
            return Err(invalid("header magic does not match"));
        }
        let mut magic = [0u8; MAGIC.len()];
        read_exact(source, &mut magic)?;
        if magic != MAGIC.as_bytes() {
            return Err(invalid("header magic does not match"));
        }

        let version = read_i32(source)?;
        if !(1..=CURRENT_HEADER_VERSION).contains(&version) {
            return Err(invalid(format!("header version {} is not supported", version)));
        }

        let mut id = [0u8; ID_LEN];
        read_exact(source, &mut id)?;
        let file_name = read_prefixed_str(source)?;
        let file_size = read_i64(source)?;
        let part_number = read_i32(source)?;
        let part_count = read_i32(source)?;
        let encrypted = read_u8(source)? != 0;

        if file_size < 1 {
            return Err(invalid("invalid file size"));
        }
        // A valid split always has file_size > part_count >= part_number, so the
        // size comparison only ever rejects hand-crafted headers.
        if part_number < 0 || file_size <= i64::from(part_number) {
            return Err(invalid("part number outside of allowed range"));
        }
        if part_number > part_count {
            return Err(invalid("decoded part count too small for decoded part number"));
        }
        if part_count < 1 || part_count > MAX_PART_COUNT as i32 {
            return Err(invalid("part count outside of allowed range"));
        }
        let id = PartSetId::new(id);
        if id.is_nil() {
            return Err(invalid("id can't be all zero bytes"));
        }

        Ok(Header {
            version,
            id,
            file_name,
            file_size: file_size as u64,
            part_number: part_number as u32,
            part_count: part_count as u32,
            encrypted,
        })
    }

    /// Parses a header from the start of `bytes`; trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Header, HeaderError> {
        Header::read_from(Cursor::new(bytes))
    }

    fn check_writable(&self) -> Result<(), HeaderError> {
        if self.file_name.is_empty() {
            return Err(config("unable to serialize an empty file name"));
        }
        if self.file_name.len() > i32::MAX as usize {
            return Err(config("file name is too long"));
        }
        if self.file_size < 1 {
            return Err(config("unable to serialize 0 or less as file size"));
        }
        if self.file_size > i64::MAX as u64 {
            return Err(config("file size does not fit a signed 64-bit integer"));
        }
        if self.part_count < MIN_PART_COUNT {
            return Err(config("unable to serialize 1 or less as part count"));
        }
        if self.part_count > MAX_PART_COUNT {
            return Err(config(format!(
                "unable to serialize more than {} as part count",
                MAX_PART_COUNT
            )));
        }
        if self.part_number > self.part_count {
            return Err(config("unable to serialize out of range part number"));
        }
        if self.id.is_nil() {
            return Err(config("unable to serialize an empty id"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> HeaderError {
    HeaderError::InvalidFormat(msg.into())
}

fn config(msg: impl Into<String>) -> HeaderError {
    HeaderError::InvalidConfiguration(msg.into())
}

/// A short read inside the header means the bytes are not a header at all.
fn map_eof(e: io::Error) -> HeaderError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        invalid("header is truncated")
    } else {
        HeaderError::Io(e)
    }
}

fn read_exact(source: &mut impl Read, buf: &mut [u8]) -> Result<(), HeaderError> {
    source.read_exact(buf).map_err(map_eof)
}

fn read_u8(source: &mut impl Read) -> Result<u8, HeaderError> {
    source.read_u8().map_err(map_eof)
}

fn read_i32(source: &mut impl Read) -> Result<i32, HeaderError> {
    source.read_i32::<LittleEndian>().map_err(map_eof)
}

fn read_i64(source: &mut impl Read) -> Result<i64, HeaderError> {
    source.read_i64::<LittleEndian>().map_err(map_eof)
}

fn write_7bit_len(destination: &mut impl Write, len: usize) -> io::Result<()> {
    let mut value = len as u32;
    while value >= 0x80 {
        destination.write_u8((value as u8) | 0x80)?;
        value >>= 7;
    }
    destination.write_u8(value as u8)
}

fn read_7bit_len(source: &mut impl Read) -> Result<u64, HeaderError> {
    let mut value: u32 = 0;
    for shift in (0..35).step_by(7) {
        let byte = read_u8(source)?;
        // The fifth byte may only contribute the top four bits.
        if shift == 28 && byte > 0x0F {
            return Err(invalid("malformed string length prefix"));
        }
        value |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            if value > i32::MAX as u32 {
                return Err(invalid("negative string length"));
            }
            return Ok(u64::from(value));
        }
    }
    Err(invalid("malformed string length prefix"))
}

fn write_prefixed_str(destination: &mut impl Write, value: &str) -> io::Result<()> {
    write_7bit_len(destination, value.len())?;
    destination.write_all(value.as_bytes())
}

fn read_prefixed_str(source: &mut impl Read) -> Result<String, HeaderError> {
    let len = read_7bit_len(source)?;
    let mut buf = Vec::new();
    source.by_ref().take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(invalid("header is truncated"));
    }
    String::from_utf8(buf).map_err(|_| invalid("file name is not valid UTF-8"))
}
