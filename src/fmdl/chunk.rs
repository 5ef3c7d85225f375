use std::fmt;
use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

use super::error::{EncodeError, FormatError};

/// Four-byte chunk tag.
#[binrw]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({})", self)
    }
}

pub const TAG_FMDL: FourCC = FourCC(*b"FMDL");
pub const TAG_STRS: FourCC = FourCC(*b"STRS");
pub const TAG_BONE: FourCC = FourCC(*b"BONE");
pub const TAG_MTRL: FourCC = FourCC(*b"MTRL");
pub const TAG_TXTR: FourCC = FourCC(*b"TXTR");
pub const TAG_MESH: FourCC = FourCC(*b"MESH");
pub const TAG_BBOX: FourCC = FourCC(*b"BBOX");

/// Canonical chunk order. The decoder rejects anything else.
pub const CHUNK_ORDER: [FourCC; 7] = [
    TAG_FMDL, TAG_STRS, TAG_BONE, TAG_MTRL, TAG_TXTR, TAG_MESH, TAG_BBOX,
];

pub const CHUNK_HEADER_SIZE: usize = 8;

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct ChunkHeader {
    pub tag: FourCC,
    pub length: u32,
}

/// Walks the chunk sequence of a container.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Read the next chunk, which must carry `tag`.
    pub fn expect(&mut self, tag: FourCC) -> Result<Payload<'a>, FormatError> {
        let data = self.data;
        let rest = &data[self.offset..];
        if rest.len() < CHUNK_HEADER_SIZE {
            return Err(FormatError::Truncated {
                chunk: tag,
                context: "chunk header".to_string(),
            });
        }

        let header = ChunkHeader::read(&mut Cursor::new(rest)).map_err(|e| FormatError::Truncated {
            chunk: tag,
            context: format!("chunk header: {}", e),
        })?;

        if header.tag != tag {
            return Err(if self.offset == 0 {
                FormatError::BadMagic { found: header.tag }
            } else {
                FormatError::UnexpectedChunk {
                    expected: tag,
                    found: header.tag,
                }
            });
        }

        let body = &rest[CHUNK_HEADER_SIZE..];
        let len = header.length as usize;
        if len > body.len() {
            return Err(FormatError::ChunkOverrun {
                chunk: tag,
                declared: header.length,
                remaining: body.len(),
            });
        }

        self.offset += CHUNK_HEADER_SIZE + len;
        Ok(Payload::new(tag, &body[..len]))
    }

    /// Fails if bytes follow the last chunk.
    pub fn finish(self) -> Result<(), FormatError> {
        let trailing = self.data.len() - self.offset;
        if trailing > 0 {
            return Err(FormatError::TrailingData(trailing));
        }
        Ok(())
    }
}

/// Bounded reader over one chunk's payload.
pub struct Payload<'a> {
    tag: FourCC,
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Payload<'a> {
    pub fn new(tag: FourCC, data: &'a [u8]) -> Self {
        Self {
            tag,
            cursor: Cursor::new(data),
        }
    }

    pub fn tag(&self) -> FourCC {
        self.tag
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len() - self.cursor.position() as usize
    }

    /// Read one little-endian record. Running off the end of the payload is
    /// reported as truncation of this chunk.
    pub fn read<T>(&mut self, context: &str) -> Result<T, FormatError>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        T::read_le(&mut self.cursor).map_err(|e| FormatError::Truncated {
            chunk: self.tag,
            context: format!("{}: {}", context, e),
        })
    }

    pub fn read_bytes(&mut self, n: usize, context: &str) -> Result<&'a [u8], FormatError> {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.cursor.position() as usize;
        let end = start
            .checked_add(n)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| FormatError::Truncated {
                chunk: self.tag,
                context: context.to_string(),
            })?;
        self.cursor.set_position(end as u64);
        Ok(&data[start..end])
    }

    /// Every chunk must be consumed exactly.
    pub fn finish(self) -> Result<(), FormatError> {
        let unread = self.remaining();
        if unread > 0 {
            return Err(FormatError::ChunkLengthMismatch {
                chunk: self.tag,
                unread,
            });
        }
        Ok(())
    }
}

/// Serialize one record with binrw into `buf`.
pub fn write_record<T>(buf: &mut Vec<u8>, record: &T) -> Result<(), EncodeError>
where
    T: for<'b> BinWrite<Args<'b> = ()>,
{
    let end = buf.len() as u64;
    let mut cursor = Cursor::new(buf);
    cursor.set_position(end);
    record
        .write_le(&mut cursor)
        .map_err(|e| EncodeError::Write(e.to_string()))
}

/// Append a complete chunk: tag, payload length, payload.
pub fn write_chunk(out: &mut Vec<u8>, tag: FourCC, payload: &[u8]) -> Result<(), EncodeError> {
    let length = u32::try_from(payload.len()).map_err(|_| EncodeError::ChunkTooLarge {
        chunk: tag,
        len: payload.len(),
    })?;
    write_record(out, &ChunkHeader { tag, length })?;
    out.extend_from_slice(payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut buf = tag.to_vec();
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn reads_chunks_in_sequence() {
        let mut data = chunk(b"FMDL", &[1, 2, 3, 4]);
        data.extend(chunk(b"STRS", &[]));

        let mut reader = ChunkReader::new(&data);
        let mut fmdl = reader.expect(TAG_FMDL).unwrap();
        assert_eq!(fmdl.read::<u32>("value").unwrap(), 0x0403_0201);
        fmdl.finish().unwrap();
        reader.expect(TAG_STRS).unwrap().finish().unwrap();
        reader.finish().unwrap();
    }

    #[test]
    fn first_tag_mismatch_is_bad_magic() {
        let data = chunk(b"GLTF", &[]);
        let err = ChunkReader::new(&data).expect(TAG_FMDL).err().unwrap();
        assert_eq!(err, FormatError::BadMagic { found: FourCC(*b"GLTF") });
    }

    #[test]
    fn declared_length_overrun() {
        let mut data = chunk(b"FMDL", &[0; 8]);
        data.truncate(12);
        let err = ChunkReader::new(&data).expect(TAG_FMDL).err().unwrap();
        assert!(matches!(err, FormatError::ChunkOverrun { declared: 8, remaining: 4, .. }));
    }

    #[test]
    fn unread_payload_is_rejected() {
        let data = chunk(b"FMDL", &[0; 6]);
        let mut reader = ChunkReader::new(&data);
        let mut payload = reader.expect(TAG_FMDL).unwrap();
        payload.read::<u32>("version").unwrap();
        assert!(matches!(
            payload.finish(),
            Err(FormatError::ChunkLengthMismatch { unread: 2, .. })
        ));
    }

    #[test]
    fn write_chunk_prefixes_tag_and_length() {
        let mut out = vec![];
        write_chunk(&mut out, TAG_BBOX, &[9, 9]).unwrap();
        assert_eq!(out, vec![b'B', b'B', b'O', b'X', 2, 0, 0, 0, 9, 9]);
    }

    #[test]
    fn display_escapes_binary_tags() {
        assert_eq!(FourCC(*b"MESH").to_string(), "MESH");
        assert_eq!(FourCC([0, b'A', b'B', b'C']).to_string(), "\\x00ABC");
    }
}
