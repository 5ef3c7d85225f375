use std::collections::HashMap;

use super::chunk::{write_record, FourCC, Payload};
use super::error::{EncodeError, FormatError};
use super::records::{index_or_none, NO_INDEX};
use crate::validation::limits::{MAX_STRING_BYTES, MAX_TABLE_ENTRIES};

/// Deduplicating string table used while encoding. Index 0 is always "".
#[derive(Debug)]
pub struct StringTableBuilder {
    strings: Vec<String>,
    lookup: HashMap<String, u16>,
}

impl Default for StringTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StringTableBuilder {
    pub fn new() -> Self {
        let mut lookup = HashMap::new();
        lookup.insert(String::new(), 0);
        Self {
            strings: vec![String::new()],
            lookup,
        }
    }

    /// Return the index of `s`, adding it on first use.
    pub fn intern(&mut self, s: &str) -> Result<u16, EncodeError> {
        if let Some(&index) = self.lookup.get(s) {
            return Ok(index);
        }
        if s.len() > MAX_STRING_BYTES {
            return Err(EncodeError::StringTooLong {
                preview: s.chars().take(32).collect(),
                len: s.len(),
                max: MAX_STRING_BYTES,
            });
        }
        // Indices stay below NO_INDEX so optional references remain unambiguous.
        if self.strings.len() >= MAX_TABLE_ENTRIES {
            return Err(EncodeError::TableTooLarge {
                table: "string",
                count: self.strings.len() + 1,
                max: MAX_TABLE_ENTRIES,
            });
        }

        let index = self.strings.len() as u16;
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), index);
        Ok(index)
    }

    pub fn intern_optional(&mut self, s: Option<&str>) -> Result<u16, EncodeError> {
        match s {
            Some(s) => self.intern(s),
            None => Ok(NO_INDEX),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// STRS payload: count, then length-prefixed UTF-8 entries.
    pub fn to_payload(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = vec![];
        write_record(&mut buf, &(self.strings.len() as u16))?;
        for s in &self.strings {
            write_record(&mut buf, &(s.len() as u16))?;
            buf.extend_from_slice(s.as_bytes());
        }
        Ok(buf)
    }
}

/// Decoded string table.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn read(payload: &mut Payload) -> Result<Self, FormatError> {
        let count = payload.read::<u16>("string count")? as usize;
        let mut strings = Vec::with_capacity(count);
        for index in 0..count {
            let len = payload.read::<u16>("string length")? as usize;
            let bytes = payload.read_bytes(len, "string bytes")?;
            let s = std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { index })?;
            strings.push(s.to_string());
        }
        if strings.first().map(|s| !s.is_empty()).unwrap_or(true) {
            return Err(FormatError::MissingEmptyString);
        }
        Ok(Self { strings })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn get(&self, chunk: FourCC, index: u16) -> Result<&str, FormatError> {
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or(FormatError::IndexOutOfRange {
                chunk,
                table: "string",
                index: index as usize,
                count: self.strings.len(),
            })
    }

    pub fn get_optional(&self, chunk: FourCC, index: u16) -> Result<Option<&str>, FormatError> {
        index_or_none(index).map(|i| self.get(chunk, i)).transpose()
    }
}
