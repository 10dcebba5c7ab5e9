//! Dynamic table parsing
//!
//! The table may come from the `.dynamic` section or, for objects whose
//! section headers were stripped, from the `PT_DYNAMIC` segment.

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_cstring, read_word, EndianRead};

/// Dynamic table together with the string table its entries index into
pub struct DynamicTable<'a> {
    entries: Vec<DynamicEntry>,
    strings: &'a [u8],
}

impl<'a> DynamicTable<'a> {
    /// Decode `Elf_Dyn` entries up to `DT_NULL` or the end of `raw`.
    pub fn parse(raw: &[u8], strings: &'a [u8], class: ElfClass, endian: ElfData) -> Result<Self> {
        let entries = parse_entries(raw, class, endian)?;
        Ok(Self { entries, strings })
    }

    /// Build a table from already decoded entries.
    pub fn from_entries(entries: Vec<DynamicEntry>, strings: &'a [u8]) -> Self {
        Self { entries, strings }
    }

    /// Needed libraries (DT_NEEDED), in table order.
    ///
    /// An entry whose name cannot be read is an error: silently dropping a
    /// requirement would produce an incomplete manifest.
    pub fn needed_libraries(&self) -> Result<Vec<&'a str>> {
        self.entries
            .iter()
            .filter(|e| e.d_tag == DT_NEEDED)
            .map(|e| self.string(e.d_val))
            .collect()
    }

    /// SONAME, if the object declares one
    pub fn soname(&self) -> Result<Option<&'a str>> {
        self.entries
            .iter()
            .find(|e| e.d_tag == DT_SONAME)
            .map(|e| self.string(e.d_val))
            .transpose()
    }

    /// Value of the first entry with `tag`
    pub fn value(&self, tag: i64) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.d_tag == tag)
            .map(|e| e.d_val)
    }

    /// Get all entries
    pub fn entries(&self) -> &[DynamicEntry] {
        &self.entries
    }

    fn string(&self, offset: u64) -> Result<&'a str> {
        let offset = usize::try_from(offset).map_err(|_| ElfError::InvalidOffset {
            offset: usize::MAX,
        })?;
        read_cstring(self.strings, offset)
    }
}

/// Decode raw `Elf_Dyn` records.
pub fn parse_entries(raw: &[u8], class: ElfClass, endian: ElfData) -> Result<Vec<DynamicEntry>> {
    let entry_size = class.dyn_entry_size();
    let mut entries = Vec::with_capacity(raw.len() / entry_size);
    let mut offset = 0;

    while offset + entry_size <= raw.len() {
        let d_tag = match class {
            ElfClass::Elf32 => raw.read_i32(offset, endian)? as i64,
            ElfClass::Elf64 => raw.read_i64(offset, endian)?,
        };
        let d_val = read_word(raw, offset + entry_size / 2, class, endian)?;

        if d_tag == DT_NULL {
            break;
        }

        entries.push(DynamicEntry { d_tag, d_val });
        offset += entry_size;
    }

    Ok(entries)
}
