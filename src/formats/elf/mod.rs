//! ELF (Executable and Linkable Format) reader
//!
//! A zero-copy reader limited to what dynamic linking needs: the header, the
//! section and program header tables, the dynamic table and the program
//! interpreter.

pub mod dynamic;
pub mod headers;
pub mod sections;
pub mod segments;
pub mod types;
pub mod utils;

use dynamic::DynamicTable;
use headers::parse_header;
use sections::SectionTable;
use segments::SegmentTable;
pub use types::*;
use utils::slice_at;

/// Dynamic-linking facts extracted from one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicInfo {
    /// DT_NEEDED entries in table order
    pub needed: Vec<String>,
    pub soname: Option<String>,
    /// PT_INTERP path
    pub interpreter: Option<String>,
}

/// Parsed ELF object
pub struct ElfObject<'data> {
    data: &'data [u8],
    header: ElfHeader,
}

impl<'data> ElfObject<'data> {
    /// Parse ELF from raw data
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let header = parse_header(data)?;

        Ok(Self { data, header })
    }

    /// Get ELF header
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    pub fn file_type(&self) -> ElfType {
        self.header.file_type()
    }

    /// Get sections
    pub fn sections(&self) -> Result<SectionTable<'data>> {
        SectionTable::parse(self.data, &self.header)
    }

    /// Get segments
    pub fn segments(&self) -> Result<SegmentTable<'data>> {
        SegmentTable::parse(self.data, &self.header)
    }

    /// Get interpreter path
    pub fn interpreter(&self) -> Result<Option<&'data str>> {
        Ok(self.segments()?.interpreter())
    }

    /// Get the dynamic table, or `None` for statically linked objects
    pub fn dynamic(&self) -> Result<Option<DynamicTable<'data>>> {
        let sections = self.sections()?;
        if let Some(table) = self.dynamic_from_sections(&sections)? {
            return Ok(Some(table));
        }
        if sections.count() > 0 {
            return Ok(None);
        }
        self.dynamic_from_segments()
    }

    /// Collect needed libraries, soname and interpreter in one pass.
    ///
    /// Returns `None` when the object has no dynamic table.
    pub fn dynamic_info(&self) -> Result<Option<DynamicInfo>> {
        let Some(table) = self.dynamic()? else {
            return Ok(None);
        };

        Ok(Some(DynamicInfo {
            needed: table
                .needed_libraries()?
                .into_iter()
                .map(str::to_string)
                .collect(),
            soname: table.soname()?.map(str::to_string),
            interpreter: self.interpreter()?.map(str::to_string),
        }))
    }

    fn dynamic_from_sections(
        &self,
        sections: &SectionTable<'data>,
    ) -> Result<Option<DynamicTable<'data>>> {
        let Some(dynamic) = sections
            .by_name(".dynamic")
            .or_else(|| sections.by_type(SHT_DYNAMIC))
        else {
            return Ok(None);
        };

        if dynamic.header.sh_type != SHT_DYNAMIC {
            return Err(ElfError::MalformedHeader(
                "Not a dynamic section".to_string(),
            ));
        }

        // sh_link names the string table; older toolchains leave it zero.
        let strings = sections
            .by_index(dynamic.header.sh_link as usize)
            .filter(|s| s.header.sh_type == SHT_STRTAB)
            .or_else(|| sections.by_name(".dynstr"))
            .map(|s| s.data)
            .unwrap_or(&[]);

        let table = DynamicTable::parse(
            dynamic.data,
            strings,
            self.header.ident.class,
            self.header.ident.data,
        )?;

        Ok(Some(table))
    }

    fn dynamic_from_segments(&self) -> Result<Option<DynamicTable<'data>>> {
        let segments = self.segments()?;
        let Some(segment) = segments.by_type(PT_DYNAMIC) else {
            return Ok(None);
        };

        let entries = dynamic::parse_entries(
            segment.data,
            self.header.ident.class,
            self.header.ident.data,
        )?;
        let probe = DynamicTable::from_entries(entries, &[]);

        let strings = match (probe.value(DT_STRTAB), probe.value(DT_STRSZ)) {
            (Some(vaddr), Some(size)) => {
                let offset = segments
                    .vaddr_to_offset(vaddr)
                    .ok_or(ElfError::InvalidOffset {
                        offset: vaddr as usize,
                    })?;
                slice_at(self.data, offset, size).ok_or(ElfError::Truncated {
                    offset: offset as usize,
                    needed: size as usize,
                })?
            }
            _ => &[],
        };

        Ok(Some(DynamicTable::from_entries(
            probe.entries().to_vec(),
            strings,
        )))
    }
}
