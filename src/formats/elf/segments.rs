//! Program header table management

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{slice_at, EndianRead};

/// Segment table in file order
pub struct SegmentTable<'a> {
    headers: Vec<ProgramHeader>,
    data: &'a [u8],
}

impl<'a> SegmentTable<'a> {
    /// Parse segment table from ELF data
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        let ph_offset = header.e_phoff as usize;
        let ph_entsize = header.e_phentsize as usize;
        let ph_num = header.e_phnum as usize;

        if ph_num == 0 || ph_offset == 0 {
            return Ok(Self {
                headers: Vec::new(),
                data,
            });
        }

        let total_size = ph_num * ph_entsize;
        if ph_offset
            .checked_add(total_size)
            .is_none_or(|end| end > data.len())
        {
            return Err(ElfError::Truncated {
                offset: ph_offset,
                needed: total_size,
            });
        }

        let mut headers = Vec::with_capacity(ph_num);
        for i in 0..ph_num {
            let offset = ph_offset + i * ph_entsize;
            headers.push(parse_program_header(
                data,
                offset,
                header.ident.class,
                header.ident.data,
            )?);
        }

        Ok(Self { headers, data })
    }

    /// Convert virtual address to file offset through the LOAD segments
    pub fn vaddr_to_offset(&self, vaddr: u64) -> Option<u64> {
        self.headers
            .iter()
            .filter(|ph| ph.p_type == PT_LOAD)
            .find(|ph| vaddr >= ph.p_vaddr && vaddr - ph.p_vaddr < ph.p_memsz)
            .and_then(|ph| {
                let delta = vaddr - ph.p_vaddr;
                // In memory but not backed by the file
                (delta < ph.p_filesz).then(|| ph.p_offset + delta)
            })
    }

    /// First segment of the given type
    pub fn by_type(&self, p_type: u32) -> Option<Segment<'a>> {
        self.headers
            .iter()
            .find(|ph| ph.p_type == p_type)
            .map(|header| Segment {
                header: *header,
                data: slice_at(self.data, header.p_offset, header.p_filesz).unwrap_or(&[]),
            })
    }

    /// Get interpreter path
    pub fn interpreter(&self) -> Option<&'a str> {
        let segment = self.by_type(PT_INTERP)?;
        let bytes = segment.data;
        let len = memchr::memchr(0, bytes).unwrap_or(bytes.len());
        std::str::from_utf8(&bytes[..len])
            .ok()
            .filter(|s| !s.is_empty())
    }

    /// Count segments
    pub fn count(&self) -> usize {
        self.headers.len()
    }
}

fn parse_program_header(
    data: &[u8],
    offset: usize,
    class: ElfClass,
    endian: ElfData,
) -> Result<ProgramHeader> {
    match class {
        ElfClass::Elf32 => Ok(ProgramHeader {
            p_type: data.read_u32(offset, endian)?,
            p_offset: data.read_u32(offset + 4, endian)? as u64,
            p_vaddr: data.read_u32(offset + 8, endian)? as u64,
            p_filesz: data.read_u32(offset + 16, endian)? as u64,
            p_memsz: data.read_u32(offset + 20, endian)? as u64,
        }),
        ElfClass::Elf64 => Ok(ProgramHeader {
            p_type: data.read_u32(offset, endian)?,
            p_offset: data.read_u64(offset + 8, endian)?,
            p_vaddr: data.read_u64(offset + 16, endian)?,
            p_filesz: data.read_u64(offset + 32, endian)?,
            p_memsz: data.read_u64(offset + 40, endian)?,
        }),
    }
}
