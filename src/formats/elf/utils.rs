//! Utility functions for ELF parsing

use crate::formats::elf::types::{ElfClass, ElfData, ElfError, Result};

/// Trait for reading values with endianness support
pub trait EndianRead {
    fn read_u16(&self, offset: usize, data: ElfData) -> Result<u16>;
    fn read_u32(&self, offset: usize, data: ElfData) -> Result<u32>;
    fn read_u64(&self, offset: usize, data: ElfData) -> Result<u64>;
    fn read_i32(&self, offset: usize, data: ElfData) -> Result<i32>;
    fn read_i64(&self, offset: usize, data: ElfData) -> Result<i64>;
}

fn fixed<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    let src = offset
        .checked_add(N)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(ElfError::Truncated { offset, needed: N })?;
    out.copy_from_slice(src);
    Ok(out)
}

impl EndianRead for [u8] {
    fn read_u16(&self, offset: usize, data: ElfData) -> Result<u16> {
        let bytes = fixed::<2>(self, offset)?;
        Ok(match data {
            ElfData::Little => u16::from_le_bytes(bytes),
            ElfData::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&self, offset: usize, data: ElfData) -> Result<u32> {
        let bytes = fixed::<4>(self, offset)?;
        Ok(match data {
            ElfData::Little => u32::from_le_bytes(bytes),
            ElfData::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_u64(&self, offset: usize, data: ElfData) -> Result<u64> {
        let bytes = fixed::<8>(self, offset)?;
        Ok(match data {
            ElfData::Little => u64::from_le_bytes(bytes),
            ElfData::Big => u64::from_be_bytes(bytes),
        })
    }

    fn read_i32(&self, offset: usize, data: ElfData) -> Result<i32> {
        let bytes = fixed::<4>(self, offset)?;
        Ok(match data {
            ElfData::Little => i32::from_le_bytes(bytes),
            ElfData::Big => i32::from_be_bytes(bytes),
        })
    }

    fn read_i64(&self, offset: usize, data: ElfData) -> Result<i64> {
        let bytes = fixed::<8>(self, offset)?;
        Ok(match data {
            ElfData::Little => i64::from_le_bytes(bytes),
            ElfData::Big => i64::from_be_bytes(bytes),
        })
    }
}

/// Read an address-sized word based on ELF class
pub fn read_word(data: &[u8], offset: usize, class: ElfClass, endian: ElfData) -> Result<u64> {
    match class {
        ElfClass::Elf32 => data.read_u32(offset, endian).map(|v| v as u64),
        ElfClass::Elf64 => data.read_u64(offset, endian),
    }
}

/// Read a null-terminated string from data
pub fn read_cstring(data: &[u8], offset: usize) -> Result<&str> {
    let slice = data.get(offset..).filter(|s| !s.is_empty());
    let Some(slice) = slice else {
        return Err(ElfError::InvalidOffset { offset });
    };

    let end = memchr::memchr(0, slice).unwrap_or(slice.len());

    std::str::from_utf8(&slice[..end]).map_err(|_| ElfError::InvalidString)
}

/// Borrow `size` bytes at `offset`, or `None` when the range leaves the buffer.
pub fn slice_at(data: &[u8], offset: u64, size: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let len = usize::try_from(size).ok()?;
    data.get(start..start.checked_add(len)?)
}
