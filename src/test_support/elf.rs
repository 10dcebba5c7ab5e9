//! Byte-level writer for minimal ELF64 little-endian objects.
//!
//! Layout: file header, program headers (`PT_INTERP`, `PT_DYNAMIC`, one
//! `PT_LOAD` mapping the whole file at vaddr 0), the interpreter string,
//! `.dynstr`, `.dynamic`, any extra `PROGBITS` sections, `.shstrtab`, then
//! the section header table.

const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const SHDR_SIZE: usize = 64;
const DYN_SIZE: usize = 16;

const ET_REL: u16 = 1;
const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;
const EM_AARCH64: u16 = 183;

const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;
const PT_INTERP: u32 = 3;

const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const SHT_DYNAMIC: u32 = 6;

const DT_NULL: u64 = 0;
const DT_NEEDED: u64 = 1;
const DT_STRTAB: u64 = 5;
const DT_STRSZ: u64 = 10;
const DT_SONAME: u64 = 14;

/// Builder for synthetic ELF objects with dynamic-linking metadata
#[derive(Debug, Clone)]
pub struct ElfBuilder {
    e_type: u16,
    machine: u16,
    soname: Option<String>,
    needed: Vec<String>,
    interpreter: Option<String>,
    dynamic: bool,
    section_headers: bool,
    extra: Vec<(String, Vec<u8>)>,
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut [u8], at: usize, v: u64) {
    buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

fn align8(v: usize) -> usize {
    (v + 7) & !7
}

struct StrTab {
    bytes: Vec<u8>,
}

impl StrTab {
    fn new() -> Self {
        Self { bytes: vec![0] }
    }

    fn add(&mut self, s: &str) -> u32 {
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        offset
    }
}

struct SectionSpec {
    name: u32,
    sh_type: u32,
    offset: usize,
    size: usize,
    link: u32,
    entsize: u64,
}

impl ElfBuilder {
    fn with_type(e_type: u16) -> Self {
        Self {
            e_type,
            machine: EM_AARCH64,
            soname: None,
            needed: Vec::new(),
            interpreter: None,
            dynamic: true,
            section_headers: true,
            extra: Vec::new(),
        }
    }

    /// `ET_DYN` object
    pub fn shared_object() -> Self {
        Self::with_type(ET_DYN)
    }

    /// `ET_EXEC` object
    pub fn executable() -> Self {
        Self::with_type(ET_EXEC)
    }

    /// `ET_REL` object without a dynamic table
    pub fn relocatable() -> Self {
        Self::with_type(ET_REL).without_dynamic()
    }

    pub fn soname(mut self, soname: &str) -> Self {
        self.soname = Some(soname.to_string());
        self
    }

    pub fn needed(mut self, lib: &str) -> Self {
        self.needed.push(lib.to_string());
        self
    }

    pub fn interpreter(mut self, path: &str) -> Self {
        self.interpreter = Some(path.to_string());
        self
    }

    /// Omit `.dynamic` and `PT_DYNAMIC`, as in a static executable.
    pub fn without_dynamic(mut self) -> Self {
        self.dynamic = false;
        self
    }

    /// Add a `PROGBITS` section holding `data`, such as `.go.buildinfo`.
    pub fn section(mut self, name: &str, data: Vec<u8>) -> Self {
        self.extra.push((name.to_string(), data));
        self
    }

    /// Omit the section header table, as `sstrip` does.
    pub fn without_section_headers(mut self) -> Self {
        self.section_headers = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let phnum = 1 + usize::from(self.interpreter.is_some()) + usize::from(self.dynamic);
        let mut cursor = EHDR_SIZE + phnum * PHDR_SIZE;

        let mut shstrtab = StrTab::new();
        let mut sections: Vec<SectionSpec> = Vec::new();

        let interp = self.interpreter.as_ref().map(|path| {
            let offset = cursor;
            let size = path.len() + 1;
            cursor += size;
            (offset, size)
        });
        if let Some((offset, size)) = interp {
            sections.push(SectionSpec {
                name: shstrtab.add(".interp"),
                sh_type: SHT_PROGBITS,
                offset,
                size,
                link: 0,
                entsize: 0,
            });
        }

        let mut dynstr = StrTab::new();
        let mut dyn_entries: Vec<(u64, u64)> = Vec::new();
        let mut dynstr_off = 0;
        let mut dynamic_off = 0;
        if self.dynamic {
            for lib in &self.needed {
                let off = dynstr.add(lib);
                dyn_entries.push((DT_NEEDED, off as u64));
            }
            if let Some(soname) = &self.soname {
                let off = dynstr.add(soname);
                dyn_entries.push((DT_SONAME, off as u64));
            }

            dynstr_off = cursor;
            cursor += dynstr.bytes.len();
            dynamic_off = align8(cursor);

            // vaddr equals file offset under the single PT_LOAD
            dyn_entries.push((DT_STRTAB, dynstr_off as u64));
            dyn_entries.push((DT_STRSZ, dynstr.bytes.len() as u64));
            dyn_entries.push((DT_NULL, 0));
            cursor = dynamic_off + dyn_entries.len() * DYN_SIZE;

            let dynstr_index = sections.len() as u32 + 1;
            sections.push(SectionSpec {
                name: shstrtab.add(".dynstr"),
                sh_type: SHT_STRTAB,
                offset: dynstr_off,
                size: dynstr.bytes.len(),
                link: 0,
                entsize: 0,
            });
            sections.push(SectionSpec {
                name: shstrtab.add(".dynamic"),
                sh_type: SHT_DYNAMIC,
                offset: dynamic_off,
                size: dyn_entries.len() * DYN_SIZE,
                link: dynstr_index,
                entsize: DYN_SIZE as u64,
            });
        }

        let mut extra_offsets = Vec::with_capacity(self.extra.len());
        for (name, data) in &self.extra {
            extra_offsets.push(cursor);
            sections.push(SectionSpec {
                name: shstrtab.add(name),
                sh_type: SHT_PROGBITS,
                offset: cursor,
                size: data.len(),
                link: 0,
                entsize: 0,
            });
            cursor += data.len();
        }

        let shstrtab_name = shstrtab.add(".shstrtab");
        let shstrtab_off = cursor;
        cursor += shstrtab.bytes.len();
        sections.push(SectionSpec {
            name: shstrtab_name,
            sh_type: SHT_STRTAB,
            offset: shstrtab_off,
            size: shstrtab.bytes.len(),
            link: 0,
            entsize: 0,
        });

        let shoff = align8(cursor);
        // Index 0 is the null section
        let shnum = sections.len() + 1;
        let total = if self.section_headers {
            shoff + shnum * SHDR_SIZE
        } else {
            cursor
        };

        let mut buf = vec![0u8; total];

        // File header
        buf[0..4].copy_from_slice(b"\x7fELF");
        buf[4] = 2;
        buf[5] = 1;
        buf[6] = 1;
        put_u16(&mut buf, 16, self.e_type);
        put_u16(&mut buf, 18, self.machine);
        put_u32(&mut buf, 20, 1);
        put_u64(&mut buf, 32, EHDR_SIZE as u64);
        put_u16(&mut buf, 52, EHDR_SIZE as u16);
        put_u16(&mut buf, 54, PHDR_SIZE as u16);
        put_u16(&mut buf, 56, phnum as u16);
        put_u16(&mut buf, 58, SHDR_SIZE as u16);
        if self.section_headers {
            put_u64(&mut buf, 40, shoff as u64);
            put_u16(&mut buf, 60, shnum as u16);
            put_u16(&mut buf, 62, (shnum - 1) as u16);
        }

        // Program headers
        let mut ph = EHDR_SIZE;
        let mut write_phdr = |buf: &mut [u8], p_type: u32, offset: usize, size: usize| {
            put_u32(buf, ph, p_type);
            put_u64(buf, ph + 8, offset as u64);
            put_u64(buf, ph + 16, offset as u64);
            put_u64(buf, ph + 24, offset as u64);
            put_u64(buf, ph + 32, size as u64);
            put_u64(buf, ph + 40, size as u64);
            ph += PHDR_SIZE;
        };
        if let Some((offset, size)) = interp {
            write_phdr(&mut buf, PT_INTERP, offset, size);
        }
        if self.dynamic {
            write_phdr(
                &mut buf,
                PT_DYNAMIC,
                dynamic_off,
                dyn_entries.len() * DYN_SIZE,
            );
        }
        write_phdr(&mut buf, PT_LOAD, 0, total);

        // Blobs
        if let (Some(path), Some((offset, _))) = (&self.interpreter, interp) {
            buf[offset..offset + path.len()].copy_from_slice(path.as_bytes());
        }
        if self.dynamic {
            buf[dynstr_off..dynstr_off + dynstr.bytes.len()].copy_from_slice(&dynstr.bytes);
            for (i, (tag, val)) in dyn_entries.iter().enumerate() {
                let at = dynamic_off + i * DYN_SIZE;
                put_u64(&mut buf, at, *tag);
                put_u64(&mut buf, at + 8, *val);
            }
        }
        for ((_, data), offset) in self.extra.iter().zip(&extra_offsets) {
            buf[*offset..*offset + data.len()].copy_from_slice(data);
        }
        buf[shstrtab_off..shstrtab_off + shstrtab.bytes.len()].copy_from_slice(&shstrtab.bytes);

        // Section headers
        if self.section_headers {
            for (i, section) in sections.iter().enumerate() {
                let at = shoff + (i + 1) * SHDR_SIZE;
                put_u32(&mut buf, at, section.name);
                put_u32(&mut buf, at + 4, section.sh_type);
                put_u64(&mut buf, at + 16, section.offset as u64);
                put_u64(&mut buf, at + 24, section.offset as u64);
                put_u64(&mut buf, at + 32, section.size as u64);
                put_u32(&mut buf, at + 40, section.link);
                put_u64(&mut buf, at + 48, 1);
                put_u64(&mut buf, at + 56, section.entsize);
            }
        }

        buf
    }
}
