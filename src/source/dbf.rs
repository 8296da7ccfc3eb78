//! DbfTable — a dBASE III level table file behind the RecordSource contract.
//!
//! File layout (LE):
//! - 32-byte header: [version u8][yy u8][mm u8][dd u8][record_count u32]
//!   [header_len u16][record_len u16][reserved 20]
//! - field descriptors, 32 bytes each, terminated by 0x0D:
//!   [name 11, NUL-padded][type u8][reserved 4][length u8][decimals u8][reserved 14]
//! - records, fixed width `record_len`: [mark u8 ' '|'*'][field text ...]
//! - optional 0x1A end-of-file marker.
//!
//! Text is Latin-1. The file is advisory-locked for the lifetime of the open:
//! shared for read-only, exclusive for read-write.

use anyhow::{anyhow, bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use fs2::FileExt;
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::GridConfig;
use crate::consts::{
    BEFORE_FIRST, EOF_MARKER, FIELD_DESC_SIZE, FIELD_NAME_SIZE, FILE_HDR_SIZE, HDR_TERMINATOR,
    RECORD_DELETED, RECORD_LIVE, VERSION_DBASE3, VERSION_DBASE3_MEMO,
};
use crate::field::{FieldDescriptor, FieldType};
use crate::record::DbfRecord;
use crate::source::{OpenMode, RecordSource};
use crate::util::{latin1_to_string, string_to_latin1, today_ymd};
use crate::value::{Date, FieldValue};

#[derive(Clone, Debug, Default)]
struct DbfHeader {
    version: u8,
    year: u16,
    month: u8,
    day: u8,
    record_count: u32,
    header_len: u16,
    record_len: u16,
}

/// One open DBF file with a sequential cursor over its records.
pub struct DbfTable {
    path: PathBuf,
    cfg: GridConfig,
    file: Option<File>,
    mode: Option<OpenMode>,
    header: DbfHeader,
    fields: Vec<FieldDescriptor>,
    position: i64,
    current: DbfRecord,
    buf: Vec<u8>,
}

impl DbfTable {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_config(path, GridConfig::from_env())
    }

    pub fn with_config<P: Into<PathBuf>>(path: P, cfg: GridConfig) -> Self {
        Self {
            path: path.into(),
            cfg,
            file: None,
            mode: None,
            header: DbfHeader::default(),
            fields: Vec::new(),
            position: BEFORE_FIRST,
            current: DbfRecord::blank(0),
            buf: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// DBF version byte from the header.
    pub fn version(&self) -> u8 {
        self.header.version
    }

    /// Last-update stamp from the header as (year, month, day).
    pub fn last_update(&self) -> (u16, u8, u8) {
        (self.header.year, self.header.month, self.header.day)
    }

    /// Create a fresh, empty table file. Errors if the file already exists.
    pub fn create(path: &Path, fields: &[FieldDescriptor]) -> Result<()> {
        if fields.is_empty() {
            bail!("create {}: at least one field required", path.display());
        }
        let mut record_len: usize = 1; // deletion mark
        for f in fields {
            validate_field(f)?;
            record_len += f.length as usize;
        }
        if record_len > u16::MAX as usize {
            bail!("create {}: record too wide ({} bytes)", path.display(), record_len);
        }
        let header_len = FILE_HDR_SIZE + fields.len() * FIELD_DESC_SIZE + 1;

        let mut f = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(path)
            .with_context(|| format!("create table {}", path.display()))?;

        let (y, m, d) = today_ymd();
        f.write_u8(VERSION_DBASE3)?;
        f.write_u8(y.saturating_sub(1900).min(255) as u8)?;
        f.write_u8(m)?;
        f.write_u8(d)?;
        f.write_u32::<LittleEndian>(0)?; // record count
        f.write_u16::<LittleEndian>(header_len as u16)?;
        f.write_u16::<LittleEndian>(record_len as u16)?;
        f.write_all(&[0u8; 20])?;

        for fd in fields {
            let mut name = [0u8; FIELD_NAME_SIZE];
            let bytes = string_to_latin1(&fd.name);
            name[..bytes.len()].copy_from_slice(&bytes);
            f.write_all(&name)?;
            f.write_u8(fd.field_type.tag())?;
            f.write_all(&[0u8; 4])?;
            f.write_u8(fd.length)?;
            f.write_u8(fd.decimals)?;
            f.write_all(&[0u8; 14])?;
        }
        f.write_u8(HDR_TERMINATOR)?;
        f.write_u8(EOF_MARKER)?;
        f.sync_all()?;
        Ok(())
    }

    /// Append one record (read-write mode only). Values must match the schema
    /// and fit their column widths.
    pub fn append(&mut self, values: &[FieldValue]) -> Result<()> {
        if self.mode != Some(OpenMode::ReadWrite) {
            bail!("append {}: table not open read-write", self.path.display());
        }
        if values.len() != self.fields.len() {
            bail!(
                "append {}: {} values for {} columns",
                self.path.display(),
                values.len(),
                self.fields.len()
            );
        }

        let mut line = Vec::with_capacity(self.header.record_len as usize);
        line.push(RECORD_LIVE);
        for (fd, v) in self.fields.iter().zip(values) {
            let enc = encode_value(fd, v).ok_or_else(|| {
                anyhow!("append {}: value does not fit column '{}'", self.path.display(), fd.name)
            })?;
            line.extend_from_slice(&enc);
        }
        while line.len() < self.header.record_len as usize {
            line.push(b' ');
        }

        let count = self.header.record_count as u64;
        let off = self.header.header_len as u64 + count * self.header.record_len as u64;
        let file = self.file.as_mut().ok_or_else(|| anyhow!("table closed"))?;
        file.seek(SeekFrom::Start(off))?;
        file.write_all(&line)?;
        file.write_u8(EOF_MARKER)?;

        self.header.record_count += 1;
        let (y, m, d) = today_ymd();
        self.header.year = y;
        self.header.month = m;
        self.header.day = d;
        write_header_prefix(file, &self.header)?;
        file.flush()?;
        if self.cfg.sync_on_persist {
            file.sync_data()?;
        }
        Ok(())
    }

    fn read_slot(&mut self, pos: i64) -> Result<DbfRecord> {
        let rl = self.header.record_len as usize;
        let off = self.header.header_len as u64 + pos as u64 * self.header.record_len as u64;
        let file = self.file.as_mut().ok_or_else(|| anyhow!("table closed"))?;
        file.seek(SeekFrom::Start(off))?;
        if self.buf.len() < rl {
            self.buf.resize(rl, 0);
        }
        file.read_exact(&mut self.buf[..rl])
            .with_context(|| format!("read record {} of {}", pos, self.path.display()))?;

        let deleted = self.buf[0] == RECORD_DELETED;
        let mut values = Vec::with_capacity(self.fields.len());
        let mut at = 1usize;
        for fd in &self.fields {
            let w = fd.length as usize;
            if at + w > rl {
                bail!(
                    "record {} of {}: field '{}' overruns the slot",
                    pos,
                    self.path.display(),
                    fd.name
                );
            }
            values.push(decode_value(fd, &self.buf[at..at + w]));
            at += w;
        }
        Ok(DbfRecord::from_parts(pos, deleted, values))
    }
}

impl RecordSource for DbfTable {
    fn open(&mut self, mode: OpenMode) -> Result<()> {
        self.close();

        let file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(&self.path)
            .with_context(|| format!("open table {}", self.path.display()))?;
        match mode {
            OpenMode::ReadOnly => file
                .lock_shared()
                .with_context(|| format!("lock_shared {}", self.path.display()))?,
            OpenMode::ReadWrite => file
                .lock_exclusive()
                .with_context(|| format!("lock_exclusive {}", self.path.display()))?,
        }

        let mut file = file;
        let (header, fields) = read_header(&mut file, &self.path)?;
        debug!(
            "opened {} ({:?}): {} records, {} columns",
            self.path.display(),
            mode,
            header.record_count,
            fields.len()
        );

        self.buf = vec![0u8; header.record_len as usize];
        self.current = DbfRecord::blank(fields.len());
        self.header = header;
        self.fields = fields;
        self.position = BEFORE_FIRST;
        self.file = Some(file);
        self.mode = Some(mode);
        Ok(())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            // Dropping the handle releases the advisory lock.
            debug!("closed {}", self.path.display());
        }
        self.mode = None;
        self.position = BEFORE_FIRST;
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn open_mode(&self) -> Option<OpenMode> {
        self.mode
    }

    fn record_count(&self) -> usize {
        self.header.record_count as usize
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn seek(&mut self, pos: i64) -> bool {
        if !self.is_open() || pos < BEFORE_FIRST || pos >= self.record_count() as i64 {
            return false;
        }
        self.position = pos;
        true
    }

    fn next(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        let next_pos = self.position + 1;
        if next_pos >= self.record_count() as i64 {
            return false;
        }
        match self.read_slot(next_pos) {
            Ok(rec) => {
                self.position = next_pos;
                self.current = rec;
                true
            }
            Err(e) => {
                warn!("next() failed at {}: {:#}", next_pos, e);
                false
            }
        }
    }

    fn record(&self) -> &DbfRecord {
        &self.current
    }

    fn persist(&mut self, record: &DbfRecord) -> bool {
        if self.mode != Some(OpenMode::ReadWrite) {
            warn!("persist: {} not open read-write", self.path.display());
            return false;
        }
        let pos = record.position();
        if pos < 0 || pos >= self.record_count() as i64 {
            warn!("persist: record has no valid slot (pos {})", pos);
            return false;
        }

        let mut line = Vec::with_capacity(self.header.record_len as usize);
        line.push(if record.is_deleted() { RECORD_DELETED } else { RECORD_LIVE });
        for (fd, v) in self.fields.iter().zip(record.values()) {
            match encode_value(fd, v) {
                Some(enc) => line.extend_from_slice(&enc),
                None => {
                    warn!("persist: value does not fit column '{}'", fd.name);
                    return false;
                }
            }
        }
        while line.len() < self.header.record_len as usize {
            line.push(b' ');
        }

        let off = self.header.header_len as u64 + pos as u64 * self.header.record_len as u64;
        let sync = self.cfg.sync_on_persist;
        let file = match self.file.as_mut() {
            Some(f) => f,
            None => return false,
        };
        let res = (|| -> std::io::Result<()> {
            file.seek(SeekFrom::Start(off))?;
            file.write_all(&line)?;
            file.flush()?;
            if sync {
                file.sync_data()?;
            }
            Ok(())
        })();
        match res {
            Ok(()) => true,
            Err(e) => {
                warn!("persist: write record {} failed: {}", pos, e);
                false
            }
        }
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl Drop for DbfTable {
    fn drop(&mut self) {
        self.close();
    }
}

fn validate_field(fd: &FieldDescriptor) -> Result<()> {
    let name_bytes = string_to_latin1(&fd.name);
    if name_bytes.is_empty() || name_bytes.len() > FIELD_NAME_SIZE - 1 {
        bail!("field name '{}' must be 1..=10 bytes", fd.name);
    }
    match fd.field_type {
        FieldType::Date if fd.length != 8 => bail!("date field '{}' must have length 8", fd.name),
        FieldType::Logical if fd.length != 1 => {
            bail!("logical field '{}' must have length 1", fd.name)
        }
        _ if fd.length == 0 => bail!("field '{}' must have nonzero length", fd.name),
        _ => Ok(()),
    }
}

/// Rewrite the mutable header prefix (version, stamp, record count, sizes).
fn write_header_prefix(file: &mut File, h: &DbfHeader) -> Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.write_u8(h.version)?;
    file.write_u8(h.year.saturating_sub(1900).min(255) as u8)?;
    file.write_u8(h.month)?;
    file.write_u8(h.day)?;
    file.write_u32::<LittleEndian>(h.record_count)?;
    file.write_u16::<LittleEndian>(h.header_len)?;
    file.write_u16::<LittleEndian>(h.record_len)?;
    Ok(())
}

fn read_header(file: &mut File, path: &Path) -> Result<(DbfHeader, Vec<FieldDescriptor>)> {
    file.seek(SeekFrom::Start(0))?;
    let version = file.read_u8().with_context(|| format!("read header of {}", path.display()))?;
    if version != VERSION_DBASE3 && version != VERSION_DBASE3_MEMO {
        bail!("{}: unsupported DBF version 0x{:02X}", path.display(), version);
    }
    let year = 1900u16 + file.read_u8()? as u16;
    let month = file.read_u8()?;
    let day = file.read_u8()?;
    let record_count = file.read_u32::<LittleEndian>()?;
    let header_len = file.read_u16::<LittleEndian>()?;
    let record_len = file.read_u16::<LittleEndian>()?;
    let mut reserved = [0u8; 20];
    file.read_exact(&mut reserved)?;

    if (header_len as usize) < FILE_HDR_SIZE + 1 || record_len == 0 {
        bail!(
            "{}: malformed header (header_len {}, record_len {})",
            path.display(),
            header_len,
            record_len
        );
    }

    let max_fields = (header_len as usize - FILE_HDR_SIZE) / FIELD_DESC_SIZE;
    let mut fields = Vec::new();
    for _ in 0..max_fields {
        let first = file.read_u8()?;
        if first == HDR_TERMINATOR {
            break;
        }
        let mut rest = [0u8; FIELD_DESC_SIZE - 1];
        file.read_exact(&mut rest)?;

        let mut name_bytes = Vec::with_capacity(FIELD_NAME_SIZE);
        name_bytes.push(first);
        name_bytes.extend_from_slice(&rest[..FIELD_NAME_SIZE - 1]);
        let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_bytes.len());
        let name = latin1_to_string(&name_bytes[..name_end]);

        let tag = rest[FIELD_NAME_SIZE - 1];
        let field_type = match FieldType::from_tag(tag) {
            Some(t) => t,
            None => {
                // Memo and friends: surface the raw text rather than fail the open.
                warn!(
                    "{}: field '{}' has unsupported type '{}', treating as character",
                    path.display(),
                    name,
                    tag as char
                );
                FieldType::Character
            }
        };
        let length = rest[15];
        let decimals = rest[16];
        fields.push(FieldDescriptor::new(name, field_type, length, decimals));
    }

    if fields.is_empty() {
        bail!("{}: no field descriptors", path.display());
    }
    let width: usize = 1 + fields.iter().map(|f| f.length as usize).sum::<usize>();
    if width != record_len as usize {
        warn!(
            "{}: descriptor widths sum to {} but record_len is {}",
            path.display(),
            width,
            record_len
        );
    }

    Ok((
        DbfHeader {
            version,
            year,
            month,
            day,
            record_count,
            header_len,
            record_len,
        },
        fields,
    ))
}

/// Decode one field slot. Unparsable content decodes to Null, never an error:
/// legacy files are full of half-blank slots.
fn decode_value(fd: &FieldDescriptor, raw: &[u8]) -> FieldValue {
    match fd.field_type {
        FieldType::Character => FieldValue::Character(latin1_to_string(raw)),
        FieldType::Numeric | FieldType::Float => {
            let text = latin1_to_string(raw);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return FieldValue::Null;
            }
            if fd.decimals == 0 && !trimmed.contains('.') {
                if let Ok(n) = trimmed.parse::<i64>() {
                    return FieldValue::Integer(n);
                }
            }
            match trimmed.parse::<f64>() {
                Ok(x) => FieldValue::Double(x),
                Err(_) => FieldValue::Null,
            }
        }
        FieldType::Date => {
            let text = latin1_to_string(raw);
            let digits = text.trim();
            if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return FieldValue::Null;
            }
            FieldValue::Date(Date {
                year: digits[0..4].parse().unwrap_or(0),
                month: digits[4..6].parse().unwrap_or(0),
                day: digits[6..8].parse().unwrap_or(0),
            })
        }
        FieldType::Logical => match raw.first() {
            Some(b'T') | Some(b't') | Some(b'Y') | Some(b'y') => FieldValue::Logical(true),
            Some(b'F') | Some(b'f') | Some(b'N') | Some(b'n') => FieldValue::Logical(false),
            _ => FieldValue::Null,
        },
    }
}

/// Encode one value into its fixed-width slot. None when the value cannot be
/// represented in this column (type mismatch, or a number wider than the
/// column) — the caller turns that into a persist failure.
fn encode_value(fd: &FieldDescriptor, value: &FieldValue) -> Option<Vec<u8>> {
    let w = fd.length as usize;
    if value.is_null() {
        let fill = if fd.field_type == FieldType::Logical { b'?' } else { b' ' };
        return Some(vec![fill; w]);
    }
    match (fd.field_type, value) {
        (FieldType::Character, FieldValue::Character(s)) => {
            let mut bytes = string_to_latin1(s);
            bytes.truncate(w);
            while bytes.len() < w {
                bytes.push(b' ');
            }
            Some(bytes)
        }
        (FieldType::Numeric | FieldType::Float, FieldValue::Integer(n)) => {
            let text = format!("{:>width$}", n, width = w);
            (text.len() == w).then(|| text.into_bytes())
        }
        (FieldType::Numeric | FieldType::Float, FieldValue::Double(x)) => {
            let text = format!("{:>width$.prec$}", x, width = w, prec = fd.decimals as usize);
            (text.len() == w).then(|| text.into_bytes())
        }
        (FieldType::Date, FieldValue::Date(d)) => {
            let text = format!("{:04}{:02}{:02}", d.year, d.month, d.day);
            (text.len() == w).then(|| text.into_bytes())
        }
        (FieldType::Logical, FieldValue::Logical(b)) => Some(vec![if *b { b'T' } else { b'F' }]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chr(name: &str, len: u8) -> FieldDescriptor {
        FieldDescriptor::character(name, len)
    }

    #[test]
    fn decode_character_keeps_padding() {
        let fd = chr("NAME", 6);
        assert_eq!(
            decode_value(&fd, b"ab    "),
            FieldValue::Character("ab    ".to_string())
        );
    }

    #[test]
    fn decode_numeric_variants() {
        let fd = FieldDescriptor::numeric("QTY", 6, 0);
        assert_eq!(decode_value(&fd, b"    42"), FieldValue::Integer(42));
        assert_eq!(decode_value(&fd, b"      "), FieldValue::Null);
        assert_eq!(decode_value(&fd, b"  3.50"), FieldValue::Double(3.5));

        let fd = FieldDescriptor::numeric("PRICE", 7, 2);
        assert_eq!(decode_value(&fd, b"  19.99"), FieldValue::Double(19.99));
        assert_eq!(decode_value(&fd, b"garbage"), FieldValue::Null);
    }

    #[test]
    fn decode_date_and_logical() {
        let fd = FieldDescriptor::date("DT");
        assert_eq!(
            decode_value(&fd, b"19991231"),
            FieldValue::Date(Date { year: 1999, month: 12, day: 31 })
        );
        assert_eq!(decode_value(&fd, b"        "), FieldValue::Null);

        let fd = FieldDescriptor::logical("OK");
        assert_eq!(decode_value(&fd, b"T"), FieldValue::Logical(true));
        assert_eq!(decode_value(&fd, b"n"), FieldValue::Logical(false));
        assert_eq!(decode_value(&fd, b"?"), FieldValue::Null);
    }

    #[test]
    fn encode_rejects_overflow_and_mismatch() {
        let fd = FieldDescriptor::numeric("QTY", 3, 0);
        assert_eq!(encode_value(&fd, &FieldValue::Integer(999)), Some(b"999".to_vec()));
        assert!(encode_value(&fd, &FieldValue::Integer(1000)).is_none());
        assert!(encode_value(&fd, &FieldValue::Character("x".into())).is_none());
    }

    #[test]
    fn encode_character_pads_and_truncates() {
        let fd = chr("NAME", 4);
        assert_eq!(
            encode_value(&fd, &FieldValue::Character("ab".into())),
            Some(b"ab  ".to_vec())
        );
        assert_eq!(
            encode_value(&fd, &FieldValue::Character("abcdef".into())),
            Some(b"abcd".to_vec())
        );
    }

    #[test]
    fn encode_date_requires_the_declared_width() {
        let d = FieldValue::Date(Date { year: 1999, month: 12, day: 31 });
        assert_eq!(
            encode_value(&FieldDescriptor::date("DT"), &d),
            Some(b"19991231".to_vec())
        );
        // Foreign files can declare any width; only 8 bytes hold a date.
        let odd = FieldDescriptor::new("DT", FieldType::Date, 6, 0);
        assert!(encode_value(&odd, &d).is_none());
    }

    #[test]
    fn encode_null_blanks_the_slot() {
        let fd = FieldDescriptor::numeric("QTY", 3, 0);
        assert_eq!(encode_value(&fd, &FieldValue::Null), Some(b"   ".to_vec()));
        let fd = FieldDescriptor::logical("OK");
        assert_eq!(encode_value(&fd, &FieldValue::Null), Some(b"?".to_vec()));
    }
}
