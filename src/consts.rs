//! Shared constants of the DBF on-disk format and the paging layer.

// -------- File header (32 bytes, LE) --------
// [version u8][yy u8][mm u8][dd u8][record_count u32][header_len u16][record_len u16][reserved 20]
pub const FILE_HDR_SIZE: usize = 32;

/// dBASE III without memo. The only version this crate writes.
pub const VERSION_DBASE3: u8 = 0x03;
/// dBASE III with memo file; readable, memo fields come back as raw text.
pub const VERSION_DBASE3_MEMO: u8 = 0x83;

// -------- Field descriptors (32 bytes each) --------
// [name 11, NUL-padded][type u8][reserved 4][length u8][decimals u8][reserved 14]
pub const FIELD_DESC_SIZE: usize = 32;
pub const FIELD_NAME_SIZE: usize = 11;
/// Terminates the descriptor array.
pub const HDR_TERMINATOR: u8 = 0x0D;

// -------- Records --------
/// First byte of every record slot.
pub const RECORD_LIVE: u8 = b' ';
pub const RECORD_DELETED: u8 = b'*';
/// Optional end-of-file marker after the last record.
pub const EOF_MARKER: u8 = 0x1A;

// -------- Cursor --------
/// Cursor position before the first record; `next()` from here lands on record 0.
pub const BEFORE_FIRST: i64 = -1;

// -------- Paging --------
/// Live records materialized by one fetch_next_batch call. Bounds the
/// tail latency of a single call (255 sequential record reads worst case).
pub const DEFAULT_PREFETCH: usize = 255;

/// Minimum allocation block for the header-override table (amortization
/// detail, not observable through the API).
pub const HEADER_BLOCK: usize = 16;
