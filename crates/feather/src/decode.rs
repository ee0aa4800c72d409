//! Turns feather-encoded column bytes into typed, randomly addressable
//! values.
//!
//! [`create_reader`] is an exhaustive match over [`FeatherType`]: every
//! variant is either decoded by a concrete reader or explicitly routed to
//! the always-null stub, so coverage is checked at compile time. Readers
//! produced here never consult a validity mask; nullness is layered on by
//! the mask wrapper in the column module.

use buf::util::ceil8;
use buf::Buf;

use crate::types::FeatherType;

/// A single decoded cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    F32(f32),
    F64(f64),
    Utf8(String),
    Bytes(Vec<u8>),
}

/// The value family a reader produces from [`Reader::datum`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    F32,
    F64,
    Utf8,
    Bytes,
}

/// Stateless random-access cursor over one column's decoded values.
///
/// [`datum`](Reader::datum) always yields a sensible value for an in-range
/// row. The primitive-typed accessors exist so numeric columns can be read
/// without allocating; for non-numeric columns they return a fixed
/// sentinel (0 for integers, NaN for floats) rather than failing. Nullness
/// must be queried through [`is_null`](Reader::is_null) — a masked row's
/// accessor value is the sentinel, not a signal.
pub trait Reader: Send + Sync {
    /// Returns the value family produced by this reader.
    fn value_type(&self) -> ValueType;

    /// Indicates whether a row is flagged null by the column's validity
    /// mask. Raw decoders always answer `false`; only the mask wrapper
    /// answers `true`.
    fn is_null(&self, _ix: u64) -> bool {
        false
    }

    /// Returns the typed value for a given row.
    fn datum(&self, ix: u64) -> Datum;

    /// Returns a signed byte view of the value. May or may not make
    /// sense, depending on column type.
    fn get_i8(&self, ix: u64) -> i8;

    /// Returns a 16-bit integer view of the value.
    fn get_i16(&self, ix: u64) -> i16;

    /// Returns a 32-bit integer view of the value.
    fn get_i32(&self, ix: u64) -> i32;

    /// Returns a 64-bit integer view of the value.
    fn get_i64(&self, ix: u64) -> i64;

    /// Returns a 32-bit float view of the value.
    fn get_f32(&self, ix: u64) -> f32;

    /// Returns a 64-bit float view of the value.
    fn get_f64(&self, ix: u64) -> f64;
}

/// Builds a reader for a column's mapped data region.
///
/// `buf` covers the column's data past any validity mask; `nrow` is the
/// row count (needed by variable-length layouts to locate the data area
/// past the offset table). Unsupported types decode as always-null.
pub fn create_reader(ftype: FeatherType, buf: Buf, nrow: u64) -> Box<dyn Reader> {
    match ftype {
        FeatherType::Bool => Box::new(BoolReader { buf }),
        FeatherType::Int8 => Box::new(I8Reader { buf }),
        FeatherType::Int16 => Box::new(I16Reader { buf }),
        FeatherType::Int32 | FeatherType::Date => Box::new(I32Reader { buf }),
        FeatherType::Int64 | FeatherType::Timestamp | FeatherType::Time => {
            Box::new(I64Reader { buf })
        }
        FeatherType::UInt8 => Box::new(U8Reader { buf }),
        FeatherType::UInt16 => Box::new(U16Reader { buf }),
        FeatherType::UInt32 => Box::new(U32Reader { buf }),
        FeatherType::Float => Box::new(F32Reader { buf }),
        FeatherType::Double => Box::new(F64Reader { buf }),
        FeatherType::Utf8 => Box::new(Utf8Reader {
            slice: VarSlice::new(buf, nrow, 4),
        }),
        FeatherType::Binary => Box::new(BytesReader {
            slice: VarSlice::new(buf, nrow, 4),
        }),
        FeatherType::LargeUtf8 => Box::new(Utf8Reader {
            slice: VarSlice::new(buf, nrow, 8),
        }),
        FeatherType::LargeBinary => Box::new(BytesReader {
            slice: VarSlice::new(buf, nrow, 8),
        }),
        FeatherType::UInt64 | FeatherType::Category => Box::new(NullReader),
    }
}

/// Indicates whether a type has a real decoder, as opposed to the
/// always-null stub.
#[must_use]
pub fn is_decodable(ftype: FeatherType) -> bool {
    !matches!(ftype, FeatherType::UInt64 | FeatherType::Category)
}

/// Returns the always-null stub reader used for unsupported and unknown
/// type codes.
pub(crate) fn null_reader() -> Box<dyn Reader> {
    Box::new(NullReader)
}

/// Generates the six numeric accessor methods from an inherent
/// `raw(&self, ix)` returning a numeric primitive.
macro_rules! numeric_views {
    () => {
        fn get_i8(&self, ix: u64) -> i8 {
            self.raw(ix) as i8
        }
        fn get_i16(&self, ix: u64) -> i16 {
            self.raw(ix) as i16
        }
        fn get_i32(&self, ix: u64) -> i32 {
            self.raw(ix) as i32
        }
        fn get_i64(&self, ix: u64) -> i64 {
            self.raw(ix) as i64
        }
        fn get_f32(&self, ix: u64) -> f32 {
            self.raw(ix) as f32
        }
        fn get_f64(&self, ix: u64) -> f64 {
            self.raw(ix) as f64
        }
    };
}

/// Generates sentinel numeric accessors (0 / NaN) for non-numeric readers.
macro_rules! sentinel_views {
    () => {
        fn get_i8(&self, _ix: u64) -> i8 {
            0
        }
        fn get_i16(&self, _ix: u64) -> i16 {
            0
        }
        fn get_i32(&self, _ix: u64) -> i32 {
            0
        }
        fn get_i64(&self, _ix: u64) -> i64 {
            0
        }
        fn get_f32(&self, _ix: u64) -> f32 {
            f32::NAN
        }
        fn get_f64(&self, _ix: u64) -> f64 {
            f64::NAN
        }
    };
}

struct BoolReader {
    buf: Buf,
}

impl BoolReader {
    fn raw(&self, ix: u64) -> bool {
        self.buf.is_bit_set(ix)
    }
}

impl Reader for BoolReader {
    fn value_type(&self) -> ValueType {
        ValueType::Bool
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::Bool(self.raw(ix))
    }
    fn get_i8(&self, ix: u64) -> i8 {
        self.raw(ix) as i8
    }
    fn get_i16(&self, ix: u64) -> i16 {
        self.raw(ix) as i16
    }
    fn get_i32(&self, ix: u64) -> i32 {
        self.raw(ix) as i32
    }
    fn get_i64(&self, ix: u64) -> i64 {
        self.raw(ix) as i64
    }
    fn get_f32(&self, ix: u64) -> f32 {
        if self.raw(ix) {
            1.0
        } else {
            0.0
        }
    }
    fn get_f64(&self, ix: u64) -> f64 {
        if self.raw(ix) {
            1.0
        } else {
            0.0
        }
    }
}

struct I8Reader {
    buf: Buf,
}

impl I8Reader {
    fn raw(&self, ix: u64) -> i8 {
        self.buf.get(ix) as i8
    }
}

impl Reader for I8Reader {
    fn value_type(&self) -> ValueType {
        ValueType::I8
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::I8(self.raw(ix))
    }
    numeric_views!();
}

struct I16Reader {
    buf: Buf,
}

impl I16Reader {
    fn raw(&self, ix: u64) -> i16 {
        self.buf.get_i16_le(2 * ix)
    }
}

impl Reader for I16Reader {
    fn value_type(&self) -> ValueType {
        ValueType::I16
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::I16(self.raw(ix))
    }
    numeric_views!();
}

struct I32Reader {
    buf: Buf,
}

impl I32Reader {
    fn raw(&self, ix: u64) -> i32 {
        self.buf.get_i32_le(4 * ix)
    }
}

impl Reader for I32Reader {
    fn value_type(&self) -> ValueType {
        ValueType::I32
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::I32(self.raw(ix))
    }
    numeric_views!();
}

struct I64Reader {
    buf: Buf,
}

impl I64Reader {
    fn raw(&self, ix: u64) -> i64 {
        self.buf.get_i64_le(8 * ix)
    }
}

impl Reader for I64Reader {
    fn value_type(&self) -> ValueType {
        ValueType::I64
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::I64(self.raw(ix))
    }
    numeric_views!();
}

struct U8Reader {
    buf: Buf,
}

impl U8Reader {
    fn raw(&self, ix: u64) -> u8 {
        self.buf.get(ix)
    }
}

impl Reader for U8Reader {
    fn value_type(&self) -> ValueType {
        ValueType::U8
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::U8(self.raw(ix))
    }
    numeric_views!();
}

struct U16Reader {
    buf: Buf,
}

impl U16Reader {
    fn raw(&self, ix: u64) -> u16 {
        self.buf.get_i16_le(2 * ix) as u16
    }
}

impl Reader for U16Reader {
    fn value_type(&self) -> ValueType {
        ValueType::U16
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::U16(self.raw(ix))
    }
    numeric_views!();
}

struct U32Reader {
    buf: Buf,
}

impl U32Reader {
    fn raw(&self, ix: u64) -> u32 {
        self.buf.get_i32_le(4 * ix) as u32
    }
}

impl Reader for U32Reader {
    fn value_type(&self) -> ValueType {
        ValueType::U32
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::U32(self.raw(ix))
    }
    numeric_views!();
}

struct F32Reader {
    buf: Buf,
}

impl F32Reader {
    fn raw(&self, ix: u64) -> f32 {
        self.buf.get_f32_le(4 * ix)
    }
}

impl Reader for F32Reader {
    fn value_type(&self) -> ValueType {
        ValueType::F32
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::F32(self.raw(ix))
    }
    numeric_views!();
}

struct F64Reader {
    buf: Buf,
}

impl F64Reader {
    fn raw(&self, ix: u64) -> f64 {
        self.buf.get_f64_le(8 * ix)
    }
}

impl Reader for F64Reader {
    fn value_type(&self) -> ValueType {
        ValueType::F64
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::F64(self.raw(ix))
    }
    numeric_views!();
}

/// Shared layout logic for variable-length columns: an `(nrow + 1)`-entry
/// pointer table at the region start, then (8-byte aligned) the data
/// bytes. Row `ix` spans `[data0 + ptr[ix], data0 + ptr[ix + 1])`.
struct VarSlice {
    buf: Buf,
    ptr_size: u64,
    data0: u64,
}

impl VarSlice {
    fn new(buf: Buf, nrow: u64, ptr_size: u64) -> Self {
        let data0 = ceil8((nrow + 1) * ptr_size);
        VarSlice {
            buf,
            ptr_size,
            data0,
        }
    }

    fn pointer(&self, ioff: u64) -> u64 {
        if self.ptr_size == 8 {
            self.buf.get_i64_le(ioff) as u64
        } else {
            self.buf.get_i32_le(ioff) as u64
        }
    }

    fn get_bytes(&self, ix: u64) -> Vec<u8> {
        let ioff0 = ix * self.ptr_size;
        let doff0 = self.pointer(ioff0);
        let doff1 = self.pointer(ioff0 + self.ptr_size);
        let mut dbytes = vec![0u8; (doff1 - doff0) as usize];
        self.buf.get_bytes(self.data0 + doff0, &mut dbytes);
        dbytes
    }
}

struct Utf8Reader {
    slice: VarSlice,
}

impl Reader for Utf8Reader {
    fn value_type(&self) -> ValueType {
        ValueType::Utf8
    }
    fn datum(&self, ix: u64) -> Datum {
        let bytes = self.slice.get_bytes(ix);
        Datum::Utf8(String::from_utf8_lossy(&bytes).into_owned())
    }
    sentinel_views!();
}

struct BytesReader {
    slice: VarSlice,
}

impl Reader for BytesReader {
    fn value_type(&self) -> ValueType {
        ValueType::Bytes
    }
    fn datum(&self, ix: u64) -> Datum {
        Datum::Bytes(self.slice.get_bytes(ix))
    }
    sentinel_views!();
}

/// Stub for unsupported and unknown type codes: every read is null, zero,
/// or NaN, so the file still loads and scans cleanly.
struct NullReader;

impl Reader for NullReader {
    fn value_type(&self) -> ValueType {
        ValueType::Null
    }
    fn datum(&self, _ix: u64) -> Datum {
        Datum::Null
    }
    sentinel_views!();
}
