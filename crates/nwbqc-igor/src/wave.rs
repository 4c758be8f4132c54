//! Parsed wave types.

use nwbqc_core::RawString;

/// Byte order of an IBW file, detected from its version word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Numeric element type of a wave.
///
/// Values are the Igor `NT_*` type codes; complex and text waves are not
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberType {
    F32,
    F64,
    I8,
    I16,
    I32,
    U8,
    U16,
    U32,
}

impl NumberType {
    const UNSIGNED: i16 = 0x40;

    /// Map an Igor type code.
    #[must_use]
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0x02 => Some(Self::F32),
            0x04 => Some(Self::F64),
            0x08 => Some(Self::I8),
            0x10 => Some(Self::I16),
            0x20 => Some(Self::I32),
            0x48 => Some(Self::U8),
            0x50 => Some(Self::U16),
            0x60 => Some(Self::U32),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::F32 => 0x02,
            Self::F64 => 0x04,
            Self::I8 => 0x08,
            Self::I16 => 0x10,
            Self::I32 => 0x20,
            Self::U8 => 0x08 | Self::UNSIGNED,
            Self::U16 => 0x10 | Self::UNSIGNED,
            Self::U32 => 0x20 | Self::UNSIGNED,
        }
    }

    /// Element size in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F64 => 8,
        }
    }
}

/// Header metadata of one wave.
#[derive(Debug, Clone, PartialEq)]
pub struct IgorHeader {
    /// File format version (1, 2, 3 or 5).
    pub version: i16,
    pub byte_order: ByteOrder,
    pub number_type: NumberType,
    /// Wave name as stored in the header.
    pub base_name: String,
    /// Number of points.
    pub npnts: usize,
    /// Sampling interval along x (seconds for recorded sweeps).
    pub dx: f64,
    /// X value of the first point.
    pub x_start: f64,
    pub data_units: String,
    pub x_units: String,
    /// Raw wave note bytes.
    pub note: Vec<u8>,
}

impl IgorHeader {
    /// The wave note as undecoded text.
    #[must_use]
    pub fn annotation(&self) -> RawString {
        RawString::Bytes(self.note.clone())
    }

    /// Sampling rate implied by `dx`.
    #[must_use]
    pub fn sampling_rate(&self) -> f64 {
        1.0 / self.dx
    }
}

/// A parsed wave: header plus samples widened to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct IgorWave {
    pub header: IgorHeader,
    pub data: Vec<f64>,
}
