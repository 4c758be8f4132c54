//! IBW decoding.
//!
//! Layout (offsets in bytes):
//!
//! ```text
//! v1: BinHeader1 (8)  | WaveHeader2 (110) | data | -
//! v2: BinHeader2 (16) | WaveHeader2 (110) | data | 16 pad | note
//! v3: BinHeader3 (20) | WaveHeader2 (110) | data | note | formula
//! v5: BinHeader5 (64) | WaveHeader5 (320) | data | formula | note | ...
//! ```
//!
//! `wfmSize` covers the wave header plus data. The byte order is whatever
//! makes the leading version word a known version.

use std::path::Path;

use crate::error::IgorError;
use crate::wave::{ByteOrder, IgorHeader, IgorWave, NumberType};

pub(crate) const BIN_HEADER5_BYTES: usize = 64;
pub(crate) const WAVE_HEADER5_BYTES: usize = 320;
pub(crate) const WAVE_HEADER2_BYTES: usize = 110;
const V2_PADDING_BYTES: usize = 16;

pub(crate) mod v5 {
    pub const CHECKSUM: usize = 2;
    pub const WFM_SIZE: usize = 4;
    pub const FORMULA_SIZE: usize = 8;
    pub const NOTE_SIZE: usize = 12;

    // Relative to the start of WaveHeader5.
    pub const NPNTS: usize = 12;
    pub const TYPE: usize = 16;
    pub const BNAME: usize = 28;
    pub const BNAME_LEN: usize = 32;
    pub const N_DIM: usize = 68;
    pub const SF_A: usize = 84;
    pub const SF_B: usize = 116;
    pub const DATA_UNITS: usize = 148;
    pub const DIM_UNITS: usize = 152;
}

mod v2 {
    // Relative to the start of WaveHeader2.
    pub const TYPE: usize = 0;
    pub const BNAME: usize = 6;
    pub const BNAME_LEN: usize = 20;
    pub const DATA_UNITS: usize = 34;
    pub const X_UNITS: usize = 38;
    pub const NPNTS: usize = 42;
    pub const HS_A: usize = 48;
    pub const HS_B: usize = 56;
}

/// Read and parse an IBW file.
///
/// # Errors
///
/// Returns [`IgorError::Io`] if the file cannot be read, or any parse error
/// from [`parse_ibw`].
pub fn read_ibw(path: &Path) -> Result<IgorWave, IgorError> {
    let bytes = std::fs::read(path).map_err(|source| IgorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_ibw(&bytes)
}

/// Parse an in-memory IBW image.
///
/// # Errors
///
/// Returns an [`IgorError`] for unknown versions, unsupported element types,
/// or headers inconsistent with the buffer length.
pub fn parse_ibw(bytes: &[u8]) -> Result<IgorWave, IgorError> {
    let (order, version) = detect_version(bytes)?;
    let reader = Reader { bytes, order };
    if version == 5 {
        parse_v5(&reader)
    } else {
        parse_v1_to_v3(&reader, version)
    }
}

fn detect_version(bytes: &[u8]) -> Result<(ByteOrder, i16), IgorError> {
    let word: [u8; 2] = bytes
        .get(0..2)
        .and_then(|s| s.try_into().ok())
        .ok_or(IgorError::Truncated {
            field: "version",
            start: 0,
            end: 2,
            len: bytes.len(),
        })?;

    let known = |v: i16| matches!(v, 1 | 2 | 3 | 5);
    let little = i16::from_le_bytes(word);
    if known(little) {
        return Ok((ByteOrder::Little, little));
    }
    let big = i16::from_be_bytes(word);
    if known(big) {
        return Ok((ByteOrder::Big, big));
    }
    Err(IgorError::UnsupportedVersion(u16::from_le_bytes(word)))
}

fn parse_v5(reader: &Reader<'_>) -> Result<IgorWave, IgorError> {
    let wfm_size = reader.size(v5::WFM_SIZE, "wfmSize")?;
    let formula_size = reader.size(v5::FORMULA_SIZE, "formulaSize")?;
    let note_size = reader.size(v5::NOTE_SIZE, "noteSize")?;

    let wave = BIN_HEADER5_BYTES;
    reader.verify_checksum(BIN_HEADER5_BYTES + WAVE_HEADER5_BYTES);

    let npnts = reader.size(wave + v5::NPNTS, "npnts")?;
    let number_type = reader.number_type(wave + v5::TYPE)?;
    let base_name = reader.c_string(wave + v5::BNAME, v5::BNAME_LEN, "bname")?;
    let dx = reader.f64(wave + v5::SF_A, "sfA")?;
    let x_start = reader.f64(wave + v5::SF_B, "sfB")?;
    let data_units = reader.c_string(wave + v5::DATA_UNITS, 4, "dataUnits")?;
    let x_units = reader.c_string(wave + v5::DIM_UNITS, 4, "dimUnits")?;

    let data_start = wave + WAVE_HEADER5_BYTES;
    let data_capacity = wfm_size.checked_sub(WAVE_HEADER5_BYTES).ok_or_else(|| {
        IgorError::Corrupt(format!("wfmSize {wfm_size} smaller than the wave header"))
    })?;
    let data = reader.samples(data_start, npnts, number_type, data_capacity)?;

    let note_start = BIN_HEADER5_BYTES + wfm_size + formula_size;
    let note = reader.slice(note_start, note_size, "note")?.to_vec();

    Ok(IgorWave {
        header: IgorHeader {
            version: 5,
            byte_order: reader.order,
            number_type,
            base_name,
            npnts,
            dx,
            x_start,
            data_units,
            x_units,
            note,
        },
        data,
    })
}

fn parse_v1_to_v3(reader: &Reader<'_>, version: i16) -> Result<IgorWave, IgorError> {
    let (bin_size, note_size) = match version {
        1 => (8, 0),
        2 => (16, reader.size(6, "noteSize")?),
        _ => (20, reader.size(6, "noteSize")?),
    };
    let wfm_size = reader.size(2, "wfmSize")?;
    reader.verify_checksum(bin_size + WAVE_HEADER2_BYTES);

    let wave = bin_size;
    let number_type = reader.number_type(wave + v2::TYPE)?;
    let base_name = reader.c_string(wave + v2::BNAME, v2::BNAME_LEN, "bname")?;
    let data_units = reader.c_string(wave + v2::DATA_UNITS, 4, "dataUnits")?;
    let x_units = reader.c_string(wave + v2::X_UNITS, 4, "xUnits")?;
    let npnts = reader.size(wave + v2::NPNTS, "npnts")?;
    let dx = reader.f64(wave + v2::HS_A, "hsA")?;
    let x_start = reader.f64(wave + v2::HS_B, "hsB")?;

    let data_start = wave + WAVE_HEADER2_BYTES;
    let data_capacity = wfm_size.checked_sub(WAVE_HEADER2_BYTES).ok_or_else(|| {
        IgorError::Corrupt(format!("wfmSize {wfm_size} smaller than the wave header"))
    })?;
    let data = reader.samples(data_start, npnts, number_type, data_capacity)?;

    let note = if note_size == 0 {
        Vec::new()
    } else {
        let padding = if version == 2 { V2_PADDING_BYTES } else { 0 };
        let note_start = bin_size + wfm_size + padding;
        reader.slice(note_start, note_size, "note")?.to_vec()
    };

    Ok(IgorWave {
        header: IgorHeader {
            version,
            byte_order: reader.order,
            number_type,
            base_name,
            npnts,
            dx,
            x_start,
            data_units,
            x_units,
            note,
        },
        data,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    order: ByteOrder,
}

impl Reader<'_> {
    fn slice(&self, start: usize, len: usize, field: &'static str) -> Result<&[u8], IgorError> {
        let end = start.checked_add(len).ok_or_else(|| {
            IgorError::Corrupt(format!("overflow while reading field {field}"))
        })?;
        self.bytes.get(start..end).ok_or(IgorError::Truncated {
            field,
            start,
            end,
            len: self.bytes.len(),
        })
    }

    fn array<const N: usize>(
        &self,
        start: usize,
        field: &'static str,
    ) -> Result<[u8; N], IgorError> {
        let slice = self.slice(start, N, field)?;
        slice
            .try_into()
            .map_err(|_| IgorError::Corrupt(format!("failed to parse field {field}")))
    }

    fn i16(&self, start: usize, field: &'static str) -> Result<i16, IgorError> {
        let raw = self.array::<2>(start, field)?;
        Ok(match self.order {
            ByteOrder::Little => i16::from_le_bytes(raw),
            ByteOrder::Big => i16::from_be_bytes(raw),
        })
    }

    fn i32(&self, start: usize, field: &'static str) -> Result<i32, IgorError> {
        let raw = self.array::<4>(start, field)?;
        Ok(match self.order {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        })
    }

    fn f64(&self, start: usize, field: &'static str) -> Result<f64, IgorError> {
        let raw = self.array::<8>(start, field)?;
        Ok(match self.order {
            ByteOrder::Little => f64::from_le_bytes(raw),
            ByteOrder::Big => f64::from_be_bytes(raw),
        })
    }

    /// A non-negative `i32` size or count field.
    fn size(&self, start: usize, field: &'static str) -> Result<usize, IgorError> {
        let value = self.i32(start, field)?;
        usize::try_from(value)
            .map_err(|_| IgorError::Corrupt(format!("negative {field}: {value}")))
    }

    fn number_type(&self, start: usize) -> Result<NumberType, IgorError> {
        let code = self.i16(start, "type")?;
        NumberType::from_code(code).ok_or(IgorError::UnsupportedType(code))
    }

    /// A fixed-width, NUL-terminated string field.
    fn c_string(&self, start: usize, len: usize, field: &'static str) -> Result<String, IgorError> {
        let raw = self.slice(start, len, field)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    fn samples(
        &self,
        start: usize,
        npnts: usize,
        number_type: NumberType,
        capacity: usize,
    ) -> Result<Vec<f64>, IgorError> {
        let size = number_type.size();
        let len = npnts
            .checked_mul(size)
            .ok_or_else(|| IgorError::Corrupt(format!("npnts {npnts} overflows")))?;
        if len > capacity {
            return Err(IgorError::Corrupt(format!(
                "{npnts} points of {size} bytes exceed wfmSize data area of {capacity} bytes"
            )));
        }
        let raw = self.slice(start, len, "wData")?;
        Ok(raw
            .chunks_exact(size)
            .map(|chunk| decode_sample(chunk, number_type, self.order))
            .collect())
    }

    /// Igor stores header checksums so that all 16-bit words sum to zero.
    fn verify_checksum(&self, len: usize) {
        let Ok(raw) = self.slice(0, len, "checksum") else {
            return;
        };
        let sum = raw.chunks_exact(2).fold(0i16, |acc, word| {
            let word = [word[0], word[1]];
            let value = match self.order {
                ByteOrder::Little => i16::from_le_bytes(word),
                ByteOrder::Big => i16::from_be_bytes(word),
            };
            acc.wrapping_add(value)
        });
        if sum != 0 {
            tracing::warn!(sum, "IBW header checksum mismatch; continuing");
        }
    }
}

fn decode_sample(chunk: &[u8], number_type: NumberType, order: ByteOrder) -> f64 {
    macro_rules! decode {
        ($ty:ty, $n:literal) => {{
            let mut raw = [0u8; $n];
            raw.copy_from_slice(chunk);
            match order {
                ByteOrder::Little => <$ty>::from_le_bytes(raw),
                ByteOrder::Big => <$ty>::from_be_bytes(raw),
            }
        }};
    }

    match number_type {
        NumberType::F32 => f64::from(decode!(f32, 4)),
        NumberType::F64 => decode!(f64, 8),
        NumberType::I8 => f64::from(decode!(i8, 1)),
        NumberType::I16 => f64::from(decode!(i16, 2)),
        NumberType::I32 => f64::from(decode!(i32, 4)),
        NumberType::U8 => f64::from(decode!(u8, 1)),
        NumberType::U16 => f64::from(decode!(u16, 2)),
        NumberType::U32 => f64::from(decode!(u32, 4)),
    }
}
