//! IBW version 5 encoding.
//!
//! Produces files [`crate::parse_ibw`] reads back, and Igor Pro accepts. Used
//! to build fixtures for the validation tests.

use crate::parse::{BIN_HEADER5_BYTES, WAVE_HEADER5_BYTES, v5};
use crate::wave::{ByteOrder, IgorWave, NumberType};

impl IgorWave {
    /// Encode as a version 5 binary wave.
    ///
    /// Samples are written with the header's `number_type`; integer types
    /// truncate toward zero.
    #[must_use]
    pub fn to_ibw5(&self) -> Vec<u8> {
        let header = &self.header;
        let order = header.byte_order;
        let data_bytes = self.data.len() * header.number_type.size();
        let wfm_size = WAVE_HEADER5_BYTES + data_bytes;

        let mut out = vec![0u8; BIN_HEADER5_BYTES + wfm_size];
        put(&mut out, 0, &i16_bytes(5, order));
        put(&mut out, v5::WFM_SIZE, &i32_bytes(len_i32(wfm_size), order));
        put(&mut out, v5::FORMULA_SIZE, &i32_bytes(0, order));
        put(&mut out, v5::NOTE_SIZE, &i32_bytes(len_i32(header.note.len()), order));

        let wave = BIN_HEADER5_BYTES;
        let npnts = len_i32(self.data.len());
        put(&mut out, wave + v5::NPNTS, &i32_bytes(npnts, order));
        put(&mut out, wave + v5::TYPE, &i16_bytes(header.number_type.code(), order));
        put_c_string(&mut out, wave + v5::BNAME, v5::BNAME_LEN, &header.base_name);
        put(&mut out, wave + v5::N_DIM, &i32_bytes(npnts, order));
        put(&mut out, wave + v5::SF_A, &f64_bytes(header.dx, order));
        put(&mut out, wave + v5::SF_B, &f64_bytes(header.x_start, order));
        put_c_string(&mut out, wave + v5::DATA_UNITS, 4, &header.data_units);
        put_c_string(&mut out, wave + v5::DIM_UNITS, 4, &header.x_units);

        let checksum = header_checksum(&out[..BIN_HEADER5_BYTES + WAVE_HEADER5_BYTES], order);
        put(&mut out, v5::CHECKSUM, &i16_bytes(checksum, order));

        let mut offset = BIN_HEADER5_BYTES + WAVE_HEADER5_BYTES;
        for &sample in &self.data {
            let encoded = encode_sample(sample, header.number_type, order);
            put(&mut out, offset, &encoded);
            offset += encoded.len();
        }

        out.extend_from_slice(&header.note);
        out
    }
}

/// Value that makes all 16-bit header words sum to zero.
fn header_checksum(header: &[u8], order: ByteOrder) -> i16 {
    let sum = header.chunks_exact(2).fold(0i16, |acc, word| {
        let word = [word[0], word[1]];
        let value = match order {
            ByteOrder::Little => i16::from_le_bytes(word),
            ByteOrder::Big => i16::from_be_bytes(word),
        };
        acc.wrapping_add(value)
    });
    sum.wrapping_neg()
}

#[allow(clippy::cast_possible_truncation)]
fn encode_sample(value: f64, number_type: NumberType, order: ByteOrder) -> Vec<u8> {
    macro_rules! encode {
        ($v:expr) => {
            match order {
                ByteOrder::Little => $v.to_le_bytes().to_vec(),
                ByteOrder::Big => $v.to_be_bytes().to_vec(),
            }
        };
    }

    match number_type {
        NumberType::F32 => encode!(value as f32),
        NumberType::F64 => encode!(value),
        NumberType::I8 => encode!(value as i8),
        NumberType::I16 => encode!(value as i16),
        NumberType::I32 => encode!(value as i32),
        NumberType::U8 => encode!(value as u8),
        NumberType::U16 => encode!(value as u16),
        NumberType::U32 => encode!(value as u32),
    }
}

fn put(out: &mut [u8], offset: usize, bytes: &[u8]) {
    out[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Write a NUL-terminated string, truncated to fit the field.
fn put_c_string(out: &mut [u8], offset: usize, width: usize, value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(width - 1);
    put(out, offset, &bytes[..len]);
}

fn len_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

const fn i16_bytes(value: i16, order: ByteOrder) -> [u8; 2] {
    match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    }
}

const fn i32_bytes(value: i32, order: ByteOrder) -> [u8; 4] {
    match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    }
}

const fn f64_bytes(value: f64, order: ByteOrder) -> [u8; 8] {
    match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    }
}
