//! PCM buffer sizing and sample conversion.
//!
//! PCM is always interleaved. Byte buffers hold little-endian samples.

use crate::error::{Error, Result};

/// Sample representation accepted by the encoder and produced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 16-bit signed integer.
    I16,
    /// 32-bit float in [-1.0, 1.0].
    F32,
}

impl SampleFormat {
    /// Returns the size of one sample in bytes.
    pub const fn bytes_per_sample(&self) -> usize {
        match self {
            Self::I16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Returns the number of interleaved samples in a frame.
pub const fn pcm_samples(frame_size: usize, channels: usize) -> usize {
    frame_size * channels
}

/// Returns the byte length of a frame of interleaved PCM.
pub const fn pcm_len(frame_size: usize, channels: usize, format: SampleFormat) -> usize {
    pcm_samples(frame_size, channels) * format.bytes_per_sample()
}

/// Checks that a buffer holding `available` interleaved samples can carry
/// `frame_size` samples per channel.
pub fn check_capacity(available: usize, frame_size: usize, channels: usize) -> Result<()> {
    match frame_size.checked_mul(channels) {
        Some(needed) if needed <= available => Ok(()),
        _ => Err(Error::buffer_too_small()),
    }
}

/// Converts little-endian bytes to i16 samples.
pub fn bytes_to_i16(data: &[u8]) -> Result<Vec<i16>> {
    if data.len() % SampleFormat::I16.bytes_per_sample() != 0 {
        return Err(Error::bad_arg());
    }
    Ok(data
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect())
}

/// Converts little-endian bytes to f32 samples.
pub fn bytes_to_f32(data: &[u8]) -> Result<Vec<f32>> {
    if data.len() % SampleFormat::F32.bytes_per_sample() != 0 {
        return Err(Error::bad_arg());
    }
    Ok(data
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Converts i16 samples to little-endian bytes.
pub fn i16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Converts f32 samples to little-endian bytes.
pub fn f32_to_bytes(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}
