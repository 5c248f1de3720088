//! Low-level encoder and decoder state.
//!
//! [`EncoderState`] and [`DecoderState`] own one native handle each and
//! expose the raw libopus calls with Rust buffers: size queries, create,
//! control, encode/decode and destroy. A destroyed state rejects every
//! further call with `InvalidState`.

mod decoder;
mod encoder;

pub use decoder::DecoderState;
pub use encoder::EncoderState;

use std::os::raw::c_int;

use crate::error::{Error, Result};

/// Sample rates libopus accepts for encoding and decoding.
pub const SAMPLE_RATES: [i32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Largest packet produced by [`EncoderState::encode`] when no explicit
/// limit is given.
pub const MAX_PACKET_SIZE: usize = 4000;

/// Returns true if libopus accepts this sample rate.
pub fn is_valid_sample_rate(sample_rate: i32) -> bool {
    SAMPLE_RATES.contains(&sample_rate)
}

/// Checks construction parameters the way `opus_*_init` does.
pub(crate) fn check_config(sample_rate: i32, channels: i32) -> Result<()> {
    if !is_valid_sample_rate(sample_rate) || !(1..=2).contains(&channels) {
        return Err(Error::bad_arg());
    }
    Ok(())
}

pub(crate) fn to_c_int(n: usize) -> Result<c_int> {
    c_int::try_from(n).map_err(|_| Error::bad_arg())
}

/// Native byte limits are `opus_int32`; larger buffers saturate.
pub(crate) fn saturating_len(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
