//! Native decoder state.

use std::os::raw::c_int;
use std::ptr;

use tracing::debug;

use super::{check_config, saturating_len, to_c_int};
use crate::ctl::{self, Ctl, CtlHandle, CtlReply, Target};
use crate::error::{check, Error, Result};
use crate::ffi::{self, OpusDecoder as OpusDecoderHandle};
use crate::packet;
use crate::pcm;

/// Owned libopus decoder handle.
pub struct DecoderState {
    sample_rate: i32,
    channels: i32,
    handle: *mut OpusDecoderHandle,
}

// Safety: The decoder handle is not shared across threads.
unsafe impl Send for DecoderState {}

impl Drop for DecoderState {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for DecoderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderState")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl DecoderState {
    /// Returns the size in bytes of a decoder state for the channel count,
    /// or 0 if the channel count is not supported.
    pub fn get_size(channels: i32) -> usize {
        let size = unsafe { ffi::opus_decoder_get_size(channels) };
        size.max(0) as usize
    }

    /// Creates a decoder.
    pub fn new(sample_rate: i32, channels: i32) -> Result<Self> {
        check_config(sample_rate, channels)?;

        let mut error: c_int = 0;
        let handle = unsafe { ffi::opus_decoder_create(sample_rate, channels, &mut error) };

        if error != ffi::OPUS_OK {
            if !handle.is_null() {
                unsafe { ffi::opus_decoder_destroy(handle) };
            }
            return Err(Error::from_code(error));
        }
        if handle.is_null() {
            return Err(Error::from_code(ffi::OPUS_ALLOC_FAIL));
        }

        debug!("opus: decoder created (fs={}, channels={})", sample_rate, channels);

        Ok(Self {
            sample_rate,
            channels,
            handle,
        })
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> i32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Returns true once the native handle has been released.
    pub fn is_closed(&self) -> bool {
        self.handle.is_null()
    }

    fn live(&self) -> Result<*mut OpusDecoderHandle> {
        if self.handle.is_null() {
            return Err(Error::invalid_state());
        }
        Ok(self.handle)
    }

    /// Sends a control request.
    pub fn ctl(&mut self, ctl: Ctl) -> Result<CtlReply> {
        ctl::dispatch(self, ctl)
    }

    /// Returns the number of samples per channel a packet decodes to.
    pub fn nb_samples(&self, packet: &[u8]) -> Result<usize> {
        let handle = self.live()?;
        if packet.is_empty() {
            return Err(Error::bad_arg());
        }
        let n = unsafe {
            ffi::opus_decoder_get_nb_samples(handle, packet.as_ptr(), saturating_len(packet.len()))
        };
        Ok(check(n)? as usize)
    }

    /// Returns the most samples per channel a single packet can hold at
    /// this sample rate (120 ms).
    pub fn max_frame_size(&self) -> usize {
        self.sample_rate as usize * 120 / 1000
    }

    /// Checks `frame_size`, the output capacity and the packet's signalled
    /// length, as `opus_decode` would.
    fn prepare(
        &self,
        packet: &[u8],
        out_len: usize,
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<c_int> {
        if frame_size == 0 {
            return Err(Error::bad_arg());
        }
        let native_frame_size = to_c_int(frame_size)?;
        pcm::check_capacity(out_len, frame_size, self.channels as usize)?;
        if !packet.is_empty() && !decode_fec {
            let samples = packet::nb_samples(packet, self.sample_rate)?;
            if samples > frame_size {
                return Err(Error::buffer_too_small());
            }
        }
        Ok(native_frame_size)
    }

    /// Decodes a packet into `pcm`. An empty packet requests packet loss
    /// concealment. Returns the number of samples per channel written.
    pub fn decode_to(
        &mut self,
        packet: &[u8],
        pcm: &mut [i16],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        let handle = self.live()?;
        let frame_size = self.prepare(packet, pcm.len(), frame_size, decode_fec)?;
        let (data, len) = packet_ptr(packet);

        let n = unsafe {
            ffi::opus_decode(
                handle,
                data,
                len,
                pcm.as_mut_ptr(),
                frame_size,
                decode_fec as c_int,
            )
        };

        Ok(check(n)? as usize)
    }

    /// Decodes a packet into f32 samples. See [`DecoderState::decode_to`].
    pub fn decode_float_to(
        &mut self,
        packet: &[u8],
        pcm: &mut [f32],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<usize> {
        let handle = self.live()?;
        let frame_size = self.prepare(packet, pcm.len(), frame_size, decode_fec)?;
        let (data, len) = packet_ptr(packet);

        let n = unsafe {
            ffi::opus_decode_float(
                handle,
                data,
                len,
                pcm.as_mut_ptr(),
                frame_size,
                decode_fec as c_int,
            )
        };

        Ok(check(n)? as usize)
    }

    /// Decodes a packet, returning interleaved i16 samples.
    ///
    /// Output is allocated for at most [`DecoderState::max_frame_size`]
    /// samples per channel, whatever `frame_size` asks for.
    pub fn decode(
        &mut self,
        packet: &[u8],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<Vec<i16>> {
        let frame_size = frame_size.min(self.max_frame_size());
        let mut buf = vec![0i16; pcm::pcm_samples(frame_size, self.channels as usize)];
        let n = self.decode_to(packet, &mut buf, frame_size, decode_fec)?;
        buf.truncate(pcm::pcm_samples(n, self.channels as usize));
        Ok(buf)
    }

    /// Decodes a packet, returning interleaved f32 samples.
    pub fn decode_float(
        &mut self,
        packet: &[u8],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<Vec<f32>> {
        let frame_size = frame_size.min(self.max_frame_size());
        let mut buf = vec![0f32; pcm::pcm_samples(frame_size, self.channels as usize)];
        let n = self.decode_float_to(packet, &mut buf, frame_size, decode_fec)?;
        buf.truncate(pcm::pcm_samples(n, self.channels as usize));
        Ok(buf)
    }

    /// Releases the native handle. Safe to call more than once.
    pub fn destroy(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::opus_decoder_destroy(self.handle) };
            self.handle = ptr::null_mut();
            debug!("opus: decoder destroyed");
        }
    }
}

fn packet_ptr(packet: &[u8]) -> (*const u8, i32) {
    if packet.is_empty() {
        (ptr::null(), 0)
    } else {
        (packet.as_ptr(), saturating_len(packet.len()))
    }
}

impl CtlHandle for DecoderState {
    const TARGET: Target = Target::Decoder;

    fn channels(&self) -> i32 {
        self.channels
    }

    fn ctl_no_arg(&mut self, request: c_int) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_decoder_ctl(handle, request) })
    }

    fn ctl_set(&mut self, request: c_int, value: i32) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_decoder_ctl(handle, request, value) })
    }

    fn ctl_get_i32(&mut self, request: c_int, out: &mut i32) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_decoder_ctl(handle, request, out as *mut i32) })
    }

    fn ctl_get_u32(&mut self, request: c_int, out: &mut u32) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_decoder_ctl(handle, request, out as *mut u32) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_state_create() {
        let dec = DecoderState::new(48000, 2).unwrap();
        assert_eq!(dec.sample_rate(), 48000);
        assert_eq!(dec.channels(), 2);
    }

    #[test]
    fn test_decode_to_short_output() {
        let mut dec = DecoderState::new(48000, 2).unwrap();
        let mut pcm = vec![0i16; 960];
        let err = dec.decode_to(&[252, 0, 0], &mut pcm, 960, false).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall(_)));
    }

    #[test]
    fn test_decode_zero_frame_size_is_bad_arg() {
        let mut dec = DecoderState::new(48000, 2).unwrap();
        assert!(matches!(dec.decode(&[252, 0, 0], 0, false), Err(Error::BadArg(_))));
        assert!(matches!(dec.decode_float(&[252, 0, 0], 0, false), Err(Error::BadArg(_))));
        let mut pcm = vec![0i16; 1920];
        let err = dec.decode_to(&[252, 0, 0], &mut pcm, 0, false).unwrap_err();
        assert!(matches!(err, Error::BadArg(_)));
    }

    #[test]
    fn test_decode_huge_frame_size() {
        let mut dec = DecoderState::new(48000, 2).unwrap();
        assert_eq!(dec.max_frame_size(), 5760);
        let pcm = dec.decode(&[252, 0, 0], usize::MAX / 2, false).unwrap();
        assert_eq!(pcm.len(), 960 * 2);
        let pcm = dec.decode_float(&[252, 0, 0], 1 << 33, false).unwrap();
        assert_eq!(pcm.len(), 960 * 2);

        let mut pcm = vec![0i16; 1920];
        let err = dec.decode_to(&[252, 0, 0], &mut pcm, usize::MAX / 2, false).unwrap_err();
        assert!(matches!(err, Error::BadArg(_)));
    }

    #[test]
    fn test_decode_plc() {
        let mut dec = DecoderState::new(16000, 1).unwrap();
        let pcm = dec.decode(&[], 320, false).unwrap();
        assert_eq!(pcm.len(), 320);
    }

    #[test]
    fn test_nb_samples_empty_packet() {
        let dec = DecoderState::new(48000, 2).unwrap();
        assert!(matches!(dec.nb_samples(&[]), Err(Error::BadArg(_))));
    }

    #[test]
    fn test_destroyed_decoder_is_invalid_state() {
        let mut dec = DecoderState::new(48000, 2).unwrap();
        dec.destroy();
        assert!(matches!(dec.ctl(Ctl::GetGain), Err(Error::InvalidState(_))));
        assert!(matches!(dec.decode(&[252, 0, 0], 960, false), Err(Error::InvalidState(_))));
        assert!(matches!(dec.nb_samples(&[0]), Err(Error::InvalidState(_))));
    }
}
