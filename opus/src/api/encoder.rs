//! Native encoder state.

use std::os::raw::c_int;
use std::ptr;

use tracing::debug;

use super::{check_config, saturating_len, to_c_int};
use crate::ctl::{self, Ctl, CtlHandle, CtlReply, Target};
use crate::error::{check, Error, Result};
use crate::ffi::{self, OpusEncoder as OpusEncoderHandle};
use crate::pcm;

/// Owned libopus encoder handle.
pub struct EncoderState {
    sample_rate: i32,
    channels: i32,
    handle: *mut OpusEncoderHandle,
}

// Safety: The encoder handle is not shared across threads.
unsafe impl Send for EncoderState {}

impl Drop for EncoderState {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for EncoderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderState")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl EncoderState {
    /// Returns the size in bytes of an encoder state for the channel count,
    /// or 0 if the channel count is not supported.
    pub fn get_size(channels: i32) -> usize {
        let size = unsafe { ffi::opus_encoder_get_size(channels) };
        size.max(0) as usize
    }

    /// Creates an encoder.
    ///
    /// `application` is one of the `OPUS_APPLICATION_*` values.
    pub fn new(sample_rate: i32, channels: i32, application: i32) -> Result<Self> {
        check_config(sample_rate, channels)?;
        Ctl::SetApplication(application).validate(channels)?;

        let mut error: c_int = 0;
        let handle =
            unsafe { ffi::opus_encoder_create(sample_rate, channels, application, &mut error) };

        if error != ffi::OPUS_OK {
            if !handle.is_null() {
                unsafe { ffi::opus_encoder_destroy(handle) };
            }
            return Err(Error::from_code(error));
        }
        if handle.is_null() {
            return Err(Error::from_code(ffi::OPUS_ALLOC_FAIL));
        }

        debug!(
            "opus: encoder created (fs={}, channels={}, application={})",
            sample_rate, channels, application
        );

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

    fn live(&self) -> Result<*mut OpusEncoderHandle> {
        if self.handle.is_null() {
            return Err(Error::invalid_state());
        }
        Ok(self.handle)
    }

    /// Sends a control request.
    pub fn ctl(&mut self, ctl: Ctl) -> Result<CtlReply> {
        ctl::dispatch(self, ctl)
    }

    /// Encodes one frame of i16 PCM into a new packet of at most
    /// `max_data_bytes` bytes.
    pub fn encode(
        &mut self,
        pcm: &[i16],
        frame_size: usize,
        max_data_bytes: usize,
    ) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; max_data_bytes];
        let n = self.encode_to(pcm, frame_size, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Encodes one frame of i16 PCM into `out`. Returns the packet length.
    pub fn encode_to(&mut self, pcm: &[i16], frame_size: usize, out: &mut [u8]) -> Result<usize> {
        let handle = self.live()?;
        pcm::check_capacity(pcm.len(), frame_size, self.channels as usize)?;
        let frame_size = to_c_int(frame_size)?;

        let n = unsafe {
            ffi::opus_encode(
                handle,
                pcm.as_ptr(),
                frame_size,
                out.as_mut_ptr(),
                saturating_len(out.len()),
            )
        };

        Ok(check(n)? as usize)
    }

    /// Encodes one frame of f32 PCM into a new packet of at most
    /// `max_data_bytes` bytes.
    pub fn encode_float(
        &mut self,
        pcm: &[f32],
        frame_size: usize,
        max_data_bytes: usize,
    ) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; max_data_bytes];
        let n = self.encode_float_to(pcm, frame_size, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Encodes one frame of f32 PCM into `out`. Returns the packet length.
    pub fn encode_float_to(
        &mut self,
        pcm: &[f32],
        frame_size: usize,
        out: &mut [u8],
    ) -> Result<usize> {
        let handle = self.live()?;
        pcm::check_capacity(pcm.len(), frame_size, self.channels as usize)?;
        let frame_size = to_c_int(frame_size)?;

        let n = unsafe {
            ffi::opus_encode_float(
                handle,
                pcm.as_ptr(),
                frame_size,
                out.as_mut_ptr(),
                saturating_len(out.len()),
            )
        };

        Ok(check(n)? as usize)
    }

    /// Releases the native handle. Safe to call more than once.
    pub fn destroy(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::opus_encoder_destroy(self.handle) };
            self.handle = ptr::null_mut();
            debug!("opus: encoder destroyed");
        }
    }
}

impl CtlHandle for EncoderState {
    const TARGET: Target = Target::Encoder;

    fn channels(&self) -> i32 {
        self.channels
    }

    fn ctl_no_arg(&mut self, request: c_int) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_encoder_ctl(handle, request) })
    }

    fn ctl_set(&mut self, request: c_int, value: i32) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_encoder_ctl(handle, request, value) })
    }

    fn ctl_get_i32(&mut self, request: c_int, out: &mut i32) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_encoder_ctl(handle, request, out as *mut i32) })
    }

    fn ctl_get_u32(&mut self, request: c_int, out: &mut u32) -> Result<c_int> {
        let handle = self.live()?;
        Ok(unsafe { ffi::opus_encoder_ctl(handle, request, out as *mut u32) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_state_create() {
        let enc = EncoderState::new(16000, 1, ffi::OPUS_APPLICATION_VOIP).unwrap();
        assert_eq!(enc.sample_rate(), 16000);
        assert_eq!(enc.channels(), 1);
        assert!(!enc.is_closed());
    }

    #[test]
    fn test_encoder_state_rejects_auto_application() {
        let err = EncoderState::new(48000, 2, ffi::OPUS_AUTO).unwrap_err();
        assert!(matches!(err, Error::BadArg(_)));
    }

    #[test]
    fn test_encode_short_pcm_is_buffer_too_small() {
        let mut enc = EncoderState::new(48000, 2, ffi::OPUS_APPLICATION_AUDIO).unwrap();
        let pcm = vec![0i16; 960];
        let err = enc.encode(&pcm, 960, 4000).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall(_)));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut enc = EncoderState::new(48000, 2, ffi::OPUS_APPLICATION_AUDIO).unwrap();
        enc.destroy();
        enc.destroy();
        assert!(enc.is_closed());
        assert!(matches!(enc.ctl(Ctl::GetBitrate), Err(Error::InvalidState(_))));
        let pcm = vec![0i16; 1920];
        assert!(matches!(enc.encode(&pcm, 960, 4000), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_debug_output() {
        let enc = EncoderState::new(8000, 1, ffi::OPUS_APPLICATION_VOIP).unwrap();
        let s = format!("{:?}", enc);
        assert!(s.contains("sample_rate: 8000"));
        assert!(s.contains("closed: false"));
    }
}
