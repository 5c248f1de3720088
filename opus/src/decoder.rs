//! Opus decoder.

use tracing::warn;

use crate::api::DecoderState;
use crate::ctl::{Ctl, CtlReply};
use crate::error::Result;
use crate::pcm;
use crate::toc::Bandwidth;

/// Opus decoder.
#[derive(Debug)]
pub struct Decoder {
    state: DecoderState,
}

impl Decoder {
    /// Creates a new Opus decoder.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate to decode at (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Number of channels (1 or 2)
    pub fn new(sample_rate: i32, channels: i32) -> Result<Self> {
        let state = DecoderState::new(sample_rate, channels)?;
        Ok(Self { state })
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> i32 {
        self.state.sample_rate()
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> i32 {
        self.state.channels()
    }

    /// Decodes a packet to PCM samples.
    /// Returns the decoded PCM data as bytes (i16 samples, little-endian).
    ///
    /// `frame_size` is the most samples per channel the caller accepts.
    /// With `decode_fec` set, the packet's inband FEC data is used to
    /// reconstruct the previous, lost packet instead.
    pub fn decode(
        &mut self,
        packet: &[u8],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<Vec<u8>> {
        let samples = self
            .state
            .decode(packet, frame_size, decode_fec)
            .inspect_err(|e| warn!("opus: decode failed: {}", e))?;
        Ok(pcm::i16_to_bytes(&samples))
    }

    /// Decodes a packet to interleaved f32 samples.
    pub fn decode_float(
        &mut self,
        packet: &[u8],
        frame_size: usize,
        decode_fec: bool,
    ) -> Result<Vec<f32>> {
        self.state
            .decode_float(packet, frame_size, decode_fec)
            .inspect_err(|e| warn!("opus: decode_float failed: {}", e))
    }

    /// Decodes to a provided buffer. Returns number of samples per channel.
    pub fn decode_to(&mut self, packet: &[u8], buf: &mut [i16]) -> Result<usize> {
        let frame_size = buf.len() / self.channels() as usize;
        self.state.decode_to(packet, buf, frame_size, false)
    }

    /// Performs packet loss concealment (PLC) to generate samples when a packet is lost.
    pub fn decode_plc(&mut self, samples: usize) -> Result<Vec<u8>> {
        self.decode(&[], samples, false)
    }

    /// Returns the number of samples per channel a packet decodes to.
    pub fn nb_samples(&self, packet: &[u8]) -> Result<usize> {
        self.state.nb_samples(packet)
    }

    /// Resets the codec state to what it was right after creation.
    pub fn reset_state(&mut self) -> Result<()> {
        self.state.ctl(Ctl::ResetState).map(|_| ())
    }

    /// Sends a raw control request.
    pub fn ctl(&mut self, ctl: Ctl) -> Result<CtlReply> {
        self.state.ctl(ctl)
    }

    fn get(&mut self, ctl: Ctl) -> Result<i32> {
        self.state.ctl(ctl)?.into_value()
    }

    /// Returns the final range coder state of the last packet.
    pub fn final_range(&mut self) -> Result<u32> {
        self.state.ctl(Ctl::GetFinalRange)?.into_range()
    }

    /// Returns the bandwidth of the last decoded packet, or None before
    /// anything has been decoded.
    pub fn bandwidth(&mut self) -> Result<Option<Bandwidth>> {
        let code = self.get(Ctl::GetBandwidth)?;
        if code == 0 {
            return Ok(None);
        }
        Bandwidth::from_code(code).map(Some)
    }

    /// Returns the pitch period of the last decoded frame, or 0 if it
    /// was not voiced.
    pub fn pitch(&mut self) -> Result<i32> {
        self.get(Ctl::GetPitch)
    }

    /// Returns the output gain in Q8 dB units.
    pub fn gain(&mut self) -> Result<i32> {
        self.get(Ctl::GetGain)
    }

    /// Sets the output gain in Q8 dB units (-32768 to 32767).
    pub fn set_gain(&mut self, gain: i32) -> Result<()> {
        self.state.ctl(Ctl::SetGain(gain)).map(|_| ())
    }

    /// Returns the duration in samples per channel of the last packet.
    pub fn last_packet_duration(&mut self) -> Result<i32> {
        self.get(Ctl::GetLastPacketDuration)
    }

    /// Returns the sample rate as reported by libopus.
    pub fn native_sample_rate(&mut self) -> Result<i32> {
        self.get(Ctl::GetSampleRate)
    }

    /// Returns true if stereo phase inversion is disabled.
    pub fn phase_inversion_disabled(&mut self) -> Result<bool> {
        self.get(Ctl::GetPhaseInversionDisabled).map(|v| v != 0)
    }

    /// Releases the native decoder. Further calls fail with `InvalidState`.
    pub fn close(&mut self) {
        self.state.destroy();
    }

    /// Returns the most samples per channel a single packet can hold at
    /// this decoder's sample rate (120 ms).
    pub fn max_frame_size(&self) -> usize {
        self.state.max_frame_size()
    }
}
