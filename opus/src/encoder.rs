//! Opus encoder.

use tracing::warn;

use crate::api::{EncoderState, MAX_PACKET_SIZE};
use crate::ctl::{Ctl, CtlReply};
use crate::error::{Error, Result};
use crate::ffi;
use crate::packet::Packet;
use crate::pcm;
use crate::toc::{Bandwidth, FrameDuration};

/// Opus application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    /// Best quality for voice signals.
    VoIP,
    /// Best quality for non-voice signals.
    Audio,
    /// Minimum possible coding delay.
    RestrictedLowdelay,
}

impl Application {
    /// Returns the `OPUS_APPLICATION_*` value.
    pub fn code(&self) -> i32 {
        match self {
            Self::VoIP => ffi::OPUS_APPLICATION_VOIP,
            Self::Audio => ffi::OPUS_APPLICATION_AUDIO,
            Self::RestrictedLowdelay => ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        }
    }

    /// Parses an `OPUS_APPLICATION_*` value.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            ffi::OPUS_APPLICATION_VOIP => Ok(Self::VoIP),
            ffi::OPUS_APPLICATION_AUDIO => Ok(Self::Audio),
            ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY => Ok(Self::RestrictedLowdelay),
            _ => Err(Error::bad_arg()),
        }
    }
}

/// Signal type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Auto,
    Voice,
    Music,
}

impl Signal {
    /// Returns the `OPUS_SIGNAL_*` value (or `OPUS_AUTO`).
    pub fn code(&self) -> i32 {
        match self {
            Self::Auto => ffi::OPUS_AUTO,
            Self::Voice => ffi::OPUS_SIGNAL_VOICE,
            Self::Music => ffi::OPUS_SIGNAL_MUSIC,
        }
    }

    /// Parses an `OPUS_SIGNAL_*` value.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            ffi::OPUS_AUTO => Ok(Self::Auto),
            ffi::OPUS_SIGNAL_VOICE => Ok(Self::Voice),
            ffi::OPUS_SIGNAL_MUSIC => Ok(Self::Music),
            _ => Err(Error::bad_arg()),
        }
    }
}

/// Target bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitrate {
    /// Chosen by libopus from channels and sample rate.
    Auto,
    /// As much rate as the output buffer allows.
    Max,
    /// Bits per second.
    Bits(i32),
}

impl Bitrate {
    /// Returns the native value.
    pub fn code(&self) -> i32 {
        match self {
            Self::Auto => ffi::OPUS_AUTO,
            Self::Max => ffi::OPUS_BITRATE_MAX,
            Self::Bits(bits) => *bits,
        }
    }
}

impl From<i32> for Bitrate {
    fn from(value: i32) -> Self {
        match value {
            ffi::OPUS_AUTO => Self::Auto,
            ffi::OPUS_BITRATE_MAX => Self::Max,
            bits => Self::Bits(bits),
        }
    }
}

/// Opus encoder.
///
/// Owns one native encoder. The handle is released on drop or by
/// [`Encoder::close`], whichever comes first.
#[derive(Debug)]
pub struct Encoder {
    application: Application,
    state: EncoderState,
}

impl Encoder {
    /// Creates a new Opus encoder.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Number of channels (1 or 2)
    /// - `application`: Intended application type
    pub fn new(sample_rate: i32, channels: i32, application: Application) -> Result<Self> {
        let state = EncoderState::new(sample_rate, channels, application.code())?;
        Ok(Self { application, state })
    }

    /// Creates a new VoIP encoder.
    pub fn new_voip(sample_rate: i32, channels: i32) -> Result<Self> {
        Self::new(sample_rate, channels, Application::VoIP)
    }

    /// Creates a new audio encoder.
    pub fn new_audio(sample_rate: i32, channels: i32) -> Result<Self> {
        Self::new(sample_rate, channels, Application::Audio)
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> i32 {
        self.state.sample_rate()
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> i32 {
        self.state.channels()
    }

    /// Returns the application the encoder was created with.
    pub fn application(&self) -> Application {
        self.application
    }

    /// Encodes PCM samples to an Opus packet.
    ///
    /// # Parameters
    /// - `pcm`: Input PCM samples (frame_size * channels samples)
    /// - `frame_size`: Number of samples per channel
    pub fn encode(&mut self, pcm: &[i16], frame_size: usize) -> Result<Packet> {
        let data = self
            .state
            .encode(pcm, frame_size, MAX_PACKET_SIZE)
            .inspect_err(|e| warn!("opus: encode failed: {}", e))?;
        Ok(Packet::new(data))
    }

    /// Encodes PCM samples from bytes (little-endian i16).
    pub fn encode_bytes(&mut self, pcm: &[u8], frame_size: usize) -> Result<Packet> {
        let samples = pcm::bytes_to_i16(pcm)?;
        self.encode(&samples, frame_size)
    }

    /// Encodes float PCM samples to an Opus packet.
    pub fn encode_float(&mut self, pcm: &[f32], frame_size: usize) -> Result<Packet> {
        let data = self
            .state
            .encode_float(pcm, frame_size, MAX_PACKET_SIZE)
            .inspect_err(|e| warn!("opus: encode_float failed: {}", e))?;
        Ok(Packet::new(data))
    }

    /// Encodes to a provided buffer. Returns number of bytes written.
    pub fn encode_to(&mut self, pcm: &[i16], frame_size: usize, buf: &mut [u8]) -> Result<usize> {
        self.state.encode_to(pcm, frame_size, buf)
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

    fn set(&mut self, ctl: Ctl) -> Result<()> {
        self.state.ctl(ctl).map(|_| ())
    }

    /// Returns the target bitrate.
    pub fn bitrate(&mut self) -> Result<Bitrate> {
        self.get(Ctl::GetBitrate).map(Bitrate::from)
    }

    /// Sets the target bitrate.
    pub fn set_bitrate(&mut self, bitrate: Bitrate) -> Result<()> {
        self.set(Ctl::SetBitrate(bitrate.code()))
    }

    /// Returns the encoder complexity (0-10).
    pub fn complexity(&mut self) -> Result<i32> {
        self.get(Ctl::GetComplexity)
    }

    /// Sets the encoder complexity (0-10).
    pub fn set_complexity(&mut self, complexity: i32) -> Result<()> {
        self.set(Ctl::SetComplexity(complexity))
    }

    /// Returns the bandwidth currently being coded. A fresh encoder
    /// reports fullband.
    pub fn bandwidth(&mut self) -> Result<Bandwidth> {
        Bandwidth::from_code(self.get(Ctl::GetBandwidth)?)
    }

    /// Forces a bandwidth, or lets libopus choose with None.
    pub fn set_bandwidth(&mut self, bandwidth: Option<Bandwidth>) -> Result<()> {
        let code = bandwidth.map(|b| b.code()).unwrap_or(ffi::OPUS_AUTO);
        self.set(Ctl::SetBandwidth(code))
    }

    /// Returns the maximum bandwidth.
    pub fn max_bandwidth(&mut self) -> Result<Bandwidth> {
        let code = self.get(Ctl::GetMaxBandwidth)?;
        Bandwidth::from_code(code)
    }

    /// Sets the maximum bandwidth.
    pub fn set_max_bandwidth(&mut self, bandwidth: Bandwidth) -> Result<()> {
        self.set(Ctl::SetMaxBandwidth(bandwidth.code()))
    }

    /// Returns true if variable bitrate is enabled.
    pub fn vbr(&mut self) -> Result<bool> {
        self.get(Ctl::GetVbr).map(|v| v != 0)
    }

    /// Enables or disables variable bitrate.
    pub fn set_vbr(&mut self, enabled: bool) -> Result<()> {
        self.set(Ctl::SetVbr(enabled as i32))
    }

    /// Returns true if VBR is constrained.
    pub fn vbr_constraint(&mut self) -> Result<bool> {
        self.get(Ctl::GetVbrConstraint).map(|v| v != 0)
    }

    /// Enables or disables constrained VBR.
    pub fn set_vbr_constraint(&mut self, enabled: bool) -> Result<()> {
        self.set(Ctl::SetVbrConstraint(enabled as i32))
    }

    /// Returns true if inband forward error correction is enabled.
    pub fn inband_fec(&mut self) -> Result<bool> {
        self.get(Ctl::GetInbandFec).map(|v| v != 0)
    }

    /// Enables or disables inband forward error correction.
    pub fn set_inband_fec(&mut self, enabled: bool) -> Result<()> {
        self.set(Ctl::SetInbandFec(enabled as i32))
    }

    /// Returns the expected packet loss percentage.
    pub fn packet_loss_perc(&mut self) -> Result<i32> {
        self.get(Ctl::GetPacketLossPerc)
    }

    /// Sets the expected packet loss percentage (0-100).
    pub fn set_packet_loss_perc(&mut self, percent: i32) -> Result<()> {
        self.set(Ctl::SetPacketLossPerc(percent))
    }

    /// Returns true if discontinuous transmission is enabled.
    pub fn dtx(&mut self) -> Result<bool> {
        self.get(Ctl::GetDtx).map(|v| v != 0)
    }

    /// Enables or disables discontinuous transmission.
    pub fn set_dtx(&mut self, enabled: bool) -> Result<()> {
        self.set(Ctl::SetDtx(enabled as i32))
    }

    /// Returns the forced channel count, or None when not forced.
    pub fn force_channels(&mut self) -> Result<Option<i32>> {
        let v = self.get(Ctl::GetForceChannels)?;
        Ok((v != ffi::OPUS_AUTO).then_some(v))
    }

    /// Forces mono or stereo coding, or lets libopus decide with None.
    pub fn set_force_channels(&mut self, channels: Option<i32>) -> Result<()> {
        self.set(Ctl::SetForceChannels(channels.unwrap_or(ffi::OPUS_AUTO)))
    }

    /// Returns the signal type hint.
    pub fn signal(&mut self) -> Result<Signal> {
        let code = self.get(Ctl::GetSignal)?;
        Signal::from_code(code)
    }

    /// Sets the signal type hint.
    pub fn set_signal(&mut self, signal: Signal) -> Result<()> {
        self.set(Ctl::SetSignal(signal.code()))
    }

    /// Returns the encoder lookahead in samples.
    pub fn lookahead(&mut self) -> Result<i32> {
        self.get(Ctl::GetLookahead)
    }

    /// Returns the input signal depth in bits.
    pub fn lsb_depth(&mut self) -> Result<i32> {
        self.get(Ctl::GetLsbDepth)
    }

    /// Sets the input signal depth in bits (8-24).
    pub fn set_lsb_depth(&mut self, depth: i32) -> Result<()> {
        self.set(Ctl::SetLsbDepth(depth))
    }

    /// Returns the frame duration the encoder is pinned to, or None when
    /// the duration follows the `frame_size` argument.
    ///
    /// The 80, 100 and 120 ms settings, which only [`Encoder::ctl`] can
    /// make, have no [`FrameDuration`] and fail with `InternalError`.
    pub fn expert_frame_duration(&mut self) -> Result<Option<FrameDuration>> {
        let code = self.get(Ctl::GetExpertFrameDuration)?;
        if code == ffi::OPUS_FRAMESIZE_ARG {
            return Ok(None);
        }
        [
            FrameDuration::Duration2500us,
            FrameDuration::Duration5ms,
            FrameDuration::Duration10ms,
            FrameDuration::Duration20ms,
            FrameDuration::Duration40ms,
            FrameDuration::Duration60ms,
        ]
        .into_iter()
        .find(|fd| fd.code() == code)
        .map(Some)
        .ok_or_else(|| Error::from_code(ffi::OPUS_INTERNAL_ERROR))
    }

    /// Pins the frame duration, or follows `frame_size` with None.
    pub fn set_expert_frame_duration(&mut self, duration: Option<FrameDuration>) -> Result<()> {
        let code = duration.map(|d| d.code()).unwrap_or(ffi::OPUS_FRAMESIZE_ARG);
        self.set(Ctl::SetExpertFrameDuration(code))
    }

    /// Returns true if inter-frame prediction is disabled.
    pub fn prediction_disabled(&mut self) -> Result<bool> {
        self.get(Ctl::GetPredictionDisabled).map(|v| v != 0)
    }

    /// Disables or re-enables inter-frame prediction.
    pub fn set_prediction_disabled(&mut self, disabled: bool) -> Result<()> {
        self.set(Ctl::SetPredictionDisabled(disabled as i32))
    }

    /// Returns the final range coder state of the last packet.
    pub fn final_range(&mut self) -> Result<u32> {
        self.state.ctl(Ctl::GetFinalRange)?.into_range()
    }

    /// Returns the frame size for a given duration.
    pub fn frame_size_for_duration(&self, fd: FrameDuration) -> usize {
        fd.samples(self.sample_rate()) as usize
    }

    /// Returns the frame size for 20ms frames (recommended default).
    pub fn frame_size_20ms(&self) -> usize {
        self.frame_size_for_duration(FrameDuration::Duration20ms)
    }

    /// Releases the native encoder. Further calls fail with `InvalidState`.
    pub fn close(&mut self) {
        self.state.destroy();
    }
}
