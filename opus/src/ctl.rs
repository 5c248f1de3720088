//! Encoder and decoder controls.
//!
//! libopus multiplexes every control through one variadic entry point
//! (`opus_encoder_ctl` / `opus_decoder_ctl`). Here each request is a
//! [`Ctl`] variant; set-style variants carry their `opus_int32` payload.
//! Payloads are checked against the same domains libopus enforces before
//! the native call is made.

use std::os::raw::c_int;

use tracing::trace;

use crate::error::{check, Error, Result};
use crate::ffi;

/// A single control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ctl {
    // Generic
    ResetState,
    GetFinalRange,
    GetBandwidth,
    GetSampleRate,
    SetPhaseInversionDisabled(i32),
    GetPhaseInversionDisabled,

    // Encoder
    SetApplication(i32),
    GetApplication,
    SetBitrate(i32),
    GetBitrate,
    SetMaxBandwidth(i32),
    GetMaxBandwidth,
    SetBandwidth(i32),
    SetVbr(i32),
    GetVbr,
    SetVbrConstraint(i32),
    GetVbrConstraint,
    SetComplexity(i32),
    GetComplexity,
    SetInbandFec(i32),
    GetInbandFec,
    SetPacketLossPerc(i32),
    GetPacketLossPerc,
    SetDtx(i32),
    GetDtx,
    SetForceChannels(i32),
    GetForceChannels,
    SetSignal(i32),
    GetSignal,
    GetLookahead,
    SetLsbDepth(i32),
    GetLsbDepth,
    SetExpertFrameDuration(i32),
    GetExpertFrameDuration,
    SetPredictionDisabled(i32),
    GetPredictionDisabled,

    // Decoder
    SetGain(i32),
    GetGain,
    GetPitch,
    GetLastPacketDuration,
}

/// The kind of handle a control is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Encoder,
    Decoder,
}

/// Result of a control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtlReply {
    /// A set or reset request completed.
    Done,
    /// A get request returned an `opus_int32`.
    Value(i32),
    /// The final range coder state (`opus_uint32`).
    Range(u32),
}

impl CtlReply {
    /// Returns the `opus_int32` carried by a get reply.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            CtlReply::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the final range carried by a reply.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            CtlReply::Range(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn into_value(self) -> Result<i32> {
        self.as_i32()
            .ok_or_else(|| Error::from_code(ffi::OPUS_INTERNAL_ERROR))
    }

    pub(crate) fn into_range(self) -> Result<u32> {
        self.as_u32()
            .ok_or_else(|| Error::from_code(ffi::OPUS_INTERNAL_ERROR))
    }
}

/// How the native call must be shaped.
enum Shape {
    NoArg,
    Set(i32),
    GetI32,
    GetU32,
}

impl Ctl {
    /// Builds a control from a raw request code.
    ///
    /// Set-style requests need a value. Unknown request codes fail with
    /// `Unimplemented`.
    pub fn from_request(request: i32, value: Option<i32>) -> Result<Ctl> {
        let set = |f: fn(i32) -> Ctl| value.map(f).ok_or_else(Error::bad_arg);
        let ctl = match request {
            ffi::OPUS_RESET_STATE => Ctl::ResetState,
            ffi::OPUS_GET_FINAL_RANGE_REQUEST => Ctl::GetFinalRange,
            ffi::OPUS_GET_BANDWIDTH_REQUEST => Ctl::GetBandwidth,
            ffi::OPUS_GET_SAMPLE_RATE_REQUEST => Ctl::GetSampleRate,
            ffi::OPUS_SET_PHASE_INVERSION_DISABLED_REQUEST => {
                set(Ctl::SetPhaseInversionDisabled)?
            }
            ffi::OPUS_GET_PHASE_INVERSION_DISABLED_REQUEST => Ctl::GetPhaseInversionDisabled,
            ffi::OPUS_SET_APPLICATION_REQUEST => set(Ctl::SetApplication)?,
            ffi::OPUS_GET_APPLICATION_REQUEST => Ctl::GetApplication,
            ffi::OPUS_SET_BITRATE_REQUEST => set(Ctl::SetBitrate)?,
            ffi::OPUS_GET_BITRATE_REQUEST => Ctl::GetBitrate,
            ffi::OPUS_SET_MAX_BANDWIDTH_REQUEST => set(Ctl::SetMaxBandwidth)?,
            ffi::OPUS_GET_MAX_BANDWIDTH_REQUEST => Ctl::GetMaxBandwidth,
            ffi::OPUS_SET_BANDWIDTH_REQUEST => set(Ctl::SetBandwidth)?,
            ffi::OPUS_SET_VBR_REQUEST => set(Ctl::SetVbr)?,
            ffi::OPUS_GET_VBR_REQUEST => Ctl::GetVbr,
            ffi::OPUS_SET_VBR_CONSTRAINT_REQUEST => set(Ctl::SetVbrConstraint)?,
            ffi::OPUS_GET_VBR_CONSTRAINT_REQUEST => Ctl::GetVbrConstraint,
            ffi::OPUS_SET_COMPLEXITY_REQUEST => set(Ctl::SetComplexity)?,
            ffi::OPUS_GET_COMPLEXITY_REQUEST => Ctl::GetComplexity,
            ffi::OPUS_SET_INBAND_FEC_REQUEST => set(Ctl::SetInbandFec)?,
            ffi::OPUS_GET_INBAND_FEC_REQUEST => Ctl::GetInbandFec,
            ffi::OPUS_SET_PACKET_LOSS_PERC_REQUEST => set(Ctl::SetPacketLossPerc)?,
            ffi::OPUS_GET_PACKET_LOSS_PERC_REQUEST => Ctl::GetPacketLossPerc,
            ffi::OPUS_SET_DTX_REQUEST => set(Ctl::SetDtx)?,
            ffi::OPUS_GET_DTX_REQUEST => Ctl::GetDtx,
            ffi::OPUS_SET_FORCE_CHANNELS_REQUEST => set(Ctl::SetForceChannels)?,
            ffi::OPUS_GET_FORCE_CHANNELS_REQUEST => Ctl::GetForceChannels,
            ffi::OPUS_SET_SIGNAL_REQUEST => set(Ctl::SetSignal)?,
            ffi::OPUS_GET_SIGNAL_REQUEST => Ctl::GetSignal,
            ffi::OPUS_GET_LOOKAHEAD_REQUEST => Ctl::GetLookahead,
            ffi::OPUS_SET_LSB_DEPTH_REQUEST => set(Ctl::SetLsbDepth)?,
            ffi::OPUS_GET_LSB_DEPTH_REQUEST => Ctl::GetLsbDepth,
            ffi::OPUS_SET_EXPERT_FRAME_DURATION_REQUEST => set(Ctl::SetExpertFrameDuration)?,
            ffi::OPUS_GET_EXPERT_FRAME_DURATION_REQUEST => Ctl::GetExpertFrameDuration,
            ffi::OPUS_SET_PREDICTION_DISABLED_REQUEST => set(Ctl::SetPredictionDisabled)?,
            ffi::OPUS_GET_PREDICTION_DISABLED_REQUEST => Ctl::GetPredictionDisabled,
            ffi::OPUS_SET_GAIN_REQUEST => set(Ctl::SetGain)?,
            ffi::OPUS_GET_GAIN_REQUEST => Ctl::GetGain,
            ffi::OPUS_GET_PITCH_REQUEST => Ctl::GetPitch,
            ffi::OPUS_GET_LAST_PACKET_DURATION_REQUEST => Ctl::GetLastPacketDuration,
            _ => return Err(Error::unimplemented()),
        };
        Ok(ctl)
    }

    /// Returns the native request code.
    pub fn request(&self) -> i32 {
        match self {
            Ctl::ResetState => ffi::OPUS_RESET_STATE,
            Ctl::GetFinalRange => ffi::OPUS_GET_FINAL_RANGE_REQUEST,
            Ctl::GetBandwidth => ffi::OPUS_GET_BANDWIDTH_REQUEST,
            Ctl::GetSampleRate => ffi::OPUS_GET_SAMPLE_RATE_REQUEST,
            Ctl::SetPhaseInversionDisabled(_) => ffi::OPUS_SET_PHASE_INVERSION_DISABLED_REQUEST,
            Ctl::GetPhaseInversionDisabled => ffi::OPUS_GET_PHASE_INVERSION_DISABLED_REQUEST,
            Ctl::SetApplication(_) => ffi::OPUS_SET_APPLICATION_REQUEST,
            Ctl::GetApplication => ffi::OPUS_GET_APPLICATION_REQUEST,
            Ctl::SetBitrate(_) => ffi::OPUS_SET_BITRATE_REQUEST,
            Ctl::GetBitrate => ffi::OPUS_GET_BITRATE_REQUEST,
            Ctl::SetMaxBandwidth(_) => ffi::OPUS_SET_MAX_BANDWIDTH_REQUEST,
            Ctl::GetMaxBandwidth => ffi::OPUS_GET_MAX_BANDWIDTH_REQUEST,
            Ctl::SetBandwidth(_) => ffi::OPUS_SET_BANDWIDTH_REQUEST,
            Ctl::SetVbr(_) => ffi::OPUS_SET_VBR_REQUEST,
            Ctl::GetVbr => ffi::OPUS_GET_VBR_REQUEST,
            Ctl::SetVbrConstraint(_) => ffi::OPUS_SET_VBR_CONSTRAINT_REQUEST,
            Ctl::GetVbrConstraint => ffi::OPUS_GET_VBR_CONSTRAINT_REQUEST,
            Ctl::SetComplexity(_) => ffi::OPUS_SET_COMPLEXITY_REQUEST,
            Ctl::GetComplexity => ffi::OPUS_GET_COMPLEXITY_REQUEST,
            Ctl::SetInbandFec(_) => ffi::OPUS_SET_INBAND_FEC_REQUEST,
            Ctl::GetInbandFec => ffi::OPUS_GET_INBAND_FEC_REQUEST,
            Ctl::SetPacketLossPerc(_) => ffi::OPUS_SET_PACKET_LOSS_PERC_REQUEST,
            Ctl::GetPacketLossPerc => ffi::OPUS_GET_PACKET_LOSS_PERC_REQUEST,
            Ctl::SetDtx(_) => ffi::OPUS_SET_DTX_REQUEST,
            Ctl::GetDtx => ffi::OPUS_GET_DTX_REQUEST,
            Ctl::SetForceChannels(_) => ffi::OPUS_SET_FORCE_CHANNELS_REQUEST,
            Ctl::GetForceChannels => ffi::OPUS_GET_FORCE_CHANNELS_REQUEST,
            Ctl::SetSignal(_) => ffi::OPUS_SET_SIGNAL_REQUEST,
            Ctl::GetSignal => ffi::OPUS_GET_SIGNAL_REQUEST,
            Ctl::GetLookahead => ffi::OPUS_GET_LOOKAHEAD_REQUEST,
            Ctl::SetLsbDepth(_) => ffi::OPUS_SET_LSB_DEPTH_REQUEST,
            Ctl::GetLsbDepth => ffi::OPUS_GET_LSB_DEPTH_REQUEST,
            Ctl::SetExpertFrameDuration(_) => ffi::OPUS_SET_EXPERT_FRAME_DURATION_REQUEST,
            Ctl::GetExpertFrameDuration => ffi::OPUS_GET_EXPERT_FRAME_DURATION_REQUEST,
            Ctl::SetPredictionDisabled(_) => ffi::OPUS_SET_PREDICTION_DISABLED_REQUEST,
            Ctl::GetPredictionDisabled => ffi::OPUS_GET_PREDICTION_DISABLED_REQUEST,
            Ctl::SetGain(_) => ffi::OPUS_SET_GAIN_REQUEST,
            Ctl::GetGain => ffi::OPUS_GET_GAIN_REQUEST,
            Ctl::GetPitch => ffi::OPUS_GET_PITCH_REQUEST,
            Ctl::GetLastPacketDuration => ffi::OPUS_GET_LAST_PACKET_DURATION_REQUEST,
        }
    }

    /// Returns a stable, lower-case name for logs and command lines.
    pub fn name(&self) -> &'static str {
        match self {
            Ctl::ResetState => "reset_state",
            Ctl::GetFinalRange => "get_final_range",
            Ctl::GetBandwidth => "get_bandwidth",
            Ctl::GetSampleRate => "get_sample_rate",
            Ctl::SetPhaseInversionDisabled(_) => "set_phase_inversion_disabled",
            Ctl::GetPhaseInversionDisabled => "get_phase_inversion_disabled",
            Ctl::SetApplication(_) => "set_application",
            Ctl::GetApplication => "get_application",
            Ctl::SetBitrate(_) => "set_bitrate",
            Ctl::GetBitrate => "get_bitrate",
            Ctl::SetMaxBandwidth(_) => "set_max_bandwidth",
            Ctl::GetMaxBandwidth => "get_max_bandwidth",
            Ctl::SetBandwidth(_) => "set_bandwidth",
            Ctl::SetVbr(_) => "set_vbr",
            Ctl::GetVbr => "get_vbr",
            Ctl::SetVbrConstraint(_) => "set_vbr_constraint",
            Ctl::GetVbrConstraint => "get_vbr_constraint",
            Ctl::SetComplexity(_) => "set_complexity",
            Ctl::GetComplexity => "get_complexity",
            Ctl::SetInbandFec(_) => "set_inband_fec",
            Ctl::GetInbandFec => "get_inband_fec",
            Ctl::SetPacketLossPerc(_) => "set_packet_loss_perc",
            Ctl::GetPacketLossPerc => "get_packet_loss_perc",
            Ctl::SetDtx(_) => "set_dtx",
            Ctl::GetDtx => "get_dtx",
            Ctl::SetForceChannels(_) => "set_force_channels",
            Ctl::GetForceChannels => "get_force_channels",
            Ctl::SetSignal(_) => "set_signal",
            Ctl::GetSignal => "get_signal",
            Ctl::GetLookahead => "get_lookahead",
            Ctl::SetLsbDepth(_) => "set_lsb_depth",
            Ctl::GetLsbDepth => "get_lsb_depth",
            Ctl::SetExpertFrameDuration(_) => "set_expert_frame_duration",
            Ctl::GetExpertFrameDuration => "get_expert_frame_duration",
            Ctl::SetPredictionDisabled(_) => "set_prediction_disabled",
            Ctl::GetPredictionDisabled => "get_prediction_disabled",
            Ctl::SetGain(_) => "set_gain",
            Ctl::GetGain => "get_gain",
            Ctl::GetPitch => "get_pitch",
            Ctl::GetLastPacketDuration => "get_last_packet_duration",
        }
    }

    /// Returns true if a handle of the given kind understands this request.
    pub fn supports(&self, target: Target) -> bool {
        match self {
            Ctl::ResetState
            | Ctl::GetFinalRange
            | Ctl::GetBandwidth
            | Ctl::GetSampleRate
            | Ctl::SetPhaseInversionDisabled(_)
            | Ctl::GetPhaseInversionDisabled => true,
            Ctl::SetGain(_) | Ctl::GetGain | Ctl::GetPitch | Ctl::GetLastPacketDuration => {
                target == Target::Decoder
            }
            _ => target == Target::Encoder,
        }
    }

    /// Checks a set-style payload against its legal domain.
    ///
    /// `channels` is the channel count of the receiving handle; it bounds
    /// the forced channel count.
    pub fn validate(&self, channels: i32) -> Result<()> {
        let ok = match *self {
            Ctl::SetApplication(v) => matches!(
                v,
                ffi::OPUS_APPLICATION_VOIP
                    | ffi::OPUS_APPLICATION_AUDIO
                    | ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY
            ),
            Ctl::SetBitrate(v) => v > 0 || v == ffi::OPUS_AUTO || v == ffi::OPUS_BITRATE_MAX,
            Ctl::SetMaxBandwidth(v) => {
                (ffi::OPUS_BANDWIDTH_NARROWBAND..=ffi::OPUS_BANDWIDTH_FULLBAND).contains(&v)
            }
            Ctl::SetBandwidth(v) => {
                v == ffi::OPUS_AUTO
                    || (ffi::OPUS_BANDWIDTH_NARROWBAND..=ffi::OPUS_BANDWIDTH_FULLBAND).contains(&v)
            }
            Ctl::SetComplexity(v) => (0..=10).contains(&v),
            Ctl::SetPacketLossPerc(v) => (0..=100).contains(&v),
            Ctl::SetVbr(v)
            | Ctl::SetVbrConstraint(v)
            | Ctl::SetDtx(v)
            | Ctl::SetInbandFec(v)
            | Ctl::SetPredictionDisabled(v)
            | Ctl::SetPhaseInversionDisabled(v) => (0..=1).contains(&v),
            Ctl::SetForceChannels(v) => v == ffi::OPUS_AUTO || (1..=channels).contains(&v),
            Ctl::SetSignal(v) => matches!(
                v,
                ffi::OPUS_AUTO | ffi::OPUS_SIGNAL_VOICE | ffi::OPUS_SIGNAL_MUSIC
            ),
            Ctl::SetLsbDepth(v) => (8..=24).contains(&v),
            Ctl::SetGain(v) => (i16::MIN as i32..=i16::MAX as i32).contains(&v),
            Ctl::SetExpertFrameDuration(v) => {
                (ffi::OPUS_FRAMESIZE_ARG..=ffi::OPUS_FRAMESIZE_120_MS).contains(&v)
            }
            _ => true,
        };
        if !ok {
            return Err(Error::bad_arg());
        }
        Ok(())
    }

    fn shape(&self) -> Shape {
        match *self {
            Ctl::ResetState => Shape::NoArg,
            Ctl::GetFinalRange => Shape::GetU32,
            Ctl::SetPhaseInversionDisabled(v)
            | Ctl::SetApplication(v)
            | Ctl::SetBitrate(v)
            | Ctl::SetMaxBandwidth(v)
            | Ctl::SetBandwidth(v)
            | Ctl::SetVbr(v)
            | Ctl::SetVbrConstraint(v)
            | Ctl::SetComplexity(v)
            | Ctl::SetInbandFec(v)
            | Ctl::SetPacketLossPerc(v)
            | Ctl::SetDtx(v)
            | Ctl::SetForceChannels(v)
            | Ctl::SetSignal(v)
            | Ctl::SetLsbDepth(v)
            | Ctl::SetExpertFrameDuration(v)
            | Ctl::SetPredictionDisabled(v)
            | Ctl::SetGain(v) => Shape::Set(v),
            _ => Shape::GetI32,
        }
    }
}

impl std::fmt::Display for Ctl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.shape() {
            Shape::Set(v) => write!(f, "{}({})", self.name(), v),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// A native handle that accepts control requests.
///
/// One method per call shape of the variadic control entry point.
/// Implementations return `InvalidState` for a released handle.
pub(crate) trait CtlHandle {
    const TARGET: Target;

    fn channels(&self) -> i32;

    fn ctl_no_arg(&mut self, request: c_int) -> Result<c_int>;

    fn ctl_set(&mut self, request: c_int, value: i32) -> Result<c_int>;

    fn ctl_get_i32(&mut self, request: c_int, out: &mut i32) -> Result<c_int>;

    fn ctl_get_u32(&mut self, request: c_int, out: &mut u32) -> Result<c_int>;
}

/// Sends a control request to a handle.
pub(crate) fn dispatch<H: CtlHandle>(handle: &mut H, ctl: Ctl) -> Result<CtlReply> {
    if !ctl.supports(H::TARGET) {
        return Err(Error::unimplemented());
    }
    ctl.validate(handle.channels())?;

    trace!(target = ?H::TARGET, ctl = %ctl, "opus: ctl");

    let request = ctl.request();
    match ctl.shape() {
        Shape::NoArg => {
            check(handle.ctl_no_arg(request)?)?;
            Ok(CtlReply::Done)
        }
        Shape::Set(value) => {
            check(handle.ctl_set(request, value)?)?;
            Ok(CtlReply::Done)
        }
        Shape::GetI32 => {
            let mut value = 0i32;
            check(handle.ctl_get_i32(request, &mut value)?)?;
            Ok(CtlReply::Value(value))
        }
        Shape::GetU32 => {
            let mut value = 0u32;
            check(handle.ctl_get_u32(request, &mut value)?)?;
            Ok(CtlReply::Range(value))
        }
    }
}
