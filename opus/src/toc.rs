//! Opus TOC (Table of Contents) parsing.
//!
//! Implements RFC 6716 Section 3.1.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::ffi;

/// TOC byte from an Opus packet header.
///
/// Layout:
/// ```text
///          0 1 2 3 4 5 6 7
///         +-+-+-+-+-+-+-+-+
///         | config  |s| c |
///         +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TOC(pub u8);

impl TOC {
    /// Creates a TOC from a byte.
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the configuration number (0-31).
    pub fn configuration(&self) -> Configuration {
        Configuration(self.0 >> 3)
    }

    /// Returns true if the TOC indicates stereo audio.
    pub fn is_stereo(&self) -> bool {
        (self.0 & 0b00000100) != 0
    }

    /// Returns the number of coded channels.
    pub fn channels(&self) -> u8 {
        if self.is_stereo() { 2 } else { 1 }
    }

    /// Returns the frame code (number of frames per packet).
    pub fn frame_code(&self) -> FrameCode {
        FrameCode::from_bits(self.0 & 0b00000011)
    }
}

impl std::fmt::Display for TOC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "opus_toc: stereo={}, mode={}, bw={}, {}, {}",
            self.is_stereo(),
            self.configuration().mode(),
            self.configuration().bandwidth(),
            self.frame_code(),
            self.configuration().frame_duration(),
        )
    }
}

/// Opus configuration number (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration(pub u8);

impl Configuration {
    /// Returns the configuration mode (SILK, CELT, or Hybrid).
    pub fn mode(&self) -> ConfigurationMode {
        match self.0 & 0x1f {
            0..=11 => ConfigurationMode::Silk,
            12..=15 => ConfigurationMode::Hybrid,
            _ => ConfigurationMode::CELT,
        }
    }

    /// Returns the audio bandwidth.
    pub fn bandwidth(&self) -> Bandwidth {
        match self.0 & 0x1f {
            0..=3 => Bandwidth::NB,
            4..=7 => Bandwidth::MB,
            8..=11 => Bandwidth::WB,
            12..=13 => Bandwidth::SWB,
            14..=15 => Bandwidth::FB,
            16..=19 => Bandwidth::NB,
            20..=23 => Bandwidth::WB,
            24..=27 => Bandwidth::SWB,
            _ => Bandwidth::FB,
        }
    }

    /// Returns the frame duration.
    pub fn frame_duration(&self) -> FrameDuration {
        let size = (self.0 & 0x03) as usize;
        match self.mode() {
            ConfigurationMode::Silk => [
                FrameDuration::Duration10ms,
                FrameDuration::Duration20ms,
                FrameDuration::Duration40ms,
                FrameDuration::Duration60ms,
            ][size],
            ConfigurationMode::Hybrid => [
                FrameDuration::Duration10ms,
                FrameDuration::Duration20ms,
            ][size & 0x01],
            ConfigurationMode::CELT => [
                FrameDuration::Duration2500us,
                FrameDuration::Duration5ms,
                FrameDuration::Duration10ms,
                FrameDuration::Duration20ms,
            ][size],
        }
    }

    /// Returns the number of samples per channel in one frame at the
    /// given sample rate.
    pub fn samples_per_frame(&self, sample_rate: i32) -> i32 {
        self.frame_duration().samples(sample_rate)
    }
}

/// Configuration mode (SILK, CELT, or Hybrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationMode {
    Silk,
    CELT,
    Hybrid,
}

impl std::fmt::Display for ConfigurationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silk => write!(f, "Silk"),
            Self::CELT => write!(f, "CELT"),
            Self::Hybrid => write!(f, "Hybrid"),
        }
    }
}

/// Frame code indicating number of frames per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// One frame in the packet.
    OneFrame,
    /// Two frames with equal compressed size.
    TwoEqualFrames,
    /// Two frames with different compressed sizes.
    TwoDifferentFrames,
    /// Arbitrary number of frames.
    ArbitraryFrames,
}

impl FrameCode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::OneFrame,
            1 => Self::TwoEqualFrames,
            2 => Self::TwoDifferentFrames,
            _ => Self::ArbitraryFrames,
        }
    }
}

impl std::fmt::Display for FrameCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneFrame => write!(f, "One Frame"),
            Self::TwoEqualFrames => write!(f, "Two Equal Frames"),
            Self::TwoDifferentFrames => write!(f, "Two Different Frames"),
            Self::ArbitraryFrames => write!(f, "Arbitrary Frames"),
        }
    }
}

/// Frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrameDuration {
    Duration2500us,
    Duration5ms,
    Duration10ms,
    Duration20ms,
    Duration40ms,
    Duration60ms,
}

impl FrameDuration {
    /// Returns the duration in microseconds.
    pub fn micros(&self) -> u32 {
        match self {
            Self::Duration2500us => 2500,
            Self::Duration5ms => 5000,
            Self::Duration10ms => 10_000,
            Self::Duration20ms => 20_000,
            Self::Duration40ms => 40_000,
            Self::Duration60ms => 60_000,
        }
    }

    /// Returns the duration as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.micros() as u64)
    }

    /// Returns the number of samples per channel at the given sample rate.
    pub fn samples(&self, sample_rate: i32) -> i32 {
        // 2.5 ms is the unit: 400 frames per second.
        let units = i64::from(self.micros() / 2500);
        (i64::from(sample_rate) * units / 400) as i32
    }

    /// Returns the duration for a frame length in milliseconds.
    /// Only 2.5 ms frames need the fractional form, so `2` maps to it.
    pub fn from_millis(millis: u32) -> Option<Self> {
        match millis {
            2 => Some(Self::Duration2500us),
            5 => Some(Self::Duration5ms),
            10 => Some(Self::Duration10ms),
            20 => Some(Self::Duration20ms),
            40 => Some(Self::Duration40ms),
            60 => Some(Self::Duration60ms),
            _ => None,
        }
    }

    /// Returns the matching `OPUS_FRAMESIZE_*` value for the expert frame
    /// duration control.
    pub fn code(&self) -> i32 {
        match self {
            Self::Duration2500us => ffi::OPUS_FRAMESIZE_2_5_MS,
            Self::Duration5ms => ffi::OPUS_FRAMESIZE_5_MS,
            Self::Duration10ms => ffi::OPUS_FRAMESIZE_10_MS,
            Self::Duration20ms => ffi::OPUS_FRAMESIZE_20_MS,
            Self::Duration40ms => ffi::OPUS_FRAMESIZE_40_MS,
            Self::Duration60ms => ffi::OPUS_FRAMESIZE_60_MS,
        }
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration2500us => write!(f, "2.5ms"),
            Self::Duration5ms => write!(f, "5ms"),
            Self::Duration10ms => write!(f, "10ms"),
            Self::Duration20ms => write!(f, "20ms"),
            Self::Duration40ms => write!(f, "40ms"),
            Self::Duration60ms => write!(f, "60ms"),
        }
    }
}

/// Audio bandwidth, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bandwidth {
    /// Narrowband (4 kHz audio, 8 kHz sample rate)
    NB,
    /// Medium-band (6 kHz audio, 12 kHz sample rate)
    MB,
    /// Wideband (8 kHz audio, 16 kHz sample rate)
    WB,
    /// Super-wideband (12 kHz audio, 24 kHz sample rate)
    SWB,
    /// Fullband (20 kHz audio, 48 kHz sample rate)
    FB,
}

impl Bandwidth {
    /// All bandwidths in ascending order.
    pub const ALL: [Bandwidth; 5] = [Self::NB, Self::MB, Self::WB, Self::SWB, Self::FB];

    /// Returns the effective sample rate for this bandwidth.
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::NB => 8000,
            Self::MB => 12000,
            Self::WB => 16000,
            Self::SWB => 24000,
            Self::FB => 48000,
        }
    }

    /// Returns the `OPUS_BANDWIDTH_*` value.
    pub fn code(&self) -> i32 {
        match self {
            Self::NB => ffi::OPUS_BANDWIDTH_NARROWBAND,
            Self::MB => ffi::OPUS_BANDWIDTH_MEDIUMBAND,
            Self::WB => ffi::OPUS_BANDWIDTH_WIDEBAND,
            Self::SWB => ffi::OPUS_BANDWIDTH_SUPERWIDEBAND,
            Self::FB => ffi::OPUS_BANDWIDTH_FULLBAND,
        }
    }

    /// Parses an `OPUS_BANDWIDTH_*` value.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            ffi::OPUS_BANDWIDTH_NARROWBAND => Ok(Self::NB),
            ffi::OPUS_BANDWIDTH_MEDIUMBAND => Ok(Self::MB),
            ffi::OPUS_BANDWIDTH_WIDEBAND => Ok(Self::WB),
            ffi::OPUS_BANDWIDTH_SUPERWIDEBAND => Ok(Self::SWB),
            ffi::OPUS_BANDWIDTH_FULLBAND => Ok(Self::FB),
            _ => Err(Error::bad_arg()),
        }
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NB => write!(f, "Narrowband"),
            Self::MB => write!(f, "Mediumband"),
            Self::WB => write!(f, "Wideband"),
            Self::SWB => write!(f, "Superwideband"),
            Self::FB => write!(f, "Fullband"),
        }
    }
}

/// Parses the frame count byte following the TOC byte for packets with
/// arbitrary frame counts (code 3).
///
/// Returns (is_vbr, has_padding, frame_count).
pub fn parse_frame_count_byte(byte: u8) -> (bool, bool, u8) {
    let is_vbr = (byte & 0b10000000) != 0;
    let has_padding = (byte & 0b01000000) != 0;
    let frame_count = byte & 0b00111111;
    (is_vbr, has_padding, frame_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toc_parsing() {
        // Config 9 (WB SILK 20ms), mono, one frame
        let toc = TOC::new(0b01001000);
        assert_eq!(toc.configuration().0, 9);
        assert!(!toc.is_stereo());
        assert_eq!(toc.channels(), 1);
        assert_eq!(toc.frame_code(), FrameCode::OneFrame);
        assert_eq!(toc.configuration().mode(), ConfigurationMode::Silk);
        assert_eq!(toc.configuration().bandwidth(), Bandwidth::WB);
        assert_eq!(toc.configuration().frame_duration(), FrameDuration::Duration20ms);
    }

    #[test]
    fn test_frame_count_byte() {
        let (is_vbr, has_padding, count) = parse_frame_count_byte(0b11000011);
        assert!(is_vbr);
        assert!(has_padding);
        assert_eq!(count, 3);

        let (is_vbr, has_padding, count) = parse_frame_count_byte(0b00000101);
        assert!(!is_vbr);
        assert!(!has_padding);
        assert_eq!(count, 5);
    }

    #[test]
    fn test_toc_frame_codes() {
        assert_eq!(TOC::new(0b00000000).frame_code(), FrameCode::OneFrame);
        assert_eq!(TOC::new(0b00000001).frame_code(), FrameCode::TwoEqualFrames);
        assert_eq!(TOC::new(0b00000010).frame_code(), FrameCode::TwoDifferentFrames);
        assert_eq!(TOC::new(0b00000011).frame_code(), FrameCode::ArbitraryFrames);
    }

    #[test]
    fn test_configuration_modes() {
        for i in 0..=11 {
            assert_eq!(Configuration(i).mode(), ConfigurationMode::Silk);
        }
        for i in 12..=15 {
            assert_eq!(Configuration(i).mode(), ConfigurationMode::Hybrid);
        }
        for i in 16..=31 {
            assert_eq!(Configuration(i).mode(), ConfigurationMode::CELT);
        }
    }

    #[test]
    fn test_configuration_bandwidth() {
        assert_eq!(Configuration(0).bandwidth(), Bandwidth::NB);
        assert_eq!(Configuration(16).bandwidth(), Bandwidth::NB);
        assert_eq!(Configuration(4).bandwidth(), Bandwidth::MB);
        assert_eq!(Configuration(8).bandwidth(), Bandwidth::WB);
        assert_eq!(Configuration(20).bandwidth(), Bandwidth::WB);
        assert_eq!(Configuration(12).bandwidth(), Bandwidth::SWB);
        assert_eq!(Configuration(24).bandwidth(), Bandwidth::SWB);
        assert_eq!(Configuration(14).bandwidth(), Bandwidth::FB);
        assert_eq!(Configuration(31).bandwidth(), Bandwidth::FB);
    }

    #[test]
    fn test_configuration_frame_duration() {
        assert_eq!(Configuration(16).frame_duration(), FrameDuration::Duration2500us);
        assert_eq!(Configuration(17).frame_duration(), FrameDuration::Duration5ms);
        assert_eq!(Configuration(0).frame_duration(), FrameDuration::Duration10ms);
        assert_eq!(Configuration(12).frame_duration(), FrameDuration::Duration10ms);
        assert_eq!(Configuration(15).frame_duration(), FrameDuration::Duration20ms);
        assert_eq!(Configuration(31).frame_duration(), FrameDuration::Duration20ms);
        assert_eq!(Configuration(2).frame_duration(), FrameDuration::Duration40ms);
        assert_eq!(Configuration(11).frame_duration(), FrameDuration::Duration60ms);
    }

    #[test]
    fn test_samples_per_frame() {
        assert_eq!(Configuration(0).samples_per_frame(48000), 480);
        assert_eq!(Configuration(3).samples_per_frame(48000), 2880);
        assert_eq!(Configuration(16).samples_per_frame(48000), 120);
        assert_eq!(Configuration(31).samples_per_frame(48000), 960);
        assert_eq!(Configuration(9).samples_per_frame(16000), 320);
        assert_eq!(Configuration(16).samples_per_frame(8000), 20);
        assert_eq!(Configuration(1).samples_per_frame(44100), 882);
        assert_eq!(Configuration(16).samples_per_frame(44100), 110);
        assert_eq!(Configuration(13).samples_per_frame(22050), 441);
    }

    #[test]
    fn test_frame_duration_conversions() {
        assert_eq!(FrameDuration::Duration2500us.duration(), Duration::from_micros(2500));
        assert_eq!(FrameDuration::Duration60ms.duration(), Duration::from_millis(60));
        assert_eq!(FrameDuration::from_millis(20), Some(FrameDuration::Duration20ms));
        assert_eq!(FrameDuration::from_millis(2), Some(FrameDuration::Duration2500us));
        assert_eq!(FrameDuration::from_millis(30), None);
        assert_eq!(FrameDuration::Duration20ms.code(), ffi::OPUS_FRAMESIZE_20_MS);
        assert_eq!(FrameDuration::Duration10ms.samples(16000), 160);
    }

    #[test]
    fn test_bandwidth_codes() {
        for bw in Bandwidth::ALL {
            assert_eq!(Bandwidth::from_code(bw.code()), Ok(bw));
        }
        assert!(Bandwidth::from_code(ffi::OPUS_AUTO).is_err());
        assert!(Bandwidth::from_code(ffi::OPUS_BANDWIDTH_FULLBAND + 1).is_err());
        assert!(Bandwidth::NB < Bandwidth::MB && Bandwidth::SWB < Bandwidth::FB);
    }

    #[test]
    fn test_toc_display() {
        let s = format!("{}", TOC::new(0b01001000));
        assert!(s.contains("stereo=false"));
        assert!(s.contains("Silk"));
        assert!(s.contains("Wideband"));
    }
}
