//! Encoder and decoder settings.
//!
//! Settings are plain serde structs so they can be read from YAML or JSON
//! request files. Unset optional fields leave the libopus default alone.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decoder::Decoder;
use crate::encoder::{Application, Bitrate, Encoder, Signal};
use crate::error::{Error, Result};
use crate::toc::{Bandwidth, FrameDuration};

/// Error loading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config: read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config: yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config: json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Invalid(String),
}

/// Application name as written in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationName {
    Voip,
    #[default]
    Audio,
    RestrictedLowdelay,
}

impl From<ApplicationName> for Application {
    fn from(name: ApplicationName) -> Self {
        match name {
            ApplicationName::Voip => Application::VoIP,
            ApplicationName::Audio => Application::Audio,
            ApplicationName::RestrictedLowdelay => Application::RestrictedLowdelay,
        }
    }
}

/// Signal hint as written in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalName {
    Auto,
    Voice,
    Music,
}

impl From<SignalName> for Signal {
    fn from(name: SignalName) -> Self {
        match name {
            SignalName::Auto => Signal::Auto,
            SignalName::Voice => Signal::Voice,
            SignalName::Music => Signal::Music,
        }
    }
}

/// Bandwidth as written in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandwidthName {
    Nb,
    Mb,
    Wb,
    Swb,
    Fb,
}

impl From<BandwidthName> for Bandwidth {
    fn from(name: BandwidthName) -> Self {
        match name {
            BandwidthName::Nb => Bandwidth::NB,
            BandwidthName::Mb => Bandwidth::MB,
            BandwidthName::Wb => Bandwidth::WB,
            BandwidthName::Swb => Bandwidth::SWB,
            BandwidthName::Fb => Bandwidth::FB,
        }
    }
}

fn default_sample_rate() -> i32 {
    48000
}

fn default_channels() -> i32 {
    2
}

fn default_frame_duration_ms() -> u32 {
    20
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: i32,

    #[serde(default = "default_channels")]
    pub channels: i32,

    #[serde(default)]
    pub application: ApplicationName,

    /// Target bitrate in bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<BandwidthName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bandwidth: Option<BandwidthName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vbr: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vbr_constraint: Option<bool>,

    /// Inband forward error correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fec: Option<bool>,

    /// Expected packet loss percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_loss: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtx: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lsb_depth: Option<i32>,

    /// Frame length in milliseconds; 2 means 2.5 ms.
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            application: ApplicationName::default(),
            bitrate: None,
            complexity: None,
            bandwidth: None,
            max_bandwidth: None,
            signal: None,
            vbr: None,
            vbr_constraint: None,
            fec: None,
            packet_loss: None,
            dtx: None,
            lsb_depth: None,
            frame_duration_ms: default_frame_duration_ms(),
        }
    }
}

impl EncoderConfig {
    /// Returns the configured frame duration.
    pub fn frame_duration(&self) -> Result<FrameDuration> {
        FrameDuration::from_millis(self.frame_duration_ms).ok_or_else(Error::bad_arg)
    }

    /// Returns the frame size in samples per channel.
    pub fn frame_size(&self) -> Result<usize> {
        Ok(self.frame_duration()?.samples(self.sample_rate) as usize)
    }

    /// Creates an encoder and applies every set option.
    pub fn build(&self) -> Result<Encoder> {
        self.frame_duration()?;
        let mut enc = Encoder::new(self.sample_rate, self.channels, self.application.into())?;

        if let Some(bitrate) = self.bitrate {
            enc.set_bitrate(Bitrate::from(bitrate))?;
        }
        if let Some(complexity) = self.complexity {
            enc.set_complexity(complexity)?;
        }
        if let Some(bandwidth) = self.bandwidth {
            enc.set_bandwidth(Some(bandwidth.into()))?;
        }
        if let Some(bandwidth) = self.max_bandwidth {
            enc.set_max_bandwidth(bandwidth.into())?;
        }
        if let Some(signal) = self.signal {
            enc.set_signal(signal.into())?;
        }
        if let Some(vbr) = self.vbr {
            enc.set_vbr(vbr)?;
        }
        if let Some(constraint) = self.vbr_constraint {
            enc.set_vbr_constraint(constraint)?;
        }
        if let Some(fec) = self.fec {
            enc.set_inband_fec(fec)?;
        }
        if let Some(loss) = self.packet_loss {
            enc.set_packet_loss_perc(loss)?;
        }
        if let Some(dtx) = self.dtx {
            enc.set_dtx(dtx)?;
        }
        if let Some(depth) = self.lsb_depth {
            enc.set_lsb_depth(depth)?;
        }

        debug!("opus: encoder configured: {:?}", self);
        Ok(enc)
    }
}

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: i32,

    #[serde(default = "default_channels")]
    pub channels: i32,

    /// Output gain in Q8 dB units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<i32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            gain: None,
        }
    }
}

impl DecoderConfig {
    /// Creates a decoder and applies the gain, if set.
    pub fn build(&self) -> Result<Decoder> {
        let mut dec = Decoder::new(self.sample_rate, self.channels)?;
        if let Some(gain) = self.gain {
            dec.set_gain(gain)?;
        }
        Ok(dec)
    }
}

/// Codec settings file: an optional encoder and decoder section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub decoder: DecoderConfig,
}

impl Config {
    /// Parses YAML settings.
    pub fn from_yaml(s: &str) -> std::result::Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parses JSON settings.
    pub fn from_json(s: &str) -> std::result::Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads settings from a file. `.json` files are read as JSON,
    /// everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let cfg = if is_json {
            Self::from_json(&data)?
        } else {
            Self::from_yaml(&data)?
        };

        if FrameDuration::from_millis(cfg.encoder.frame_duration_ms).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unsupported frame duration: {}ms",
                cfg.encoder.frame_duration_ms
            )));
        }
        Ok(cfg)
    }
}
