//! Rust bindings for libopus.
//!
//! This crate wraps the native Opus codec (RFC 6716) and provides:
//!
//! - `ctl`: typed encoder/decoder control requests with argument validation
//! - `toc` / `packet`: table-of-contents and packet introspection
//! - `pcm`: PCM buffer sizing and byte conversions
//! - `api`: low-level encoder/decoder state handles
//! - `encoder` / `decoder`: high-level session objects
//! - `config`: serde-backed codec settings
//!
//! Encoding, decoding and packet loss concealment run inside libopus.
//!
//! # Example
//!
//! ```no_run
//! use giztoy_opus::{Application, Decoder, Encoder};
//!
//! # fn main() -> giztoy_opus::Result<()> {
//! let mut encoder = Encoder::new(16000, 1, Application::VoIP)?;
//! let pcm = vec![0i16; 320]; // 20ms at 16kHz
//! let packet = encoder.encode(&pcm, 320)?;
//!
//! let mut decoder = Decoder::new(16000, 1)?;
//! let decoded = decoder.decode(packet.as_bytes(), 320, false)?;
//! assert_eq!(decoded.len(), 320 * 2);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod ctl;
mod decoder;
mod encoder;
mod error;
pub mod ffi;
pub mod packet;
pub mod pcm;
pub mod toc;

pub use api::{DecoderState, EncoderState};
pub use config::{Config, ConfigError, DecoderConfig, EncoderConfig};
pub use ctl::{Ctl, CtlReply, Target};
pub use decoder::Decoder;
pub use encoder::{Application, Bitrate, Encoder, Signal};
pub use error::{check, Error, Result};
pub use packet::{Packet, ParsedPacket};
pub use toc::{Bandwidth, Configuration, ConfigurationMode, FrameCode, FrameDuration, TOC};

/// Returns the version string of the linked libopus.
pub fn version() -> String {
    ffi::version_string()
}
