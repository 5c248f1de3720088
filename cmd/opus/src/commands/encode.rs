//! Encode command.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;
use clap::Args;

use giztoy_opus::pcm;

use super::stream::write_packet;
use super::{load_config, print_success, print_verbose};
use crate::Cli;

/// Encode raw PCM to a packet stream.
///
/// Input is interleaved 16-bit little-endian PCM at the configured sample
/// rate and channel count. A short final frame is padded with silence.
#[derive(Args)]
pub struct EncodeCommand {
    /// Input PCM file
    #[arg(short = 'i', long)]
    input: String,

    /// Output packet stream file
    #[arg(short = 'o', long)]
    output: String,

    /// Override the configured bitrate (bits per second)
    #[arg(long)]
    bitrate: Option<i32>,
}

impl EncodeCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut config = load_config(cli)?.encoder;
        if self.bitrate.is_some() {
            config.bitrate = self.bitrate;
        }

        let frame_size = config.frame_size()?;
        let mut encoder = config.build().context("failed to create encoder")?;

        print_verbose(
            cli,
            &format!(
                "Encoder: {} Hz, {} channel(s), {} samples per frame",
                config.sample_rate, config.channels, frame_size
            ),
        );

        let data = std::fs::read(&self.input)
            .with_context(|| format!("failed to read {}", self.input))?;
        let frame_bytes =
            pcm::pcm_len(frame_size, config.channels as usize, pcm::SampleFormat::I16);

        let mut out = BufWriter::new(
            File::create(&self.output)
                .with_context(|| format!("failed to create {}", self.output))?,
        );

        let mut packets = 0usize;
        let mut total = 0usize;
        for chunk in data.chunks(frame_bytes) {
            let packet = if chunk.len() == frame_bytes {
                encoder.encode_bytes(chunk, frame_size)?
            } else {
                let mut padded = chunk.to_vec();
                padded.resize(frame_bytes, 0);
                encoder.encode_bytes(&padded, frame_size)?
            };
            write_packet(&mut out, packet.as_bytes())?;
            packets += 1;
            total += packet.len();
        }
        out.flush()?;

        print_success(&format!(
            "Encoded {} packet(s), {} bytes -> {}",
            packets, total, self.output
        ));
        Ok(())
    }
}
