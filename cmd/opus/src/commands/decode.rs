//! Decode command.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use anyhow::Context;
use clap::Args;

use giztoy_opus::FrameDuration;

use super::stream::read_packet;
use super::{load_config, print_success, print_verbose};
use crate::Cli;

/// Decode a packet stream to raw PCM.
///
/// Output is interleaved 16-bit little-endian PCM. Zero-length packets in
/// the stream are treated as lost and concealed.
#[derive(Args)]
pub struct DecodeCommand {
    /// Input packet stream file
    #[arg(short = 'i', long)]
    input: String,

    /// Output PCM file
    #[arg(short = 'o', long)]
    output: String,
}

impl DecodeCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = load_config(cli)?.decoder;
        let mut decoder = config.build().context("failed to create decoder")?;
        let max_frame = decoder.max_frame_size();
        let plc_frame = FrameDuration::Duration20ms.samples(decoder.sample_rate()) as usize;

        print_verbose(
            cli,
            &format!(
                "Decoder: {} Hz, {} channel(s)",
                decoder.sample_rate(),
                decoder.channels()
            ),
        );

        let mut input = BufReader::new(
            File::open(&self.input).with_context(|| format!("failed to open {}", self.input))?,
        );
        let mut out = BufWriter::new(
            File::create(&self.output)
                .with_context(|| format!("failed to create {}", self.output))?,
        );

        let mut packets = 0usize;
        let mut total = 0usize;
        while let Some(packet) = read_packet(&mut input)? {
            let pcm = if packet.is_empty() {
                decoder.decode_plc(plc_frame)?
            } else {
                decoder
                    .decode(&packet, max_frame, false)
                    .with_context(|| format!("packet {}", packets))?
            };
            out.write_all(&pcm)?;
            packets += 1;
            total += pcm.len();
        }
        out.flush()?;

        print_success(&format!(
            "Decoded {} packet(s), {} bytes -> {}",
            packets, total, self.output
        ));
        Ok(())
    }
}
