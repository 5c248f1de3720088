//! Packet inspection command.

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use giztoy_opus::packet;

use super::{output_result, print_verbose};
use crate::Cli;

/// Inspect an Opus packet.
///
/// Prints the TOC fields and, when the packet is well formed, its frame
/// layout.
#[derive(Args)]
pub struct TocCommand {
    /// Packet bytes in hex, e.g. fc0000
    packet: String,

    /// Sample rate used for sample counts
    #[arg(long, default_value_t = 48000)]
    sample_rate: i32,
}

#[derive(Serialize)]
struct TocReport {
    toc: u8,
    config: u8,
    mode: String,
    bandwidth: String,
    frame_duration: String,
    stereo: bool,
    frame_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_sizes: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    padding: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TocCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let data = hex::decode(self.packet.trim()).context("invalid hex packet")?;
        anyhow::ensure!(!data.is_empty(), "empty packet");
        print_verbose(cli, &format!("Packet: {} bytes", data.len()));

        output_result(&self.report(&data), cli.json)
    }

    fn report(&self, data: &[u8]) -> TocReport {
        let toc = giztoy_opus::TOC::new(data[0]);
        let config = toc.configuration();

        let mut report = TocReport {
            toc: toc.0,
            config: config.0,
            mode: config.mode().to_string(),
            bandwidth: config.bandwidth().to_string(),
            frame_duration: config.frame_duration().to_string(),
            stereo: toc.is_stereo(),
            frame_code: toc.frame_code().to_string(),
            frames: None,
            samples: None,
            frame_sizes: None,
            padding: None,
            error: None,
        };

        match packet::parse(data) {
            Ok(parsed) => {
                report.frames = Some(parsed.frames.len());
                report.samples = packet::nb_samples(data, self.sample_rate).ok();
                report.frame_sizes = Some(parsed.frames.iter().map(|r| r.len()).collect());
                report.padding = Some(parsed.padding);
            }
            Err(e) => report.error = Some(e.to_string()),
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> TocCommand {
        TocCommand {
            packet: String::new(),
            sample_rate: 48000,
        }
    }

    #[test]
    fn test_report_single_frame() {
        let report = command().report(&[252, 0, 0]);
        assert_eq!(report.config, 31);
        assert!(report.stereo);
        assert_eq!(report.frames, Some(1));
        assert_eq!(report.samples, Some(960));
        assert_eq!(report.frame_sizes, Some(vec![2]));
        assert!(report.error.is_none());
    }

    #[test]
    fn test_report_non_positive_sample_rate() {
        for sample_rate in [0, -8000] {
            let report = TocCommand {
                packet: String::new(),
                sample_rate,
            }
            .report(&[252, 0, 0]);
            assert_eq!(report.frames, Some(1));
            assert!(report.samples.is_none());
        }
    }

    #[test]
    fn test_report_invalid_packet() {
        let report = command().report(&[255]);
        assert!(report.frames.is_none());
        assert!(report.error.is_some());
    }
}
