//! Opus packet introspection.
//!
//! These queries read only the TOC byte (and, for code 3 packets, the frame
//! count byte). They never touch codec state and agree bit-for-bit with the
//! `opus_packet_get_*` family in libopus.

use std::ops::Range;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::toc::{parse_frame_count_byte, Bandwidth, FrameCode, TOC};

/// Largest compressed size of a single frame (RFC 6716 Section 3.4, R2).
pub const MAX_FRAME_BYTES: usize = 1275;

/// Largest number of samples per channel in one packet (120 ms at 48 kHz).
pub const MAX_PACKET_SAMPLES: usize = 5760;

/// Returns the number of frames in a packet.
///
/// Code 3 packets report the count byte as-is, including a count of zero;
/// use [`parse`] to validate the whole packet.
pub fn nb_frames(packet: &[u8]) -> Result<usize> {
    let toc = first(packet)?;
    match toc.frame_code() {
        FrameCode::OneFrame => Ok(1),
        FrameCode::TwoEqualFrames | FrameCode::TwoDifferentFrames => Ok(2),
        FrameCode::ArbitraryFrames => match packet.get(1) {
            Some(&byte) => Ok(parse_frame_count_byte(byte).2 as usize),
            None => Err(Error::invalid_packet()),
        },
    }
}

/// Returns the bandwidth signalled by a packet.
pub fn bandwidth(packet: &[u8]) -> Result<Bandwidth> {
    Ok(first(packet)?.configuration().bandwidth())
}

/// Returns the number of channels signalled by a packet.
pub fn nb_channels(packet: &[u8]) -> Result<usize> {
    Ok(first(packet)?.channels() as usize)
}

/// Returns the number of samples per channel in each frame of a packet at
/// the given sample rate.
pub fn nb_samples_per_frame(packet: &[u8], sample_rate: i32) -> Result<usize> {
    if sample_rate <= 0 {
        return Err(Error::bad_arg());
    }
    let samples = first(packet)?.configuration().samples_per_frame(sample_rate);
    usize::try_from(samples).map_err(|_| Error::bad_arg())
}

/// Returns the total number of samples per channel in a packet at the given
/// sample rate. Packets longer than 120 ms are invalid.
pub fn nb_samples(packet: &[u8], sample_rate: i32) -> Result<usize> {
    if sample_rate <= 0 {
        return Err(Error::bad_arg());
    }
    let count = nb_frames(packet)?;
    let samples = count
        .checked_mul(nb_samples_per_frame(packet, sample_rate)?)
        .ok_or_else(Error::invalid_packet)?;
    if samples as u64 * 25 > sample_rate as u64 * 3 {
        return Err(Error::invalid_packet());
    }
    Ok(samples)
}

fn first(packet: &[u8]) -> Result<TOC> {
    packet
        .first()
        .map(|&b| TOC::new(b))
        .ok_or_else(Error::bad_arg)
}

/// A packet split into its frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPacket {
    /// The TOC byte.
    pub toc: TOC,
    /// Byte ranges of each compressed frame within the packet.
    pub frames: Vec<Range<usize>>,
    /// Number of trailing padding bytes.
    pub padding: usize,
}

impl ParsedPacket {
    /// Returns the payload offset of the first frame.
    pub fn payload_offset(&self) -> usize {
        self.frames.first().map(|r| r.start).unwrap_or(0)
    }
}

/// Reads a frame length (RFC 6716 Section 3.2.1).
/// Returns (bytes consumed, frame length).
fn parse_size(data: &[u8]) -> Result<(usize, usize)> {
    match data {
        [] => Err(Error::invalid_packet()),
        [b0, ..] if *b0 < 252 => Ok((1, *b0 as usize)),
        [_] => Err(Error::invalid_packet()),
        [b0, b1, ..] => Ok((2, 4 * *b1 as usize + *b0 as usize)),
    }
}

/// Parses the frame layout of a packet (RFC 6716 Section 3.2).
///
/// Fails with `InvalidPacket` when the packet is empty, declares zero
/// frames or more than 120 ms, or carries a length that does not fit.
pub fn parse(packet: &[u8]) -> Result<ParsedPacket> {
    let toc = match packet.first() {
        Some(&b) => TOC::new(b),
        None => return Err(Error::invalid_packet()),
    };
    let frame_size = toc.configuration().samples_per_frame(48000) as usize;

    // `offset` walks the header; `len` is what remains for frame data.
    let mut offset = 1;
    let mut len = packet.len() - 1;
    let mut sizes = Vec::with_capacity(2);
    let mut padding = 0;
    let last_size;

    match toc.frame_code() {
        FrameCode::OneFrame => {
            last_size = len;
        }
        FrameCode::TwoEqualFrames => {
            if len % 2 != 0 {
                return Err(Error::invalid_packet());
            }
            last_size = len / 2;
            sizes.push(last_size);
        }
        FrameCode::TwoDifferentFrames => {
            let (n, size) = parse_size(&packet[offset..])?;
            len -= n;
            if size > len {
                return Err(Error::invalid_packet());
            }
            offset += n;
            sizes.push(size);
            last_size = len - size;
        }
        FrameCode::ArbitraryFrames => {
            if len < 1 {
                return Err(Error::invalid_packet());
            }
            let (vbr, has_padding, count) = parse_frame_count_byte(packet[offset]);
            offset += 1;
            len -= 1;

            let count = count as usize;
            if count == 0 || frame_size * count > MAX_PACKET_SAMPLES {
                return Err(Error::invalid_packet());
            }

            if has_padding {
                loop {
                    if len == 0 {
                        return Err(Error::invalid_packet());
                    }
                    let p = packet[offset];
                    offset += 1;
                    len -= 1;
                    let n = if p == 255 { 254 } else { p as usize };
                    if n > len {
                        return Err(Error::invalid_packet());
                    }
                    len -= n;
                    padding += n;
                    if p != 255 {
                        break;
                    }
                }
            }

            if vbr {
                let mut last = len as isize;
                for _ in 0..count - 1 {
                    let (n, size) = parse_size(&packet[offset..offset + len])?;
                    len -= n;
                    if size > len {
                        return Err(Error::invalid_packet());
                    }
                    offset += n;
                    sizes.push(size);
                    last -= (n + size) as isize;
                }
                if last < 0 {
                    return Err(Error::invalid_packet());
                }
                last_size = last as usize;
            } else {
                last_size = len / count;
                if last_size * count != len {
                    return Err(Error::invalid_packet());
                }
                sizes.extend(std::iter::repeat_n(last_size, count - 1));
            }
        }
    }

    if last_size > MAX_FRAME_BYTES {
        return Err(Error::invalid_packet());
    }
    sizes.push(last_size);

    let mut pos = offset;
    let frames = sizes
        .into_iter()
        .map(|size| {
            let range = pos..pos + size;
            pos += size;
            range
        })
        .collect();

    Ok(ParsedPacket {
        toc,
        frames,
        padding,
    })
}

/// Raw Opus packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet(pub Vec<u8>);

impl Packet {
    /// Creates a new packet from bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Creates a packet from a byte slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self(data.to_vec())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the packet is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the TOC byte, or a zero TOC for an empty packet.
    pub fn toc(&self) -> TOC {
        TOC::new(self.0.first().copied().unwrap_or(0))
    }

    /// Returns true if this packet contains stereo audio.
    pub fn is_stereo(&self) -> bool {
        self.toc().is_stereo()
    }

    /// Returns the bandwidth of this packet.
    pub fn bandwidth(&self) -> Result<Bandwidth> {
        bandwidth(&self.0)
    }

    /// Returns the number of frames in this packet.
    pub fn nb_frames(&self) -> Result<usize> {
        nb_frames(&self.0)
    }

    /// Returns the number of samples per channel at the given sample rate.
    pub fn nb_samples(&self, sample_rate: i32) -> Result<usize> {
        nb_samples(&self.0, sample_rate)
    }

    /// Returns the total duration of audio in this packet.
    /// Empty or malformed packets have zero duration.
    pub fn duration(&self) -> Duration {
        let Ok(count) = self.nb_frames() else {
            return Duration::ZERO;
        };
        self.toc().configuration().frame_duration().duration() * count as u32
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for Packet {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

impl From<Packet> for Vec<u8> {
    fn from(packet: Packet) -> Self {
        packet.0
    }
}
