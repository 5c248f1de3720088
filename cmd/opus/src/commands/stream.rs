//! Length-prefixed packet stream.
//!
//! Each packet is written as a 2-byte big-endian length followed by the
//! packet bytes.

use std::io::{self, Read, Write};

/// Writes one packet.
pub fn write_packet<W: Write>(w: &mut W, packet: &[u8]) -> io::Result<()> {
    let len = u16::try_from(packet.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "packet too large"))?;
    w.write_all(&len.to_be_bytes())?;
    w.write_all(packet)
}

/// Reads one packet, or None at a clean end of stream.
pub fn read_packet<R: Read>(r: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 2];
    let mut filled = 0;
    while filled < header.len() {
        let n = r.read(&mut header[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated packet header",
            ));
        }
        filled += n;
    }

    let mut packet = vec![0u8; u16::from_be_bytes(header) as usize];
    r.read_exact(&mut packet)?;
    Ok(Some(packet))
}
