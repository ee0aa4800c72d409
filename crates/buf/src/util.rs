//! Small binary helpers shared by the read and write paths.

use std::io::{self, Write};

/// Pads an output stream to an 8-byte boundary.
///
/// `nb` is the number of bytes written to the stream so far (only the three
/// low bits matter). Writes between 0 and 7 zero bytes so the running count
/// becomes a multiple of 8, and returns how many were written.
pub fn align8<W: Write + ?Sized>(out: &mut W, nb: u64) -> io::Result<u64> {
    let over = nb & 0x7;
    if over == 0 {
        return Ok(0);
    }
    let pad = 8 - over;
    out.write_all(&[0u8; 8][..pad as usize])?;
    Ok(pad)
}

/// Returns the smallest multiple of 8 greater than or equal to `nb`.
#[must_use]
pub fn ceil8(nb: u64) -> u64 {
    (nb + 7) / 8 * 8
}

/// Returns the number of bytes in the UTF-8 encoding of `txt` by
/// classifying each code point, without allocating or encoding.
#[must_use]
pub fn utf8_len(txt: &str) -> u64 {
    let mut count = 0u64;
    for c in txt.chars() {
        count += match c as u32 {
            0..=0x7f => 1,
            0x80..=0x7ff => 2,
            0x800..=0xffff => 3,
            _ => 4,
        };
    }
    debug_assert_eq!(count, txt.len() as u64);
    count
}
