use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tempfile::tempdir;

use crate::util::{align8, ceil8, utf8_len};
use crate::{Buf, BufMapper};

fn write_temp(bytes: &[u8]) -> Result<(tempfile::TempDir, Arc<File>)> {
    let dir = tempdir()?;
    let path = dir.path().join("data.bin");
    let mut f = File::create(&path)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    Ok((dir, Arc::new(File::open(&path)?)))
}

// -------------------- little-endian composition --------------------

#[test]
fn little_endian_primitives() -> Result<()> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x1234i16.to_le_bytes());
    bytes.extend_from_slice(&(-56789i32).to_le_bytes());
    bytes.extend_from_slice(&0x0123_4567_89ab_cdefi64.to_le_bytes());
    bytes.extend_from_slice(&1.5f32.to_le_bytes());
    bytes.extend_from_slice(&(-2.25f64).to_le_bytes());
    let (_dir, file) = write_temp(&bytes)?;

    let buf = BufMapper::new(file, 0, bytes.len() as u64).map_buffer()?;
    assert_eq!(buf.get_i16_le(0), 0x1234);
    assert_eq!(buf.get_i32_le(2), -56789);
    assert_eq!(buf.get_i64_le(6), 0x0123_4567_89ab_cdef);
    assert_eq!(buf.get_f32_le(14), 1.5);
    assert_eq!(buf.get_f64_le(18), -2.25);
    Ok(())
}

#[test]
fn get_bytes_copies_range() -> Result<()> {
    let bytes: Vec<u8> = (0..64).collect();
    let (_dir, file) = write_temp(&bytes)?;
    let buf = BufMapper::new(file, 0, 64).map_buffer()?;

    let mut dst = [0u8; 5];
    buf.get_bytes(10, &mut dst);
    assert_eq!(dst, [10, 11, 12, 13, 14]);
    Ok(())
}

#[test]
fn mapper_start_offsets_reads() -> Result<()> {
    let bytes: Vec<u8> = (0..32).collect();
    let (_dir, file) = write_temp(&bytes)?;

    // Region beginning at file offset 8: index 0 is file byte 8.
    let buf = BufMapper::new(file, 8, 16).map_buffer()?;
    assert_eq!(buf.get(0), 8);
    assert_eq!(buf.get(15), 23);
    Ok(())
}

// -------------------- bit tests --------------------

#[test]
fn bit_reads_are_lsb_first() -> Result<()> {
    let (_dir, file) = write_temp(&[0b0000_0101, 0b1000_0000])?;
    let buf = BufMapper::new(file, 0, 2).map_buffer()?;

    assert!(buf.is_bit_set(0));
    assert!(!buf.is_bit_set(1));
    assert!(buf.is_bit_set(2));
    for bit in 3..15 {
        assert!(!buf.is_bit_set(bit), "bit {} should be clear", bit);
    }
    assert!(buf.is_bit_set(15));
    Ok(())
}

// -------------------- banked mapping --------------------

#[test]
fn banked_reads_match_simple_reads() -> Result<()> {
    // 100 bytes over 16-byte banks: several full banks plus a partial tail.
    let bytes: Vec<u8> = (0..100).map(|i| (i * 7 % 251) as u8).collect();
    let (_dir, file) = write_temp(&bytes)?;
    let mapper = BufMapper::new(file, 0, 100);

    let simple = mapper.map_buffer()?;
    let banked = mapper.map_range_banked(0, 100, 4)?;
    for ix in 0..100 {
        assert_eq!(banked.get(ix), simple.get(ix), "byte {}", ix);
    }

    // Explicitly around the first bank boundary.
    for ix in [15u64, 16, 17] {
        assert_eq!(banked.get(ix), bytes[ix as usize]);
    }
    Ok(())
}

#[test]
fn banked_multibyte_read_straddles_banks() -> Result<()> {
    let bytes: Vec<u8> = (0..32).collect();
    let (_dir, file) = write_temp(&bytes)?;
    let mapper = BufMapper::new(file, 0, 32);

    let simple = mapper.map_buffer()?;
    let banked = mapper.map_range_banked(0, 32, 4)?;
    // An i64 spanning bytes 12..20 crosses the 16-byte bank boundary.
    assert_eq!(banked.get_i64_le(12), simple.get_i64_le(12));
    Ok(())
}

#[test]
fn banked_rejects_bad_exponent() -> Result<()> {
    let (_dir, file) = write_temp(&[0u8; 8])?;
    let mapper = BufMapper::new(file, 0, 8);
    assert!(mapper.map_range_banked(0, 8, 0).is_err());
    assert!(mapper.map_range_banked(0, 8, 32).is_err());
    Ok(())
}

#[test]
fn zero_length_range_maps() -> Result<()> {
    let (_dir, file) = write_temp(&[1, 2, 3])?;
    let mapper = BufMapper::new(file, 0, 3);
    // Must not fail at map time; the buffer is just never dereferenced.
    let _empty: Buf = mapper.map_range(1, 0)?;
    Ok(())
}

// -------------------- util --------------------

#[test]
fn ceil8_rounds_up() {
    assert_eq!(ceil8(0), 0);
    assert_eq!(ceil8(1), 8);
    assert_eq!(ceil8(7), 8);
    assert_eq!(ceil8(8), 8);
    assert_eq!(ceil8(9), 16);
    assert_eq!(ceil8(64), 64);
}

#[test]
fn align8_pads_to_boundary() -> Result<()> {
    for nb in 0u64..20 {
        let mut out = Vec::new();
        let pad = align8(&mut out, nb)?;
        assert_eq!(pad as usize, out.len());
        assert_eq!((nb + pad) % 8, 0, "nb={}", nb);
        assert!(out.iter().all(|&b| b == 0));
    }
    Ok(())
}

#[test]
fn utf8_len_matches_encoded_length() {
    for s in ["", "a", "hello", "caf\u{e9}", "\u{6c34}", "\u{1f600}", "a\u{e9}\u{6c34}\u{1f600}b"] {
        assert_eq!(utf8_len(s), s.len() as u64, "string {:?}", s);
    }
}
