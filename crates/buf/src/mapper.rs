use std::fs::File;
use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use memmap2::{Mmap, MmapOptions};

use crate::access::{Buf, BufAccess};

/// Longest region handled by a single native mapping: one byte short of
/// 2 GiB, matching the addressable range of a 32-bit mapping index.
const SINGLE_MAP_LIMIT: u64 = i32::MAX as u64;

/// Default bank size exponent for banked mappings (2^30 = 1 GiB banks).
const DEFAULT_BANK_POW2: u32 = 30;

/// Provides memory-mapped random access to a region of a file.
///
/// A mapper describes the region (`start`, `length`) but maps nothing until
/// [`map_buffer`](BufMapper::map_buffer) or
/// [`map_range`](BufMapper::map_range) is called. Sub-regions shorter than
/// 2 GiB are mapped eagerly in one piece; longer sub-regions use an array
/// of lazily mapped banks. Mappings stay valid for as long as the returned
/// [`Buf`] is alive, independent of the mapper.
pub struct BufMapper {
    file: Arc<File>,
    start: u64,
    length: u64,
}

impl BufMapper {
    /// Creates a mapper for the file region `[start, start + length)`.
    pub fn new(file: Arc<File>, start: u64, length: u64) -> Self {
        BufMapper {
            file,
            start,
            length,
        }
    }

    /// Returns the starting file offset of the region.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the length of the region in bytes.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Maps the whole of this mapper's file region.
    ///
    /// # Errors
    ///
    /// Returns an error if an eager (single-piece) mapping fails. Banked
    /// mappings defer failure to first access.
    pub fn map_buffer(&self) -> Result<Buf> {
        self.map_range(0, self.length)
    }

    /// Maps part of this mapper's file region, `offset` bytes past its
    /// start and `leng` bytes long.
    ///
    /// # Errors
    ///
    /// Returns an error if an eager mapping fails.
    pub fn map_range(&self, offset: u64, leng: u64) -> Result<Buf> {
        let off = self.start + offset;
        let access: Arc<dyn BufAccess> = if leng == 0 {
            Arc::new(EmptyAccess)
        } else if leng < SINGLE_MAP_LIMIT {
            Arc::new(SimpleAccess::map(&self.file, off, leng)?)
        } else {
            Arc::new(BankedAccess::new(
                self.file.clone(),
                off,
                leng,
                DEFAULT_BANK_POW2,
            ))
        };
        Ok(Buf::new(access))
    }

    /// Maps part of the region with a banked strategy of bank size
    /// `2^pow2`, regardless of length. Exists so tests can exercise bank
    /// boundaries without multi-gigabyte files.
    ///
    /// # Errors
    ///
    /// Returns an error if `pow2` is outside `1..=31`.
    pub fn map_range_banked(&self, offset: u64, leng: u64, pow2: u32) -> Result<Buf> {
        if !(1..=31).contains(&pow2) {
            bail!("bad bank size exponent: {}", pow2);
        }
        let access = BankedAccess::new(self.file.clone(), self.start + offset, leng, pow2);
        Ok(Buf::new(Arc::new(access)))
    }
}

/// Access for a zero-length region. Never legitimately dereferenced.
struct EmptyAccess;

impl BufAccess for EmptyAccess {
    fn get(&self, ix: u64) -> u8 {
        panic!("read at offset {} from empty buffer region", ix);
    }
}

/// Single eagerly created mapping.
struct SimpleAccess {
    mmap: Mmap,
}

impl SimpleAccess {
    fn map(file: &File, offset: u64, leng: u64) -> Result<Self> {
        let mmap = unsafe { MmapOptions::new().offset(offset).len(leng as usize).map(file) }
            .with_context(|| {
                format!("failed to map {} bytes at file offset {}", leng, offset)
            })?;
        Ok(SimpleAccess { mmap })
    }
}

impl BufAccess for SimpleAccess {
    fn get(&self, ix: u64) -> u8 {
        self.mmap[ix as usize]
    }
}

/// Bank of fixed-size mappings covering a region too long for one mapping.
///
/// Banks are mapped on first access. Each bank slot is a [`OnceLock`], so
/// when several threads race to touch an unmapped bank exactly one mapping
/// is created and the rest reuse it.
struct BankedAccess {
    file: Arc<File>,
    offset: u64,
    length: u64,
    pow2: u32,
    bank_size: u64,
    mask: u64,
    banks: Vec<OnceLock<Mmap>>,
}

impl BankedAccess {
    fn new(file: Arc<File>, offset: u64, length: u64, pow2: u32) -> Self {
        let bank_size = 1u64 << pow2;
        let nbank = (length >> pow2) as usize + 1;
        let mut banks = Vec::with_capacity(nbank);
        banks.resize_with(nbank, OnceLock::new);
        BankedAccess {
            file,
            offset,
            length,
            pow2,
            bank_size,
            mask: bank_size - 1,
            banks,
        }
    }

    /// Returns the mapping for a given bank, creating it on first use.
    fn bank(&self, ibank: usize) -> &Mmap {
        self.banks[ibank].get_or_init(|| {
            let boff = self.offset + (ibank as u64) * self.bank_size;
            let leng = self.bank_size.min(self.length - (ibank as u64) * self.bank_size);
            let map = unsafe {
                MmapOptions::new()
                    .offset(boff)
                    .len(leng as usize)
                    .map(&*self.file)
            };
            match map {
                Ok(m) => m,
                Err(e) => panic!(
                    "file mapping failure for bank {} ({} bytes at offset {}): {}",
                    ibank, leng, boff, e
                ),
            }
        })
    }
}

impl BufAccess for BankedAccess {
    fn get(&self, ix: u64) -> u8 {
        self.bank((ix >> self.pow2) as usize)[(ix & self.mask) as usize]
    }
}
