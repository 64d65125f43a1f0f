use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::protocol::everdrive::{BLOCK_SIZE, MAX_BLOCK_COUNT, MAX_GAME_SIZE};

/// Offset of the "SEGA" signature in a Mega Drive ROM header.
const SIGNATURE_OFFSET: usize = 0x100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RomError {
    #[error("ROM image is empty")]
    Empty,
    #[error("ROM length {size} is not a multiple of the 64 KiB block size")]
    Unaligned { size: usize },
    #[error("ROM length {size} exceeds the cart capacity of {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("ROM needs {count} blocks, more than the count byte can carry")]
    TooManyBlocks { count: usize },
}

/// A game image ready for transfer: non-empty, block-aligned and within
/// the cart's capacity. The plain constructor validates data as given;
/// `load` pads file contents to a block boundary first.
#[derive(Debug, Clone)]
pub struct RomImage {
    data: Vec<u8>,
}

impl RomImage {
    pub fn new(data: Vec<u8>) -> Result<Self, RomError> {
        if data.is_empty() {
            return Err(RomError::Empty);
        }
        if data.len() % BLOCK_SIZE != 0 {
            return Err(RomError::Unaligned { size: data.len() });
        }
        let count = data.len() / BLOCK_SIZE;
        if count > MAX_BLOCK_COUNT {
            return Err(RomError::TooManyBlocks { count });
        }
        if data.len() > MAX_GAME_SIZE {
            return Err(RomError::TooLarge {
                size: data.len(),
                max: MAX_GAME_SIZE,
            });
        }
        Ok(Self { data })
    }

    /// Reads a ROM file, zero-pads it to the next block boundary and
    /// validates it. Logs a warning when the Mega Drive signature is
    /// missing.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("reading ROM file {}", path.display()))?;
        log::info!("read {} bytes from {}", raw.len(), path.display());
        let image = Self::new(pad_to_block(raw))?;
        // a validated image is at least one block long, so the header
        // range always exists
        if &image.data[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 4] != b"SEGA" {
            log::warn!("ROM may be corrupt: expected \"SEGA\" at offset 0x100");
        }
        Ok(image)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn block_count(&self) -> usize {
        self.data.len() / BLOCK_SIZE
    }
}

/// Zero-pads to the next block boundary; aligned data is left untouched.
fn pad_to_block(mut data: Vec<u8>) -> Vec<u8> {
    let rem = data.len() % BLOCK_SIZE;
    if rem != 0 {
        data.resize(data.len() + BLOCK_SIZE - rem, 0);
    }
    data
}
