//! Upload-and-run protocol of the Mega EverDrive X7 USB loader.
//!
//! The exchange is strictly half duplex. Every command and the completed
//! block stream are answered with exactly one single-letter token, and the
//! token either matches or the session is dead: there are no sequence
//! numbers and no resend command, so a corrupted block cannot be recovered
//! mid-stream. The digest comparison after the transfer is diagnostic only.

use std::collections::VecDeque;

use crate::com::{send_all, Com};
use crate::digest::{digest_of, RollingDigest};
use crate::rom::RomImage;

use super::{RunMode, TransferSummary};

pub mod constants;
pub use constants::{BLOCK_SIZE, MAX_BLOCK_COUNT, MAX_GAME_SIZE};

mod err;
pub use err::ProtocolError;


use constants::*;

/// One upload session against a cartridge. Owns the transport for its
/// whole lifetime; a session that returned an error is dropped, not
/// reused.
pub struct EverdriveX7 {
    com: Box<dyn Com>,
    line_buf: VecDeque<u8>,
}

impl EverdriveX7 {
    pub fn new(com: Box<dyn Com>) -> Self {
        Self {
            com,
            line_buf: VecDeque::new(),
        }
    }

    /// Sends the link test command and checks the answer. A wrong or
    /// missing answer means no loader is listening on the other end.
    pub fn verify_link(&mut self) -> Result<(), ProtocolError> {
        send_all(self.com.as_mut(), CMD_LINK_TEST)?;
        let response = self.read_response()?;
        if response != RESP_OK {
            return Err(ProtocolError::LinkVerification { response });
        }
        log::debug!("link test acknowledged");
        Ok(())
    }

    /// Announces the image and streams it to the cart in `BLOCK_SIZE`
    /// blocks.
    ///
    /// `on_block(sent, total)` is called after each block went out. The
    /// returned summary carries the digest of the source image next to the
    /// digest of the bytes handed to the transport; a mismatch between the
    /// two is the caller's to report.
    pub fn upload(
        &mut self,
        image: &RomImage,
        mut on_block: impl FnMut(usize, usize),
    ) -> Result<TransferSummary, ProtocolError> {
        let block_count = image.block_count();
        debug_assert!(block_count > 0 && block_count <= MAX_BLOCK_COUNT);

        send_all(self.com.as_mut(), CMD_LOAD_GAME)?;
        send_all(self.com.as_mut(), &[block_count as u8])?;
        let response = self.read_response()?;
        if response != RESP_OK {
            return Err(ProtocolError::LoadRejected { response });
        }

        let source_digest = digest_of(image.data());
        let mut sent = RollingDigest::new();
        let mut bytes_sent = 0;
        for (index, block) in image.data().chunks(BLOCK_SIZE).enumerate() {
            sent.update(block);
            send_all(self.com.as_mut(), block)?;
            bytes_sent += block.len();
            log::debug!("sent block {}/{block_count}", index + 1);
            on_block(index + 1, block_count);
        }

        let summary = TransferSummary {
            blocks_sent: block_count,
            bytes_sent,
            source_digest,
            sent_digest: sent.finish(),
        };
        if !summary.integrity_ok() {
            log::warn!(
                "digest mismatch after transfer: sent {:032x}, expected {:032x}",
                summary.sent_digest,
                summary.source_digest
            );
        }

        let response = self.read_response()?;
        if response != RESP_DATA_OK {
            return Err(ProtocolError::TransferRejected { response });
        }
        Ok(summary)
    }

    /// Boots the uploaded image in the given console mode.
    pub fn start_game(&mut self, mode: RunMode) -> Result<(), ProtocolError> {
        let command = match mode {
            RunMode::Megadrive => CMD_RUN_MEGADRIVE,
            RunMode::MasterSystem => CMD_RUN_SMS,
            RunMode::SegaCd => CMD_RUN_CD,
            RunMode::Os => CMD_RUN_OS,
            RunMode::M10 => CMD_RUN_M10,
            RunMode::Ssf => CMD_RUN_SSF,
        };
        send_all(self.com.as_mut(), command)?;
        let response = self.read_response()?;
        if response != RESP_OK {
            return Err(ProtocolError::RunRejected { response });
        }
        Ok(())
    }

    /// Reads one response token, stripping the terminating newline and an
    /// optional carriage return before it. A deadline expiry yields the
    /// empty token, which no step accepts.
    fn read_response(&mut self) -> Result<String, ProtocolError> {
        loop {
            if let Some(pos) = self.line_buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.line_buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            match self.com.read_data()? {
                Some(bytes) => self.line_buf.extend(bytes),
                None => {
                    log::debug!("read deadline elapsed without a response line");
                    return Ok(String::new());
                }
            }
        }
    }
}
