use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod everdrive;
pub use everdrive::*;

/// Console mode the cartridge boots the uploaded image in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Megadrive,
    MasterSystem,
    SegaCd,
    Os,
    M10,
    Ssf,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown run mode {0:?} (expected one of md, sms, cd, os, m10, ssf)")]
pub struct UnknownRunMode(pub String);

impl FromStr for RunMode {
    type Err = UnknownRunMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md" => Ok(RunMode::Megadrive),
            "sms" => Ok(RunMode::MasterSystem),
            "cd" => Ok(RunMode::SegaCd),
            "os" => Ok(RunMode::Os),
            "m10" => Ok(RunMode::M10),
            "ssf" => Ok(RunMode::Ssf),
            other => Err(UnknownRunMode(other.to_string())),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Megadrive => "md",
            RunMode::MasterSystem => "sms",
            RunMode::SegaCd => "cd",
            RunMode::Os => "os",
            RunMode::M10 => "m10",
            RunMode::Ssf => "ssf",
        };
        write!(f, "{name}")
    }
}

/// What a completed block transfer looked like from the sending side.
#[derive(Debug, Clone, Copy)]
pub struct TransferSummary {
    pub blocks_sent: usize,
    pub bytes_sent: usize,
    pub source_digest: u128,
    pub sent_digest: u128,
}

impl TransferSummary {
    /// `false` means the bytes handed to the transport did not digest to
    /// the same value as the source image. The cart has no resend command,
    /// so this is reported to the operator instead of failing the session.
    pub fn integrity_ok(&self) -> bool {
        self.source_digest == self.sent_digest
    }
}
