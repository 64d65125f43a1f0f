use thiserror::Error;

use crate::com::ComError;

/// A failed step of the upload session. Every variant is fatal: the cart
/// sends no negative acknowledgements and supports no resend, so the
/// session stops at the first unexpected token. An empty `response` means
/// the read deadline elapsed without an answer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("cartridge did not acknowledge the link test (got {response:?})")]
    LinkVerification { response: String },

    #[error("cartridge rejected the load command (got {response:?})")]
    LoadRejected { response: String },

    #[error("cartridge rejected the block stream (got {response:?})")]
    TransferRejected { response: String },

    #[error("cartridge refused to start the game (got {response:?})")]
    RunRejected { response: String },

    #[error(transparent)]
    Transport(#[from] ComError),
}
