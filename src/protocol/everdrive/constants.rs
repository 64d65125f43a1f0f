// Command set of the Mega EverDrive X7 USB loader. Commands go out as raw
// ASCII; responses come back as single newline-terminated tokens.

pub const CMD_LINK_TEST: &[u8] = b"    *T";
pub const CMD_LOAD_GAME: &[u8] = b"*g";

pub const CMD_RUN_MEGADRIVE: &[u8] = b"*rm";
pub const CMD_RUN_SMS: &[u8] = b"*rs";
pub const CMD_RUN_CD: &[u8] = b"*rc";
pub const CMD_RUN_OS: &[u8] = b"*ro";
pub const CMD_RUN_M10: &[u8] = b"*rM";
pub const CMD_RUN_SSF: &[u8] = b"*rS";

/// Acknowledgement token after a command.
pub const RESP_OK: &str = "k";
/// Acknowledgement token after the complete block stream.
pub const RESP_DATA_OK: &str = "d";

/// One transfer block. The cart consumes the image only in whole blocks;
/// images get zero-padded up front.
pub const BLOCK_SIZE: usize = 512 * 128;

/// Capacity ceiling of the cart, 240 blocks.
pub const MAX_GAME_SIZE: usize = 0xf0_0000;

/// The block count announced to the cart is framed as a single byte.
pub const MAX_BLOCK_COUNT: usize = u8::MAX as usize;
