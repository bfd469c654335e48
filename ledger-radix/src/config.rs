/// Application Identifier for Radix commands
pub const CLA: u8 = 0xAA;

/// Instruction to get the app version
pub const INS_GET_VERSION: u8 = 0x00;
/// Instruction to get the app name
pub const INS_GET_APP_NAME: u8 = 0x01;
/// Instruction to sign a pre-computed hash
pub const INS_SIGN_HASH: u8 = 0x02;
/// Instruction to perform an ECDH key exchange
pub const INS_KEY_EXCHANGE: u8 = 0x04;
/// Instruction to sign a streamed transaction
pub const INS_SIGN_TX: u8 = 0x05;
/// Instruction to get a secp256k1 public key
pub const INS_GET_PUBLIC_KEY: u8 = 0x08;

/// P1 value requesting no on-device display
pub const P1_SILENT: u8 = 0x00;
/// P1 value requesting on-device display and verification
pub const P1_DISPLAY: u8 = 0x01;

/// P1 marker for the SIGN_TX metadata frame (ASCII 'M')
pub const P1_SIGN_TX_METADATA: u8 = 0x4D;
/// P1 marker for a SIGN_TX instruction frame (ASCII 'I')
pub const P1_SIGN_TX_INSTRUCTION: u8 = 0x49;

/// P2 value for a non-final SIGN_TX instruction frame
pub const P2_MORE: u8 = 0x00;
/// P2 value for the final SIGN_TX instruction frame
pub const P2_LAST: u8 = 0x01;

/// APDU status word for success
pub const SW_OK: u16 = 0x9000;

/// Maximum data bytes carried by a single APDU frame
pub const MAX_CHUNK_SIZE: usize = 255;

////////////////////
////////////////////
////////////////////

/// Number of components in a Radix BIP44 path
pub const PATH_COMPONENTS: usize = 5;

/// Serialized path size: count prefix (1) + components (5 * 4)
pub const SERIALIZED_PATH_SIZE: usize = 1 + PATH_COMPONENTS * 4;

/// SLIP-0044 coin type registered for Radix
pub const RADIX_COIN_TYPE: u32 = 536;

/// Public Key Length for secp256k1 (compressed)
pub const PK_LEN_SECP256K1: usize = 33;

/// Public Key Length for secp256k1 (SEC1 uncompressed)
pub const PK_LEN_SECP256K1_UNCOMPRESSED: usize = 65;

/// Signature size for compact ECDSA signatures
pub const SIG_SIZE: usize = 64;

/// GET_VERSION response size: major (1) + minor (1) + patch (1)
pub const VERSION_RESPONSE_SIZE: usize = 3;

/// Maximum length of the HRP field in the SIGN_TX metadata frame
pub const MAX_HRP_LEN: usize = 255;
