//! Settlement constants shared across the crate

/// Maximum money supply: 21,000,000 BTC in satoshis
pub const MAX_MONEY: u64 = 21_000_000 * 100_000_000;

/// Satoshis per BTC
pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Millisatoshis per satoshi (Lightning amounts)
pub const MSATS_PER_SAT: u64 = 1_000;

/// Minimum change output value; anything below folds into the fee
pub const DUST_THRESHOLD_SATS: u64 = 546;

/// Confirmations required before an on-chain payment is verified
pub const CONFIRMATION_THRESHOLD: u64 = 6;

/// Default Lightning invoice lifetime: 15 minutes
pub const LIGHTNING_DEFAULT_EXPIRY_SECS: u64 = 900;

/// Transaction version used for built transactions
pub const TX_VERSION: u32 = 2;

/// Sequence number for final (non-replaceable) inputs
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// SIGHASH_ALL signature hash type
pub const SIGHASH_ALL: u32 = 0x01;

/// Fixed per-transaction overhead used for fee estimation, in vbytes
pub const TX_OVERHEAD_VBYTES: u64 = 10;

/// Estimated size of one P2PKH-shaped input, in vbytes
pub const INPUT_VBYTES: u64 = 148;

/// Estimated size of one output, in vbytes
pub const OUTPUT_VBYTES: u64 = 34;

/// Base58Check version byte: mainnet P2PKH ("1...")
pub const VERSION_P2PKH_MAINNET: u8 = 0x00;

/// Base58Check version byte: mainnet P2SH ("3...")
pub const VERSION_P2SH_MAINNET: u8 = 0x05;

/// Base58Check version byte: testnet P2PKH ("m..."/"n..."); regtest shares it
pub const VERSION_P2PKH_TESTNET: u8 = 0x6f;

/// Base58Check version byte: testnet P2SH ("2..."); regtest shares it
pub const VERSION_P2SH_TESTNET: u8 = 0xc4;

/// Longest accepted Bech32 address string
pub const BECH32_MAX_LENGTH: usize = 90;
