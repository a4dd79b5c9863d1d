//! Bitcoin address validation, decoding, and encoding
//!
//! Self-contained Base58Check and Bech32/Bech32m codecs covering every
//! address family this core settles against: legacy P2PKH/P2SH, native
//! SegWit v0, and Taproot. Validation never panics; a malformed string is
//! an `InvalidAddress` value.

use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{Result, SettlementError};
use crate::types::{Address, AddressKind, ByteString, Natural, Network};

/// Base58 alphabet (no 0, O, I, l)
const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Bech32 data charset, indexed by 5-bit group value
const BECH32_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Checksum constant distinguishing Bech32m from Bech32
const BECH32M_CONST: u32 = 0x2bc8_30a3;

/// Which BCH checksum variant a string carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bech32Variant {
    Bech32,
    Bech32m,
}

/// Check whether a string is a well-formed address for *any* supported
/// network (mainnet, testnet, or regtest).
pub fn validate(address: &str) -> bool {
    decode(address).is_ok()
}

/// Check whether a string is a well-formed address bound to the given
/// network.
pub fn validate_for_network(address: &str, network: Network) -> bool {
    match decode(address) {
        Ok(decoded) => network_matches(&decoded, network),
        Err(_) => false,
    }
}

/// Stable validation surface: generic well-formedness check.
pub fn validate_bitcoin_address(address: &str) -> bool {
    validate(address)
}

/// Stable validation surface: network-bound check.
pub fn validate_bitcoin_address_for_network(address: &str, network: Network) -> bool {
    validate_for_network(address, network)
}

/// Decode and checksum-verify an address string.
///
/// Dispatches on prefix: `bc1`/`tb1`/`bcrt1` (case-insensitive) go through
/// the Bech32/Bech32m path, everything else through Base58Check. Empty
/// strings and strings containing whitespace are rejected outright; no
/// implicit trimming.
pub fn decode(address: &str) -> Result<Address> {
    if address.is_empty() {
        return Err(SettlementError::InvalidAddress("empty string".to_string()));
    }
    if address.chars().any(char::is_whitespace) {
        return Err(SettlementError::InvalidAddress(
            "address contains whitespace".to_string(),
        ));
    }

    let lowered = address.to_ascii_lowercase();
    if lowered.starts_with("bc1") || lowered.starts_with("tb1") || lowered.starts_with("bcrt1") {
        decode_bech32(address)
    } else {
        decode_base58check(address)
    }
}

/// Re-encode a decoded address to its canonical (lowercase for Bech32)
/// string form. Decode-then-encode round-trips every valid address.
pub fn encode(address: &Address) -> Result<String> {
    match address.kind {
        AddressKind::P2pkh | AddressKind::P2sh => {
            if address.payload.len() != 20 {
                return Err(SettlementError::InvalidAddress(format!(
                    "{}-byte payload for Base58Check address",
                    address.payload.len()
                )));
            }
            let version = version_byte(address.network, address.kind)?;
            let mut data = Vec::with_capacity(25);
            data.push(version);
            data.extend_from_slice(&address.payload);
            let check = checksum(&data);
            data.extend_from_slice(&check);
            Ok(base58_encode(&data))
        }
        AddressKind::SegwitV0 => {
            if address.payload.len() != 20 && address.payload.len() != 32 {
                return Err(SettlementError::InvalidAddress(format!(
                    "{}-byte witness program for v0",
                    address.payload.len()
                )));
            }
            encode_bech32(hrp_for(address.network), 0, &address.payload, Bech32Variant::Bech32)
        }
        AddressKind::SegwitV1Taproot => {
            if address.payload.len() != 32 {
                return Err(SettlementError::InvalidAddress(format!(
                    "{}-byte witness program for v1",
                    address.payload.len()
                )));
            }
            encode_bech32(hrp_for(address.network), 1, &address.payload, Bech32Variant::Bech32m)
        }
    }
}

/// Classify an address string by encoding family.
pub fn address_kind(address: &str) -> Result<AddressKind> {
    Ok(decode(address)?.kind)
}

/// Build the locking script that pays to an address.
pub fn script_pubkey(address: &Address) -> ByteString {
    match address.kind {
        AddressKind::P2pkh => {
            // OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
            let mut script = vec![0x76, 0xa9, 0x14];
            script.extend_from_slice(&address.payload);
            script.extend_from_slice(&[0x88, 0xac]);
            script
        }
        AddressKind::P2sh => {
            // OP_HASH160 <20> OP_EQUAL
            let mut script = vec![0xa9, 0x14];
            script.extend_from_slice(&address.payload);
            script.push(0x87);
            script
        }
        AddressKind::SegwitV0 => {
            // OP_0 <program>
            let mut script = vec![0x00, address.payload.len() as u8];
            script.extend_from_slice(&address.payload);
            script
        }
        AddressKind::SegwitV1Taproot => {
            // OP_1 <32>
            let mut script = vec![0x51, 0x20];
            script.extend_from_slice(&address.payload);
            script
        }
    }
}

/// Format a BIP21-style payment URI for a deposit address.
///
/// The amount is rendered in BTC with eight decimal places, the form
/// wallets expect when scanning a payment request.
pub fn payment_uri(address: &str, amount_sats: Natural, label: Option<&str>) -> String {
    let btc = amount_sats / SATOSHIS_PER_BTC;
    let frac = amount_sats % SATOSHIS_PER_BTC;
    let mut uri = format!("bitcoin:{}?amount={}.{:08}", address, btc, frac);
    if let Some(label) = label {
        uri.push_str("&label=");
        uri.push_str(&percent_encode(label));
    }
    uri
}

fn network_matches(address: &Address, requested: Network) -> bool {
    if address.network == requested {
        return true;
    }
    // Regtest shares the testnet Base58Check version bytes
    matches!(address.kind, AddressKind::P2pkh | AddressKind::P2sh)
        && address.network == Network::Testnet
        && requested == Network::Regtest
}

// ============================================================================
// BASE58CHECK
// ============================================================================

fn decode_base58check(address: &str) -> Result<Address> {
    let raw = base58_decode(address)
        .ok_or_else(|| SettlementError::InvalidAddress("invalid Base58 character".to_string()))?;

    // 1 version byte + 20-byte hash + 4-byte checksum
    if raw.len() != 25 {
        return Err(SettlementError::InvalidAddress(format!(
            "Base58Check payload is {} bytes, expected 25",
            raw.len()
        )));
    }

    let (body, check) = raw.split_at(21);
    if checksum(body) != check {
        return Err(SettlementError::InvalidAddress("checksum mismatch".to_string()));
    }

    let (network, kind) = match body[0] {
        VERSION_P2PKH_MAINNET => (Network::Mainnet, AddressKind::P2pkh),
        VERSION_P2SH_MAINNET => (Network::Mainnet, AddressKind::P2sh),
        VERSION_P2PKH_TESTNET => (Network::Testnet, AddressKind::P2pkh),
        VERSION_P2SH_TESTNET => (Network::Testnet, AddressKind::P2sh),
        other => {
            return Err(SettlementError::InvalidAddress(format!(
                "unknown version byte 0x{:02x}",
                other
            )))
        }
    };

    Ok(Address {
        network,
        kind,
        payload: body[1..].to_vec(),
    })
}

fn version_byte(network: Network, kind: AddressKind) -> Result<u8> {
    match (network, kind) {
        (Network::Mainnet, AddressKind::P2pkh) => Ok(VERSION_P2PKH_MAINNET),
        (Network::Mainnet, AddressKind::P2sh) => Ok(VERSION_P2SH_MAINNET),
        (Network::Testnet | Network::Regtest, AddressKind::P2pkh) => Ok(VERSION_P2PKH_TESTNET),
        (Network::Testnet | Network::Regtest, AddressKind::P2sh) => Ok(VERSION_P2SH_TESTNET),
        _ => Err(SettlementError::InvalidAddress(
            "no Base58Check form for witness addresses".to_string(),
        )),
    }
}

/// First four bytes of double-SHA256, the Base58Check integrity check
fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    [second[0], second[1], second[2], second[3]]
}

fn base58_decode(s: &str) -> Option<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    for ch in s.bytes() {
        let digit = BASE58_ALPHABET.iter().position(|&c| c == ch)? as u32;
        let mut carry = digit;
        for b in bytes.iter_mut().rev() {
            carry += (*b as u32) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    // Leading '1' digits encode leading zero bytes
    let zeros = s.bytes().take_while(|&c| c == b'1').count();
    let mut out = vec![0u8; zeros];
    out.extend_from_slice(&bytes);
    Some(out)
}

fn base58_encode(data: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::new();
    for &byte in data {
        let mut carry = byte as u32;
        for d in digits.iter_mut().rev() {
            carry += (*d as u32) << 8;
            *d = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.insert(0, (carry % 58) as u8);
            carry /= 58;
        }
    }
    let zeros = data.iter().take_while(|&&b| b == 0).count();
    let mut s = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        s.push('1');
    }
    for d in digits {
        s.push(BASE58_ALPHABET[d as usize] as char);
    }
    s
}

// ============================================================================
// BECH32 / BECH32M
// ============================================================================

fn decode_bech32(address: &str) -> Result<Address> {
    if address.len() > BECH32_MAX_LENGTH {
        return Err(SettlementError::InvalidAddress(format!(
            "{} characters exceeds the Bech32 limit",
            address.len()
        )));
    }

    // Uniformly lower or upper case only; mixed case is invalid even when
    // the checksum bits would verify
    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(SettlementError::InvalidAddress("mixed-case Bech32".to_string()));
    }
    let lowered = address.to_ascii_lowercase();

    let sep = lowered
        .rfind('1')
        .ok_or_else(|| SettlementError::InvalidAddress("missing separator".to_string()))?;
    let (hrp, data_part) = lowered.split_at(sep);
    let data_part = &data_part[1..];

    let network = match hrp {
        "bc" => Network::Mainnet,
        "tb" => Network::Testnet,
        "bcrt" => Network::Regtest,
        other => {
            return Err(SettlementError::InvalidAddress(format!(
                "unknown address prefix '{}'",
                other
            )))
        }
    };

    if data_part.len() < 7 {
        return Err(SettlementError::InvalidAddress("data part too short".to_string()));
    }

    let mut data = Vec::with_capacity(data_part.len());
    for ch in data_part.bytes() {
        let value = BECH32_CHARSET
            .iter()
            .position(|&c| c == ch)
            .ok_or_else(|| SettlementError::InvalidAddress("invalid Bech32 character".to_string()))?;
        data.push(value as u8);
    }

    let variant = verify_bech32_checksum(hrp, &data).ok_or_else(|| {
        SettlementError::InvalidAddress("Bech32 checksum mismatch".to_string())
    })?;

    let witness_version = data[0];
    let program = convert_bits(&data[1..data.len() - 6], 5, 8, false).ok_or_else(|| {
        SettlementError::InvalidAddress("invalid witness program padding".to_string())
    })?;

    let kind = match witness_version {
        // Witness v0 carries Bech32, v1 carries Bech32m; a mismatched
        // variant is invalid even with correct checksum bits
        0 => {
            if variant != Bech32Variant::Bech32 {
                return Err(SettlementError::InvalidAddress(
                    "witness v0 requires Bech32".to_string(),
                ));
            }
            if program.len() != 20 && program.len() != 32 {
                return Err(SettlementError::InvalidAddress(format!(
                    "{}-byte witness program for v0",
                    program.len()
                )));
            }
            AddressKind::SegwitV0
        }
        1 => {
            if variant != Bech32Variant::Bech32m {
                return Err(SettlementError::InvalidAddress(
                    "witness v1 requires Bech32m".to_string(),
                ));
            }
            if program.len() != 32 {
                return Err(SettlementError::InvalidAddress(format!(
                    "{}-byte witness program for v1",
                    program.len()
                )));
            }
            AddressKind::SegwitV1Taproot
        }
        other => {
            return Err(SettlementError::InvalidAddress(format!(
                "unsupported witness version {}",
                other
            )))
        }
    };

    Ok(Address {
        network,
        kind,
        payload: program,
    })
}

fn encode_bech32(
    hrp: &str,
    witness_version: u8,
    program: &[u8],
    variant: Bech32Variant,
) -> Result<String> {
    let mut data = vec![witness_version];
    data.extend(
        convert_bits(program, 8, 5, true)
            .ok_or_else(|| SettlementError::InvalidAddress("unencodable program".to_string()))?,
    );

    let target = match variant {
        Bech32Variant::Bech32 => 1,
        Bech32Variant::Bech32m => BECH32M_CONST,
    };
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data);
    values.extend_from_slice(&[0u8; 6]);
    let polymod = bech32_polymod(&values) ^ target;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    out.push_str(hrp);
    out.push('1');
    for d in &data {
        out.push(BECH32_CHARSET[*d as usize] as char);
    }
    for i in 0..6 {
        let group = (polymod >> (5 * (5 - i))) & 0x1f;
        out.push(BECH32_CHARSET[group as usize] as char);
    }
    Ok(out)
}

fn hrp_for(network: Network) -> &'static str {
    match network {
        Network::Mainnet => "bc",
        Network::Testnet => "tb",
        Network::Regtest => "bcrt",
    }
}

fn verify_bech32_checksum(hrp: &str, data: &[u8]) -> Option<Bech32Variant> {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    match bech32_polymod(&values) {
        1 => Some(Bech32Variant::Bech32),
        BECH32M_CONST => Some(Bech32Variant::Bech32m),
        _ => None,
    }
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut out: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    out.push(0);
    out.extend(hrp.bytes().map(|b| b & 0x1f));
    out
}

/// BCH checksum polymod over 5-bit groups
fn bech32_polymod(values: &[u8]) -> u32 {
    const GENERATOR: [u32; 5] = [
        0x3b6a_57b2,
        0x2650_8e6d,
        0x1ea1_19fa,
        0x3d42_33dd,
        0x2a14_62b3,
    ];
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ (value as u32);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

/// Regroup bits between 8-bit bytes and 5-bit Bech32 groups
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut out = Vec::new();
    for &value in data {
        if (value as u32) >> from != 0 {
            return None;
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return None;
    }
    Some(out)
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_P2PKH: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
    const MAINNET_P2SH: &str = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy";
    const TESTNET_P2PKH: &str = "mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn";
    const TESTNET_P2SH: &str = "2MzQwSSnBHWHqSAqtTVQ6v47XtaisrJa1Vc";
    const MAINNET_P2WPKH: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
    const TESTNET_P2WPKH: &str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";
    const MAINNET_TAPROOT: &str =
        "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0";
    const TESTNET_TAPROOT: &str =
        "tb1pqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesf3hn0c";

    #[test]
    fn test_validate_all_families() {
        for address in [
            GENESIS_P2PKH,
            MAINNET_P2SH,
            TESTNET_P2PKH,
            TESTNET_P2SH,
            MAINNET_P2WPKH,
            TESTNET_P2WPKH,
            MAINNET_TAPROOT,
            TESTNET_TAPROOT,
        ] {
            assert!(validate(address), "expected valid: {}", address);
        }
    }

    #[test]
    fn test_decode_genesis_address() {
        let decoded = decode(GENESIS_P2PKH).unwrap();
        assert_eq!(decoded.network, Network::Mainnet);
        assert_eq!(decoded.kind, AddressKind::P2pkh);
        assert_eq!(decoded.payload.len(), 20);
    }

    #[test]
    fn test_base58_roundtrip() {
        for address in [GENESIS_P2PKH, MAINNET_P2SH, TESTNET_P2PKH, TESTNET_P2SH] {
            let decoded = decode(address).unwrap();
            assert_eq!(encode(&decoded).unwrap(), address);
        }
    }

    #[test]
    fn test_bech32_roundtrip() {
        for address in [
            MAINNET_P2WPKH,
            TESTNET_P2WPKH,
            MAINNET_TAPROOT,
            TESTNET_TAPROOT,
        ] {
            let decoded = decode(address).unwrap();
            assert_eq!(encode(&decoded).unwrap(), address);
        }
    }

    #[test]
    fn test_empty_and_whitespace_invalid() {
        assert!(!validate(""));
        assert!(!validate(" 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa "));
        assert!(!validate("1A1zP1eP5QGe fi2DMPTfTL5SLmv7DivfNa"));
    }

    #[test]
    fn test_truncated_and_extended_base58_invalid() {
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfN"));
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa123456789"));
    }

    #[test]
    fn test_excluded_base58_characters_invalid() {
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfN0"));
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNO"));
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNI"));
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNl"));
    }

    #[test]
    fn test_corrupted_checksum_invalid() {
        // Last character changed on otherwise valid addresses
        assert!(!validate("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb"));
        assert!(!validate("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5"));
    }

    #[test]
    fn test_unknown_prefix_invalid() {
        assert!(!validate("4A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(!validate("ac1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"));
    }

    #[test]
    fn test_mixed_case_bech32_invalid() {
        assert!(!validate("BC1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"));
        assert!(!validate("bc1QW508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"));
    }

    #[test]
    fn test_uppercase_only_bech32_valid() {
        let upper = MAINNET_P2WPKH.to_ascii_uppercase();
        assert!(validate(&upper));
        // Canonical re-encoding is lowercase with the same checksum
        let decoded = decode(&upper).unwrap();
        assert_eq!(encode(&decoded).unwrap(), MAINNET_P2WPKH);
    }

    #[test]
    fn test_network_binding() {
        assert!(validate_for_network(GENESIS_P2PKH, Network::Mainnet));
        assert!(!validate_for_network(GENESIS_P2PKH, Network::Testnet));
        assert!(validate_for_network(TESTNET_P2WPKH, Network::Testnet));
        assert!(!validate_for_network(TESTNET_P2WPKH, Network::Mainnet));
    }

    #[test]
    fn test_regtest_shares_testnet_base58_versions() {
        assert!(validate_for_network(TESTNET_P2PKH, Network::Regtest));
        assert!(validate_for_network(TESTNET_P2SH, Network::Regtest));
        // Bech32 regtest has its own prefix; testnet strings do not bind
        assert!(!validate_for_network(TESTNET_P2WPKH, Network::Regtest));
    }

    #[test]
    fn test_witness_v1_requires_bech32m() {
        let taproot = decode(MAINNET_TAPROOT).unwrap();
        // Same 32-byte program with the v0 checksum constant must fail
        let wrong_variant =
            encode_bech32("bc", 1, &taproot.payload, Bech32Variant::Bech32).unwrap();
        assert!(!validate(&wrong_variant));
        let right_variant =
            encode_bech32("bc", 1, &taproot.payload, Bech32Variant::Bech32m).unwrap();
        assert_eq!(right_variant, MAINNET_TAPROOT);
    }

    #[test]
    fn test_witness_v0_requires_bech32() {
        let segwit = decode(MAINNET_P2WPKH).unwrap();
        let wrong_variant =
            encode_bech32("bc", 0, &segwit.payload, Bech32Variant::Bech32m).unwrap();
        assert!(!validate(&wrong_variant));
    }

    #[test]
    fn test_address_kind_classification() {
        assert_eq!(address_kind(GENESIS_P2PKH).unwrap(), AddressKind::P2pkh);
        assert_eq!(address_kind(MAINNET_P2SH).unwrap(), AddressKind::P2sh);
        assert_eq!(address_kind(MAINNET_P2WPKH).unwrap(), AddressKind::SegwitV0);
        assert_eq!(
            address_kind(MAINNET_TAPROOT).unwrap(),
            AddressKind::SegwitV1Taproot
        );
    }

    #[test]
    fn test_script_pubkey_shapes() {
        let p2pkh = decode(GENESIS_P2PKH).unwrap();
        let script = script_pubkey(&p2pkh);
        assert_eq!(script.len(), 25);
        assert_eq!(&script[..3], &[0x76, 0xa9, 0x14]);
        assert_eq!(&script[23..], &[0x88, 0xac]);

        let p2sh = decode(MAINNET_P2SH).unwrap();
        let script = script_pubkey(&p2sh);
        assert_eq!(script.len(), 23);
        assert_eq!(script[0], 0xa9);
        assert_eq!(script[22], 0x87);

        let segwit = decode(MAINNET_P2WPKH).unwrap();
        let script = script_pubkey(&segwit);
        assert_eq!(&script[..2], &[0x00, 0x14]);
        assert_eq!(script.len(), 22);

        let taproot = decode(MAINNET_TAPROOT).unwrap();
        let script = script_pubkey(&taproot);
        assert_eq!(&script[..2], &[0x51, 0x20]);
        assert_eq!(script.len(), 34);
    }

    #[test]
    fn test_payment_uri_format() {
        let uri = payment_uri(MAINNET_P2WPKH, 150_000, Some("Invoice #7"));
        assert_eq!(
            uri,
            format!("bitcoin:{}?amount=0.00150000&label=Invoice%20%237", MAINNET_P2WPKH)
        );
        let bare = payment_uri(GENESIS_P2PKH, 250_000_000, None);
        assert_eq!(bare, format!("bitcoin:{}?amount=2.50000000", GENESIS_P2PKH));
    }
}
