//! Core data types for payment settlement

use serde::{Deserialize, Serialize};

use crate::constants::MSATS_PER_SAT;

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type (satoshi amounts, heights, timestamps)
pub type Natural = u64;

/// Bitcoin network an address or observation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

/// Address encoding family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    /// Legacy pay-to-pubkey-hash (Base58Check)
    P2pkh,
    /// Pay-to-script-hash (Base58Check)
    P2sh,
    /// Native SegWit v0 witness program (Bech32)
    SegwitV0,
    /// Taproot / SegWit v1 witness program (Bech32m)
    SegwitV1Taproot,
}

/// A decoded, checksum-verified Bitcoin address.
///
/// An `Address` only exists after validation succeeds: the payload length
/// and checksum have been checked against `kind`, and `network` reflects
/// the version byte or human-readable prefix it was encoded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub network: Network,
    pub kind: AddressKind,
    /// 20-byte hash for P2PKH/P2SH/P2WPKH, 32-byte program for P2WSH/Taproot
    pub payload: ByteString,
}

/// Reference to a transaction output
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Unspent transaction output, the spendable unit of value.
///
/// `height` is the block that confirmed it, 0 while unconfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub value: Natural,
    pub height: Natural,
}

/// One on-chain observation for a deposit address, as delivered by the
/// external chain feed. Fresh only "as of `tip_height`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub balance: Natural,
    pub utxos: Vec<Utxo>,
    pub tip_height: Natural,
}

/// Transaction output: value plus locking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Natural,
    pub script_pubkey: ByteString,
}

/// Transaction input referencing a funding UTXO.
///
/// `value` carries the funding amount so fee accounting stays checkable
/// without a UTXO set lookup; `script_sig` is empty until signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub prevout: OutPoint,
    pub value: Natural,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Assembled but unsigned transaction. Output order is preserved exactly
/// as given to the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
    /// sum(inputs) - sum(outputs), checked non-negative at build time
    pub fee: Natural,
}

/// Fully signed transaction with one unlocking script per input and a
/// derived transaction id. Constructed only by the builder's signing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
    pub fee: Natural,
    pub txid: Hash,
}

/// How an invoice is to be settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Bitcoin,
    Lightning,
}

/// Invoice settlement lifecycle.
///
/// `Unpaid -> PartiallyFunded -> Funded -> Verified` on success;
/// `Expired` is the terminal failure state, reachable only for Lightning
/// invoices whose expiry elapses before verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyFunded,
    Funded,
    Verified,
    Expired,
}

impl InvoiceStatus {
    /// Terminal states are never left, whatever later observations claim.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Verified | InvoiceStatus::Expired)
    }
}

/// An invoice owed in BTC, settled on-chain or over Lightning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Natural,
    pub required_sats: Natural,
    pub method: PaymentMethod,
    /// Deposit address for on-chain settlement
    pub deposit_address: Option<String>,
    /// BOLT11 payment request for Lightning settlement
    pub invoice_string: Option<String>,
    pub status: InvoiceStatus,
    /// Highest chain tip already reconciled; observations below it are stale
    pub observed_tip: Natural,
}

/// Lightning invoice status as reported by the external settlement service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightningStatus {
    Pending,
    Paid,
    Expired,
}

/// Snapshot of a Lightning invoice. The external Lightning service is
/// authoritative for `status`; this core only reconciles against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightningInvoice {
    pub invoice_string: String,
    pub amount_msat: Natural,
    pub expiry_unix_time: Natural,
    pub status: LightningStatus,
}

impl LightningInvoice {
    /// Invoice amount rounded down to whole satoshis
    pub fn amount_sats(&self) -> Natural {
        msat_to_sats(self.amount_msat)
    }
}

/// Convert satoshis to millisatoshis
pub fn sats_to_msat(sats: Natural) -> Natural {
    sats * MSATS_PER_SAT
}

/// Convert millisatoshis to satoshis, rounding down
pub fn msat_to_sats(msat: Natural) -> Natural {
    msat / MSATS_PER_SAT
}

/// Descriptive side effect produced by reconciliation. The caller performs
/// these (webhooks, notifications); the core never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    PaymentReceived { invoice_id: Natural, amount_sats: Natural },
    PaymentConfirmed { invoice_id: Natural },
    InvoiceExpired { invoice_id: Natural },
}
