//! # Settlement-Core
//!
//! Bitcoin/Lightning payment settlement core: given an invoice owed in
//! BTC, this crate validates deposit addresses across every Bitcoin
//! address encoding, tracks on-chain and off-chain payment state, and
//! assembles, signs, and serializes spendable transactions from available
//! unspent outputs.
//!
//! ## Architecture
//!
//! Five components, leaves first:
//! - Address codec (Base58Check, Bech32, Bech32m, network-aware)
//! - UTXO selector (deterministic largest-first coin selection)
//! - Transaction builder (assembly, per-input signing, wire serialization)
//! - Payment monitor (pure reconciliation of observations into verdicts)
//! - Invoice ledger (registry and orchestration)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every component is deterministic and
//!    side-effect-free; side effects are returned as descriptions for the
//!    caller to perform
//! 2. **Errors Are Values**: no operation panics; malformed input and
//!    failed settlement surface as [`SettlementError`]
//! 3. **Exact Version Pinning**: payment-critical crypto dependencies are
//!    pinned to exact versions
//! 4. **Caller-Owned Scheduling**: polling, per-invoice write ordering,
//!    and network timeouts belong to the surrounding glue, not this crate
//!
//! ## Usage
//!
//! ```rust
//! use settlement_core::{Network, SettlementCore};
//!
//! let core = SettlementCore::new(Network::Mainnet);
//! assert!(core.validate_bitcoin_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
//! assert!(!core.validate_bitcoin_address(""));
//! ```

pub mod address;
pub mod builder;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod monitor;
pub mod selection;
pub mod types;

// Re-export commonly used types
pub use constants::*;
pub use error::{Result, SettlementError};
pub use types::*;

// Stable validation surface
pub use address::{validate_bitcoin_address, validate_bitcoin_address_for_network};

use std::collections::BTreeMap;

use builder::InputSigner;
use ledger::InvoiceLedger;
use monitor::{Observation, PaymentSummary, Reconciliation};
use selection::UtxoSelection;

/// Stateless settlement entry point bound to one network and fee policy.
///
/// Replaces the singleton service pattern: construct one wherever needed,
/// all behavior flows from explicit configuration.
///
/// # Examples
///
/// ```
/// use settlement_core::{Network, SettlementCore};
///
/// let core = SettlementCore::new(Network::Mainnet);
/// assert_eq!(core.network(), Network::Mainnet);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SettlementCore {
    network: Network,
}

impl SettlementCore {
    /// Create a settlement core for the given network
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Check whether a string is a well-formed Bitcoin address for any
    /// supported network.
    ///
    /// # Examples
    ///
    /// ```
    /// use settlement_core::{Network, SettlementCore};
    ///
    /// let core = SettlementCore::new(Network::Mainnet);
    /// assert!(core.validate_bitcoin_address("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"));
    /// assert!(!core.validate_bitcoin_address(" 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa "));
    /// ```
    pub fn validate_bitcoin_address(&self, addr: &str) -> bool {
        address::validate(addr)
    }

    /// Check whether a string is a well-formed address bound to this
    /// core's network.
    ///
    /// # Examples
    ///
    /// ```
    /// use settlement_core::{Network, SettlementCore};
    ///
    /// let mainnet = SettlementCore::new(Network::Mainnet);
    /// let testnet = SettlementCore::new(Network::Testnet);
    /// let genesis = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
    /// assert!(mainnet.validate_bitcoin_address_for_network(genesis));
    /// assert!(!testnet.validate_bitcoin_address_for_network(genesis));
    /// ```
    pub fn validate_bitcoin_address_for_network(&self, addr: &str) -> bool {
        address::validate_for_network(addr, self.network)
    }

    /// Decode an address string into its semantic form
    pub fn decode_address(&self, addr: &str) -> Result<Address> {
        address::decode(addr)
    }

    /// Re-encode a decoded address to its canonical string form
    pub fn encode_address(&self, addr: &Address) -> Result<String> {
        address::encode(addr)
    }

    /// Classify an address by encoding family
    pub fn address_kind(&self, addr: &str) -> Result<AddressKind> {
        address::address_kind(addr)
    }

    /// Locking script paying to an address
    pub fn script_pubkey(&self, addr: &Address) -> ByteString {
        address::script_pubkey(addr)
    }

    /// BIP21-style payment URI for a deposit address
    pub fn payment_uri(&self, addr: &str, amount_sats: Natural, label: Option<&str>) -> String {
        address::payment_uri(addr, amount_sats, label)
    }

    /// Choose UTXOs covering a target amount plus fee at the given fee
    /// rate.
    ///
    /// # Examples
    ///
    /// ```
    /// use settlement_core::{Network, SettlementCore};
    /// use settlement_core::types::{OutPoint, Utxo};
    ///
    /// let core = SettlementCore::new(Network::Mainnet);
    /// let available = vec![Utxo {
    ///     outpoint: OutPoint { hash: [1; 32], index: 0 },
    ///     value: 60_000,
    ///     height: 100,
    /// }];
    /// let selection = core.select_utxos(&available, 40_000, 1).unwrap();
    /// assert_eq!(selection.chosen.len(), 1);
    /// assert!(selection.change_sats > 0);
    /// ```
    pub fn select_utxos(
        &self,
        available: &[Utxo],
        target_sats: Natural,
        fee_rate: Natural,
    ) -> Result<UtxoSelection> {
        selection::select_utxos(available, target_sats, fee_rate)
    }

    /// Assemble an unsigned transaction from funding UTXOs and ordered
    /// outputs
    pub fn build_transaction(
        &self,
        inputs: &[Utxo],
        outputs: &[TxOutput],
    ) -> Result<UnsignedTransaction> {
        builder::build_transaction(inputs, outputs)
    }

    /// Sign every input of an unsigned transaction
    pub fn sign_transaction(
        &self,
        unsigned: &UnsignedTransaction,
        signers: &BTreeMap<usize, InputSigner>,
    ) -> Result<SignedTransaction> {
        builder::sign_transaction(unsigned, signers)
    }

    /// Serialize a signed transaction to canonical wire bytes
    pub fn serialize_transaction(&self, signed: &SignedTransaction) -> Result<ByteString> {
        builder::serialize_transaction(signed)
    }

    /// Reconcile an invoice against one observation.
    ///
    /// # Examples
    ///
    /// ```
    /// use settlement_core::{Network, SettlementCore};
    /// use settlement_core::monitor::Observation;
    /// use settlement_core::types::*;
    ///
    /// let core = SettlementCore::new(Network::Mainnet);
    /// let invoice = Invoice {
    ///     id: 1,
    ///     required_sats: 50_000,
    ///     method: PaymentMethod::Bitcoin,
    ///     deposit_address: Some("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string()),
    ///     invoice_string: None,
    ///     status: InvoiceStatus::Unpaid,
    ///     observed_tip: 0,
    /// };
    /// let observation = Observation::Chain(ChainSnapshot {
    ///     balance: 50_000,
    ///     utxos: vec![],
    ///     tip_height: 100,
    /// });
    /// let verdict = core.reconcile(&invoice, &observation, 0).unwrap();
    /// assert_eq!(verdict.status, InvoiceStatus::Funded);
    /// ```
    pub fn reconcile(
        &self,
        invoice: &Invoice,
        observation: &Observation,
        now: Natural,
    ) -> Result<Reconciliation> {
        monitor::reconcile(invoice, observation, now)
    }

    /// Project a chain snapshot into a payment summary
    pub fn payment_summary(&self, invoice: &Invoice, snapshot: &ChainSnapshot) -> PaymentSummary {
        monitor::payment_summary(invoice, snapshot)
    }

    /// Create an invoice ledger bound to this core's network
    pub fn ledger(&self) -> InvoiceLedger {
        InvoiceLedger::new(self.network)
    }
}

impl Default for SettlementCore {
    /// Mainnet settlement core
    fn default() -> Self {
        Self::new(Network::Mainnet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mainnet() {
        let core = SettlementCore::default();
        assert_eq!(core.network(), Network::Mainnet);
    }

    #[test]
    fn test_facade_validation_surface() {
        let core = SettlementCore::new(Network::Mainnet);
        assert!(core.validate_bitcoin_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(core.validate_bitcoin_address_for_network("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(!core.validate_bitcoin_address_for_network("mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn"));
        // Free-function surface matches the facade
        assert!(validate_bitcoin_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(validate_bitcoin_address_for_network(
            "mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn",
            Network::Testnet
        ));
    }

    #[test]
    fn test_facade_ledger_inherits_network() {
        let core = SettlementCore::new(Network::Testnet);
        assert_eq!(core.ledger().network(), Network::Testnet);
    }
}
