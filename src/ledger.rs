//! Invoice registry and settlement orchestration
//!
//! Maps invoice ids to their payment method, required amount, and current
//! settlement status, and drives the codec, selector, and builder for
//! issuance and payout. The ledger takes `&mut self` on every mutator, so
//! whoever owns it gets the single-writer-per-invoice discipline for
//! free; wrap it in a mutex or an owning actor to share it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::address;
use crate::builder;
use crate::constants::MAX_MONEY;
use crate::error::{Result, SettlementError};
use crate::monitor::{self, Observation, Reconciliation};
use crate::selection;
use crate::types::{
    Invoice, InvoiceStatus, Natural, Network, OutPoint, PaymentMethod, SideEffect, TxOutput,
    UnsignedTransaction, Utxo,
};

/// In-memory invoice ledger bound to one network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLedger {
    network: Network,
    invoices: BTreeMap<Natural, Invoice>,
    /// Outpoints consumed by built-but-unconfirmed payouts, excluded from
    /// selection until confirmed or abandoned
    reserved: BTreeSet<OutPoint>,
}

impl InvoiceLedger {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            invoices: BTreeMap::new(),
            reserved: BTreeSet::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Issue an on-chain invoice. The deposit address comes from the
    /// external key-derivation service and is validated against the
    /// ledger's network before being accepted.
    pub fn issue_bitcoin_invoice(
        &mut self,
        id: Natural,
        required_sats: Natural,
        deposit_address: &str,
    ) -> Result<&Invoice> {
        self.check_new_invoice(id, required_sats)?;
        if !address::validate_for_network(deposit_address, self.network) {
            return Err(SettlementError::InvalidAddress(format!(
                "deposit address not valid for {:?}",
                self.network
            )));
        }
        let invoice = Invoice {
            id,
            required_sats,
            method: PaymentMethod::Bitcoin,
            deposit_address: Some(deposit_address.to_string()),
            invoice_string: None,
            status: InvoiceStatus::Unpaid,
            observed_tip: 0,
        };
        self.invoices.insert(id, invoice);
        Ok(&self.invoices[&id])
    }

    /// Issue a Lightning invoice from a BOLT11 payment request.
    pub fn issue_lightning_invoice(
        &mut self,
        id: Natural,
        required_sats: Natural,
        invoice_string: &str,
    ) -> Result<&Invoice> {
        self.check_new_invoice(id, required_sats)?;
        if invoice_string.is_empty() {
            return Err(SettlementError::InvalidAmount(
                "empty Lightning payment request".to_string(),
            ));
        }
        let invoice = Invoice {
            id,
            required_sats,
            method: PaymentMethod::Lightning,
            deposit_address: None,
            invoice_string: Some(invoice_string.to_string()),
            status: InvoiceStatus::Unpaid,
            observed_tip: 0,
        };
        self.invoices.insert(id, invoice);
        Ok(&self.invoices[&id])
    }

    fn check_new_invoice(&self, id: Natural, required_sats: Natural) -> Result<()> {
        if self.invoices.contains_key(&id) {
            return Err(SettlementError::DuplicateInvoice(id));
        }
        if required_sats == 0 || required_sats > MAX_MONEY {
            return Err(SettlementError::InvalidAmount(format!(
                "{} satoshis",
                required_sats
            )));
        }
        Ok(())
    }

    pub fn invoice(&self, id: Natural) -> Option<&Invoice> {
        self.invoices.get(&id)
    }

    pub fn deposit_address(&self, id: Natural) -> Option<&str> {
        self.invoices
            .get(&id)
            .and_then(|invoice| invoice.deposit_address.as_deref())
    }

    /// All (invoice id, deposit address) pairs for on-chain invoices
    pub fn address_mappings(&self) -> Vec<(Natural, String)> {
        self.invoices
            .values()
            .filter_map(|invoice| {
                invoice
                    .deposit_address
                    .as_ref()
                    .map(|address| (invoice.id, address.clone()))
            })
            .collect()
    }

    /// Reconcile one observation and commit the verdict, returning the
    /// side effects for the caller to perform. A `StaleObservation` error
    /// propagates untouched; the invoice is left exactly as it was.
    pub fn observe(
        &mut self,
        id: Natural,
        observation: &Observation,
        now: Natural,
    ) -> Result<Vec<SideEffect>> {
        let invoice = self
            .invoices
            .get(&id)
            .ok_or(SettlementError::UnknownInvoice(id))?;
        let verdict = monitor::reconcile(invoice, observation, now)?;
        self.apply(id, verdict)
    }

    /// Commit a reconciliation verdict produced elsewhere.
    pub fn apply(&mut self, id: Natural, verdict: Reconciliation) -> Result<Vec<SideEffect>> {
        let invoice = self
            .invoices
            .get_mut(&id)
            .ok_or(SettlementError::UnknownInvoice(id))?;
        invoice.status = verdict.status;
        invoice.observed_tip = invoice.observed_tip.max(verdict.observed_tip);
        Ok(verdict.side_effects)
    }

    /// Mark outpoints as consumed by an in-flight transaction.
    pub fn reserve_outpoints<'a, I: IntoIterator<Item = &'a OutPoint>>(&mut self, outpoints: I) {
        self.reserved.extend(outpoints.into_iter().cloned());
    }

    /// Release outpoints after the spending transaction confirmed or was
    /// abandoned.
    pub fn release_outpoints<'a, I: IntoIterator<Item = &'a OutPoint>>(&mut self, outpoints: I) {
        for outpoint in outpoints {
            self.reserved.remove(outpoint);
        }
    }

    pub fn is_reserved(&self, outpoint: &OutPoint) -> bool {
        self.reserved.contains(outpoint)
    }

    /// Assemble an unsigned payout for an invoice's required amount from a
    /// snapshot of spendable outputs, reserving whatever it consumes.
    ///
    /// Reserved outpoints are excluded from selection, so a payout built
    /// from an earlier snapshot cannot be double-spent by the next call.
    /// Change below the dust threshold is folded into the fee and no
    /// change output is created.
    pub fn prepare_payout(
        &mut self,
        id: Natural,
        destination: &str,
        change_address: &str,
        available: &[Utxo],
        fee_rate: Natural,
    ) -> Result<UnsignedTransaction> {
        let required_sats = self
            .invoices
            .get(&id)
            .ok_or(SettlementError::UnknownInvoice(id))?
            .required_sats;

        let destination = self.decode_for_network(destination)?;
        let change = self.decode_for_network(change_address)?;

        let spendable: Vec<Utxo> = available
            .iter()
            .filter(|utxo| !self.reserved.contains(&utxo.outpoint))
            .cloned()
            .collect();
        let selection = selection::select_utxos(&spendable, required_sats, fee_rate)?;

        let mut outputs = vec![TxOutput {
            value: required_sats,
            script_pubkey: address::script_pubkey(&destination),
        }];
        if selection.change_sats > 0 {
            outputs.push(TxOutput {
                value: selection.change_sats,
                script_pubkey: address::script_pubkey(&change),
            });
        }

        let unsigned = builder::build_transaction(&selection.chosen, &outputs)?;
        self.reserve_outpoints(selection.chosen.iter().map(|utxo| &utxo.outpoint));
        Ok(unsigned)
    }

    fn decode_for_network(&self, address: &str) -> Result<crate::types::Address> {
        if !address::validate_for_network(address, self.network) {
            return Err(SettlementError::InvalidAddress(format!(
                "address not valid for {:?}",
                self.network
            )));
        }
        address::decode(address)
    }
}
