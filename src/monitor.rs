//! Payment reconciliation against chain and Lightning observations
//!
//! `reconcile` is a pure function: it takes an invoice, one observation,
//! and the current time, and returns the status the invoice should move
//! to plus descriptive side effects. The caller schedules polling, feeds
//! observations in, serializes per-invoice application, and performs the
//! effects; nothing here touches the outside world.

use serde::{Deserialize, Serialize};

use crate::constants::CONFIRMATION_THRESHOLD;
use crate::error::{Result, SettlementError};
use crate::types::{
    ChainSnapshot, Invoice, InvoiceStatus, LightningInvoice, LightningStatus, Natural, SideEffect,
};

/// One observation delivered by an external feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Observation {
    Chain(ChainSnapshot),
    Lightning(LightningInvoice),
}

/// Verdict of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub status: InvoiceStatus,
    pub side_effects: Vec<SideEffect>,
    /// Chain tip this verdict is based on; carried forward unchanged for
    /// Lightning observations
    pub observed_tip: Natural,
}

/// Caller-facing projection of a chain snapshot against an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub balance: Natural,
    pub utxo_count: usize,
    pub has_payment: bool,
}

/// Funding progress ordering; transitions only ever move up
fn rank(status: InvoiceStatus) -> u8 {
    match status {
        InvoiceStatus::Unpaid => 0,
        InvoiceStatus::PartiallyFunded => 1,
        InvoiceStatus::Funded => 2,
        InvoiceStatus::Verified => 3,
        InvoiceStatus::Expired => 3,
    }
}

/// Reconcile an invoice against a single observation.
///
/// Deterministic and idempotent: the same invoice, observation, and clock
/// always produce the same verdict, and a verdict that does not advance
/// the status carries no side effects. Terminal invoices are returned
/// unchanged. A chain snapshot behind the invoice's recorded tip fails
/// with `StaleObservation`; the caller treats that as "no new
/// observation".
pub fn reconcile(invoice: &Invoice, observation: &Observation, now: Natural) -> Result<Reconciliation> {
    if invoice.status.is_terminal() {
        return Ok(Reconciliation {
            status: invoice.status,
            side_effects: Vec::new(),
            observed_tip: invoice.observed_tip,
        });
    }

    match observation {
        Observation::Chain(snapshot) => reconcile_chain(invoice, snapshot),
        Observation::Lightning(snapshot) => reconcile_lightning(invoice, snapshot, now),
    }
}

fn reconcile_chain(invoice: &Invoice, snapshot: &ChainSnapshot) -> Result<Reconciliation> {
    if snapshot.tip_height < invoice.observed_tip {
        return Err(SettlementError::StaleObservation {
            observed: snapshot.tip_height,
            recorded: invoice.observed_tip,
        });
    }

    // Feeds may report a bare balance, a UTXO list, or both
    let utxo_sum: Natural = snapshot.utxos.iter().map(|u| u.value).sum();
    let received = snapshot.balance.max(utxo_sum);
    let confirmed: Natural = snapshot
        .utxos
        .iter()
        .filter(|u| {
            u.height > 0
                && u.height <= snapshot.tip_height
                && snapshot.tip_height - u.height + 1 >= CONFIRMATION_THRESHOLD
        })
        .map(|u| u.value)
        .sum();

    let target = if confirmed >= invoice.required_sats {
        InvoiceStatus::Verified
    } else if received >= invoice.required_sats {
        InvoiceStatus::Funded
    } else if received > 0 {
        InvoiceStatus::PartiallyFunded
    } else {
        InvoiceStatus::Unpaid
    };

    // An observation showing less than already recorded never regresses
    // the status; the higher rank wins
    let status = if rank(target) > rank(invoice.status) {
        target
    } else {
        invoice.status
    };

    let mut side_effects = Vec::new();
    if rank(status) >= rank(InvoiceStatus::Funded) && rank(invoice.status) < rank(InvoiceStatus::Funded) {
        side_effects.push(SideEffect::PaymentReceived {
            invoice_id: invoice.id,
            amount_sats: received,
        });
    }
    if status == InvoiceStatus::Verified && invoice.status != InvoiceStatus::Verified {
        side_effects.push(SideEffect::PaymentConfirmed {
            invoice_id: invoice.id,
        });
    }

    Ok(Reconciliation {
        status,
        side_effects,
        observed_tip: snapshot.tip_height,
    })
}

fn reconcile_lightning(
    invoice: &Invoice,
    snapshot: &LightningInvoice,
    now: Natural,
) -> Result<Reconciliation> {
    let expired = matches!(snapshot.status, LightningStatus::Expired)
        || (matches!(snapshot.status, LightningStatus::Pending) && now >= snapshot.expiry_unix_time);

    if expired {
        return Ok(Reconciliation {
            status: InvoiceStatus::Expired,
            side_effects: vec![SideEffect::InvoiceExpired {
                invoice_id: invoice.id,
            }],
            observed_tip: invoice.observed_tip,
        });
    }

    if matches!(snapshot.status, LightningStatus::Paid) {
        // Lightning settles atomically: a paid invoice is verified in one
        // step, announcing receipt if it was never funded before
        let mut side_effects = Vec::new();
        if rank(invoice.status) < rank(InvoiceStatus::Funded) {
            side_effects.push(SideEffect::PaymentReceived {
                invoice_id: invoice.id,
                amount_sats: snapshot.amount_sats(),
            });
        }
        side_effects.push(SideEffect::PaymentConfirmed {
            invoice_id: invoice.id,
        });
        return Ok(Reconciliation {
            status: InvoiceStatus::Verified,
            side_effects,
            observed_tip: invoice.observed_tip,
        });
    }

    Ok(Reconciliation {
        status: invoice.status,
        side_effects: Vec::new(),
        observed_tip: invoice.observed_tip,
    })
}

/// Project a chain snapshot into the caller-facing payment summary
pub fn payment_summary(invoice: &Invoice, snapshot: &ChainSnapshot) -> PaymentSummary {
    let utxo_sum: Natural = snapshot.utxos.iter().map(|u| u.value).sum();
    let received = snapshot.balance.max(utxo_sum);
    PaymentSummary {
        balance: received,
        utxo_count: snapshot.utxos.len(),
        has_payment: received >= invoice.required_sats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutPoint, PaymentMethod, Utxo};

    fn bitcoin_invoice(status: InvoiceStatus, observed_tip: Natural) -> Invoice {
        Invoice {
            id: 42,
            required_sats: 100_000,
            method: PaymentMethod::Bitcoin,
            deposit_address: Some("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string()),
            invoice_string: None,
            status,
            observed_tip,
        }
    }

    fn lightning_invoice_record(status: InvoiceStatus) -> Invoice {
        Invoice {
            id: 43,
            required_sats: 100_000,
            method: PaymentMethod::Lightning,
            deposit_address: None,
            invoice_string: Some("lnbc1m1...".to_string()),
            status,
            observed_tip: 0,
        }
    }

    fn snapshot(values_and_heights: &[(Natural, Natural)], tip: Natural) -> ChainSnapshot {
        let utxos: Vec<Utxo> = values_and_heights
            .iter()
            .enumerate()
            .map(|(i, &(value, height))| Utxo {
                outpoint: OutPoint {
                    hash: [i as u8 + 1; 32],
                    index: 0,
                },
                value,
                height,
            })
            .collect();
        let balance = utxos.iter().map(|u| u.value).sum();
        ChainSnapshot {
            balance,
            utxos,
            tip_height: tip,
        }
    }

    fn lightning_snapshot(status: LightningStatus, expiry: Natural) -> Observation {
        Observation::Lightning(LightningInvoice {
            invoice_string: "lnbc1m1...".to_string(),
            amount_msat: 100_000_000,
            expiry_unix_time: expiry,
            status,
        })
    }

    #[test]
    fn test_partial_funding() {
        let invoice = bitcoin_invoice(InvoiceStatus::Unpaid, 0);
        let obs = Observation::Chain(snapshot(&[(40_000, 0)], 100));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::PartiallyFunded);
        assert!(verdict.side_effects.is_empty());
        assert_eq!(verdict.observed_tip, 100);
    }

    #[test]
    fn test_full_funding_emits_payment_received() {
        let invoice = bitcoin_invoice(InvoiceStatus::Unpaid, 0);
        let obs = Observation::Chain(snapshot(&[(100_000, 0)], 100));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Funded);
        assert_eq!(
            verdict.side_effects,
            vec![SideEffect::PaymentReceived {
                invoice_id: 42,
                amount_sats: 100_000,
            }]
        );
    }

    #[test]
    fn test_confirmation_threshold_verifies() {
        let invoice = bitcoin_invoice(InvoiceStatus::Funded, 100);
        // Confirmed at height 100, tip 105: six confirmations
        let obs = Observation::Chain(snapshot(&[(100_000, 100)], 105));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Verified);
        assert_eq!(
            verdict.side_effects,
            vec![SideEffect::PaymentConfirmed { invoice_id: 42 }]
        );
    }

    #[test]
    fn test_insufficient_confirmations_stay_funded() {
        let invoice = bitcoin_invoice(InvoiceStatus::Funded, 100);
        let obs = Observation::Chain(snapshot(&[(100_000, 100)], 104));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Funded);
        assert!(verdict.side_effects.is_empty());
    }

    #[test]
    fn test_unpaid_to_verified_emits_both_effects() {
        let invoice = bitcoin_invoice(InvoiceStatus::Unpaid, 0);
        let obs = Observation::Chain(snapshot(&[(100_000, 100)], 110));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Verified);
        assert_eq!(verdict.side_effects.len(), 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let invoice = bitcoin_invoice(InvoiceStatus::Unpaid, 0);
        let obs = Observation::Chain(snapshot(&[(100_000, 0)], 100));
        let first = reconcile(&invoice, &obs, 0).unwrap();

        let mut advanced = invoice.clone();
        advanced.status = first.status;
        advanced.observed_tip = first.observed_tip;
        let second = reconcile(&advanced, &obs, 0).unwrap();
        assert_eq!(second.status, first.status);
        assert!(second.side_effects.is_empty());
    }

    #[test]
    fn test_stale_observation_rejected() {
        let invoice = bitcoin_invoice(InvoiceStatus::Funded, 120);
        let obs = Observation::Chain(snapshot(&[], 110));
        let err = reconcile(&invoice, &obs, 0).unwrap_err();
        assert_eq!(
            err,
            SettlementError::StaleObservation {
                observed: 110,
                recorded: 120,
            }
        );
    }

    #[test]
    fn test_fresh_regression_never_downgrades() {
        // Tip advanced but the snapshot shows nothing; status holds
        let invoice = bitcoin_invoice(InvoiceStatus::Funded, 120);
        let obs = Observation::Chain(snapshot(&[], 130));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Funded);
        assert!(verdict.side_effects.is_empty());
    }

    #[test]
    fn test_lightning_paid_verifies() {
        let invoice = lightning_invoice_record(InvoiceStatus::Unpaid);
        let obs = lightning_snapshot(LightningStatus::Paid, 2_000);
        let verdict = reconcile(&invoice, &obs, 1_000).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Verified);
        assert_eq!(verdict.side_effects.len(), 2);
    }

    #[test]
    fn test_lightning_pending_past_expiry_expires() {
        let invoice = lightning_invoice_record(InvoiceStatus::Unpaid);
        let obs = lightning_snapshot(LightningStatus::Pending, 2_000);
        let verdict = reconcile(&invoice, &obs, 2_000).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Expired);
        assert_eq!(
            verdict.side_effects,
            vec![SideEffect::InvoiceExpired { invoice_id: 43 }]
        );
    }

    #[test]
    fn test_lightning_pending_before_expiry_waits() {
        let invoice = lightning_invoice_record(InvoiceStatus::Unpaid);
        let obs = lightning_snapshot(LightningStatus::Pending, 2_000);
        let verdict = reconcile(&invoice, &obs, 1_999).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Unpaid);
        assert!(verdict.side_effects.is_empty());
    }

    #[test]
    fn test_late_payment_cannot_leave_expired() {
        let invoice = lightning_invoice_record(InvoiceStatus::Expired);
        let obs = lightning_snapshot(LightningStatus::Paid, 2_000);
        let verdict = reconcile(&invoice, &obs, 3_000).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Expired);
        assert!(verdict.side_effects.is_empty());
    }

    #[test]
    fn test_verified_is_terminal() {
        let invoice = bitcoin_invoice(InvoiceStatus::Verified, 120);
        let obs = Observation::Chain(snapshot(&[], 130));
        let verdict = reconcile(&invoice, &obs, 0).unwrap();
        assert_eq!(verdict.status, InvoiceStatus::Verified);
        assert!(verdict.side_effects.is_empty());
    }

    #[test]
    fn test_payment_summary() {
        let invoice = bitcoin_invoice(InvoiceStatus::Unpaid, 0);
        let snap = snapshot(&[(60_000, 0), (50_000, 0)], 100);
        let summary = payment_summary(&invoice, &snap);
        assert_eq!(summary.balance, 110_000);
        assert_eq!(summary.utxo_count, 2);
        assert!(summary.has_payment);

        let short = snapshot(&[(60_000, 0)], 100);
        assert!(!payment_summary(&invoice, &short).has_payment);
    }
}
