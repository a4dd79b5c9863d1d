//! Coin selection over a snapshot of spendable outputs

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SettlementError};
use crate::types::{Natural, Utxo};

/// Outcome of a selection: the chosen funding set, the change left after
/// target and fee, and the fee itself (dust change folds into the fee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoSelection {
    pub chosen: Vec<Utxo>,
    pub change_sats: Natural,
    pub fee_sats: Natural,
}

/// Estimate the fee for a transaction of the given shape at a fee rate in
/// satoshis per vbyte.
pub fn estimate_fee(input_count: usize, output_count: usize, fee_rate: Natural) -> Natural {
    let vbytes = TX_OVERHEAD_VBYTES
        + input_count as Natural * INPUT_VBYTES
        + output_count as Natural * OUTPUT_VBYTES;
    vbytes * fee_rate
}

/// Choose a subset of `available` covering `target_sats` plus the fee.
///
/// Selection is largest-first over a deterministic order: descending
/// value, ties broken by outpoint bytes then index, so the same snapshot
/// always yields the same choice regardless of input ordering. The fee
/// estimate grows with each input added, so sufficiency is re-checked
/// after every addition. Exhausting the snapshot fails with
/// `InsufficientFunds` carrying the shortfall.
///
/// The caller owns the snapshot: outputs consumed by a built transaction
/// must be excluded from later calls until confirmed or abandoned.
pub fn select_utxos(
    available: &[Utxo],
    target_sats: Natural,
    fee_rate: Natural,
) -> Result<UtxoSelection> {
    let mut ordered: Vec<&Utxo> = available.iter().collect();
    ordered.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.outpoint.cmp(&b.outpoint))
    });

    let mut chosen: Vec<Utxo> = Vec::new();
    let mut gathered: Natural = 0;

    for utxo in ordered {
        chosen.push(utxo.clone());
        gathered += utxo.value;

        // Destination plus change output
        let fee = estimate_fee(chosen.len(), 2, fee_rate);
        if gathered >= target_sats + fee {
            let change = gathered - target_sats - fee;
            if change < DUST_THRESHOLD_SATS {
                // Uneconomical change is surrendered to the fee
                return Ok(UtxoSelection {
                    chosen,
                    change_sats: 0,
                    fee_sats: gathered - target_sats,
                });
            }
            return Ok(UtxoSelection {
                chosen,
                change_sats: change,
                fee_sats: fee,
            });
        }
    }

    let required = target_sats + estimate_fee(chosen.len(), 2, fee_rate);
    Err(SettlementError::InsufficientFunds {
        required,
        shortfall: required - gathered,
    })
}
