//! Transaction assembly, signing, and wire serialization
//!
//! Builds an unsigned transaction from funding UTXOs and ordered outputs,
//! applies one ECDSA signature per input, and serializes the result to
//! canonical wire bytes. Output ordering is caller-visible and preserved
//! exactly; a transaction with any unsigned input never serializes.

use std::collections::BTreeMap;

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use ripemd::Ripemd160;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::constants::*;
use crate::error::{Result, SettlementError};
use crate::types::{ByteString, Hash, Natural, SignedTransaction, TxInput, TxOutput, UnsignedTransaction, Utxo};

/// Signing capability for a single input, supplied by the caller per
/// input index. Holds the key material; the sighash and script code are
/// derived here.
pub struct InputSigner {
    pub secret_key: SecretKey,
}

impl InputSigner {
    pub fn new(secret_key: SecretKey) -> Self {
        Self { secret_key }
    }
}

/// Assemble an unsigned transaction spending `inputs` into `outputs`.
///
/// Fails with `InsufficientFunds` when outputs exceed inputs; the fee is
/// whatever remains, never negative.
pub fn build_transaction(inputs: &[Utxo], outputs: &[TxOutput]) -> Result<UnsignedTransaction> {
    if inputs.is_empty() || outputs.is_empty() {
        return Err(SettlementError::IncompleteTransaction(
            "at least one input and one output required".to_string(),
        ));
    }

    for (i, output) in outputs.iter().enumerate() {
        if output.value > MAX_MONEY {
            return Err(SettlementError::InvalidAmount(format!(
                "output {} exceeds maximum money supply",
                i
            )));
        }
        if output.script_pubkey.is_empty() {
            return Err(SettlementError::IncompleteTransaction(format!(
                "output {} has an empty locking script",
                i
            )));
        }
    }

    let total_in: Natural = inputs.iter().map(|u| u.value).sum();
    let total_out: Natural = outputs.iter().map(|o| o.value).sum();
    if total_out > total_in {
        return Err(SettlementError::InsufficientFunds {
            required: total_out,
            shortfall: total_out - total_in,
        });
    }

    let tx_inputs = inputs
        .iter()
        .map(|utxo| TxInput {
            prevout: utxo.outpoint.clone(),
            value: utxo.value,
            script_sig: Vec::new(),
            sequence: SEQUENCE_FINAL,
        })
        .collect();

    Ok(UnsignedTransaction {
        version: TX_VERSION,
        inputs: tx_inputs,
        outputs: outputs.to_vec(),
        lock_time: 0,
        fee: total_in - total_out,
    })
}

/// Sign every input of an unsigned transaction.
///
/// Each input index must have a signer (`IncompleteTransaction`
/// otherwise). The signature commits to a SIGHASH_ALL digest over the
/// transaction with the signer's pay-to-pubkey-hash script code in place
/// of the input's script; every produced signature is verified against
/// its public key before being accepted, so a rejected signature surfaces
/// as `SigningError` rather than an unbroadcastable transaction.
pub fn sign_transaction(
    unsigned: &UnsignedTransaction,
    signers: &BTreeMap<usize, InputSigner>,
) -> Result<SignedTransaction> {
    let secp = Secp256k1::new();
    let mut signed_inputs = Vec::with_capacity(unsigned.inputs.len());

    for (index, input) in unsigned.inputs.iter().enumerate() {
        let signer = signers.get(&index).ok_or_else(|| {
            SettlementError::IncompleteTransaction(format!("no signer for input {}", index))
        })?;

        let pubkey = PublicKey::from_secret_key(&secp, &signer.secret_key);
        let script_code = p2pkh_script_code(&pubkey);
        let digest = signature_hash(unsigned, index, &script_code);

        let message = Message::from_digest_slice(&digest)
            .map_err(|e| SettlementError::SigningError(format!("bad digest: {}", e)))?;
        let signature = secp.sign_ecdsa(&message, &signer.secret_key);
        secp.verify_ecdsa(&message, &signature, &pubkey)
            .map_err(|e| SettlementError::SigningError(format!("input {}: {}", index, e)))?;

        // <sig || SIGHASH_ALL> <pubkey>
        let mut der = signature.serialize_der().to_vec();
        der.push(SIGHASH_ALL as u8);
        let mut script_sig = Vec::with_capacity(der.len() + 35);
        push_slice(&mut script_sig, &der);
        push_slice(&mut script_sig, &pubkey.serialize());

        signed_inputs.push(TxInput {
            prevout: input.prevout.clone(),
            value: input.value,
            script_sig,
            sequence: input.sequence,
        });
    }

    let wire = serialize_raw(
        unsigned.version,
        &signed_inputs,
        &unsigned.outputs,
        unsigned.lock_time,
    );
    let txid = transaction_id(&wire);

    Ok(SignedTransaction {
        version: unsigned.version,
        inputs: signed_inputs,
        outputs: unsigned.outputs.clone(),
        lock_time: unsigned.lock_time,
        fee: unsigned.fee,
        txid,
    })
}

/// Serialize a signed transaction to canonical wire bytes.
///
/// Every input must carry a complete unlocking script; an empty script
/// means signing was skipped and the transaction must not reach the
/// broadcast service.
pub fn serialize_transaction(signed: &SignedTransaction) -> Result<ByteString> {
    for (index, input) in signed.inputs.iter().enumerate() {
        if input.script_sig.is_empty() {
            return Err(SettlementError::IncompleteTransaction(format!(
                "input {} is not finalized",
                index
            )));
        }
    }
    Ok(serialize_raw(
        signed.version,
        &signed.inputs,
        &signed.outputs,
        signed.lock_time,
    ))
}

/// Transaction id: double-SHA256 of the serialized form
pub fn transaction_id(wire: &[u8]) -> Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(wire);
    let result = sha256d::Hash::from_engine(engine);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// SIGHASH_ALL digest for one input: the transaction serialized with
/// `script_code` in the signed input's script slot, every other input's
/// script empty, and the hash type appended.
fn signature_hash(tx: &UnsignedTransaction, index: usize, script_code: &[u8]) -> Hash {
    let inputs: Vec<TxInput> = tx
        .inputs
        .iter()
        .enumerate()
        .map(|(i, input)| TxInput {
            prevout: input.prevout.clone(),
            value: input.value,
            script_sig: if i == index {
                script_code.to_vec()
            } else {
                Vec::new()
            },
            sequence: input.sequence,
        })
        .collect();

    let mut preimage = serialize_raw(tx.version, &inputs, &tx.outputs, tx.lock_time);
    preimage.extend_from_slice(&SIGHASH_ALL.to_le_bytes());
    transaction_id(&preimage)
}

/// Canonical wire layout: version, varint-counted inputs and outputs,
/// lock time, all integers little-endian.
fn serialize_raw(
    version: u32,
    inputs: &[TxInput],
    outputs: &[TxOutput],
    lock_time: u32,
) -> ByteString {
    let mut out = Vec::new();
    out.extend_from_slice(&version.to_le_bytes());

    write_varint(&mut out, inputs.len() as u64);
    for input in inputs {
        out.extend_from_slice(&input.prevout.hash);
        out.extend_from_slice(&input.prevout.index.to_le_bytes());
        write_varint(&mut out, input.script_sig.len() as u64);
        out.extend_from_slice(&input.script_sig);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }

    write_varint(&mut out, outputs.len() as u64);
    for output in outputs {
        out.extend_from_slice(&output.value.to_le_bytes());
        write_varint(&mut out, output.script_pubkey.len() as u64);
        out.extend_from_slice(&output.script_pubkey);
    }

    out.extend_from_slice(&lock_time.to_le_bytes());
    out
}

/// Bitcoin CompactSize integer
fn write_varint(out: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&n.to_le_bytes());
    }
}

/// HASH160: RIPEMD-160 of SHA-256
fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}

/// Script code the signature commits to: the standard P2PKH locking
/// script for the signer's key
fn p2pkh_script_code(pubkey: &PublicKey) -> ByteString {
    let hash = hash160(&pubkey.serialize());
    let mut script = vec![0x76, 0xa9, 0x14];
    script.extend_from_slice(&hash);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}

/// Minimal data push for scripts under 76 bytes per element
fn push_slice(script: &mut Vec<u8>, data: &[u8]) {
    debug_assert!(data.len() < 0x4c);
    script.push(data.len() as u8);
    script.extend_from_slice(data);
}
