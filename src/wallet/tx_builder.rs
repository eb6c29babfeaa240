// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Transaction builder
//!
//! Builds, sizes and signs P2WPKH transactions. Sizing is iterative: a
//! provisional transaction is assembled with fee zero to measure its
//! virtual size, then reassembled at the required fee, expanding the UTXO
//! selection whenever the accumulated value stops covering amount plus
//! fee. First-fit selection in server order; no output shuffling.

use std::cmp;

#[allow(unused_imports)]
use log::{debug, trace};

use bitcoin::absolute::LockTime;
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, OutPoint, Script, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness,
};

use super::signer::InputSigner;
use super::utils::IsDust;
use crate::blockchain::Blockchain;
use crate::error::Error;
use crate::types::FeeRate;

// Fee floor in satoshis, guarding against absurdly small vsize estimates
const MIN_ABSOLUTE_FEE: u64 = 141;

// A selected UTXO together with the script of the output it spends, which
// the BIP-143 sighash commits to
struct Candidate {
    outpoint: OutPoint,
    value: u64,
    script_pubkey: ScriptBuf,
}

/// One-shot builder for a payment from a single P2WPKH address
pub struct TxBuilder<'a> {
    client: &'a dyn Blockchain,
    signer: &'a dyn InputSigner,
    own_script: &'a Script,
}

impl<'a> TxBuilder<'a> {
    pub fn new(
        client: &'a dyn Blockchain,
        signer: &'a dyn InputSigner,
        own_script: &'a Script,
    ) -> Self {
        TxBuilder {
            client,
            signer,
            own_script,
        }
    }

    /// Build a signed transaction paying `value` sats to `recipient`
    ///
    /// Returns the transaction and the fee it pays. Change above the dust
    /// limit goes back to the builder's own address; dust change is
    /// absorbed into the fee.
    pub fn build(
        &self,
        recipient: &Address,
        value: u64,
        rate: FeeRate,
    ) -> Result<(Transaction, u64), Error> {
        if value.is_dust() {
            return Err(Error::BelowDustLimit(value));
        }

        let unspent = self.client.list_unspent(self.own_script)?;
        if unspent.is_empty() {
            return Err(Error::NoUnspentOutputs);
        }
        let available: u64 = unspent.iter().map(|utxo| utxo.value).sum();

        let mut pending = unspent.into_iter();
        let mut selected: Vec<Candidate> = Vec::new();
        let mut selected_value: u64 = 0;
        let mut fee: u64 = 0;

        loop {
            while selected_value < value + fee {
                let utxo = pending.next().ok_or(Error::InsufficientBalance {
                    needed: value + fee,
                    available,
                })?;

                // the parent transaction carries the script the signature
                // will commit to
                let prev_tx = self.client.get_tx(&utxo.outpoint.txid)?;
                let prev_out = prev_tx
                    .output
                    .get(utxo.outpoint.vout as usize)
                    .ok_or_else(|| {
                        Error::Generic(format!("missing previous output {}", utxo.outpoint))
                    })?;

                trace!("selected utxo {} worth {} sat", utxo.outpoint, utxo.value);
                selected.push(Candidate {
                    outpoint: utxo.outpoint,
                    value: utxo.value,
                    script_pubkey: prev_out.script_pubkey.clone(),
                });
                selected_value += utxo.value;
            }

            let (tx, paid) = self.assemble(&selected, selected_value, recipient, value, fee)?;
            let required = cmp::max(MIN_ABSOLUTE_FEE, rate.fee_vb(tx.vsize()));
            debug!(
                "provisional transaction: {} inputs, vsize {} vB, fee {} sat, required {} sat",
                tx.input.len(),
                tx.vsize(),
                fee,
                required
            );

            if fee >= required {
                return Ok((tx, paid));
            }
            fee = required;
        }
    }

    // Assemble and sign one provisional transaction at the given fee.
    // Callers guarantee `selected_value >= value + fee`.
    fn assemble(
        &self,
        selected: &[Candidate],
        selected_value: u64,
        recipient: &Address,
        value: u64,
        fee: u64,
    ) -> Result<(Transaction, u64), Error> {
        let input = selected
            .iter()
            .map(|candidate| TxIn {
                previous_output: candidate.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            })
            .collect();

        let mut output = vec![TxOut {
            value: Amount::from_sat(value),
            script_pubkey: recipient.script_pubkey(),
        }];

        let change = selected_value - value - fee;
        let mut paid = fee;
        if !change.is_dust() {
            output.push(TxOut {
                value: Amount::from_sat(change),
                script_pubkey: self.own_script.to_owned(),
            });
        } else {
            paid += change;
        }

        let mut tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input,
            output,
        };

        let witnesses = selected
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                self.signer
                    .witness(&tx, index, &candidate.script_pubkey, candidate.value)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        for (txin, witness) in tx.input.iter_mut().zip(witnesses) {
            txin.witness = witness;
        }

        Ok((tx, paid))
    }
}
