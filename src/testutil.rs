// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! In-memory blockchain fake for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, Network, OutPoint, Script, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Txid, Witness,
};

use crate::address;
use crate::blockchain::Blockchain;
use crate::error::Error;
use crate::types::{Balance, FeeRate, HistoryEntry, UnspentOutput};

/// Deterministic account key material for tests
pub(crate) fn test_account_keys() -> (SecretKey, PublicKey, ScriptBuf) {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[0xcd; 32]).unwrap();
    let public = PublicKey::from_secret_key(&secp, &secret);
    let script = address::p2wpkh_script(&public, Network::Bitcoin);
    (secret, public, script)
}

/// A valid P2WPKH address that no test account owns
pub(crate) fn foreign_address() -> Address {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[0x99; 32]).unwrap();
    let public = PublicKey::from_secret_key(&secp, &secret);
    address::p2wpkh_address(&public, Network::Bitcoin)
}

/// A one-input payment with a recipient output and a change output
pub(crate) fn payment_tx(
    spends: OutPoint,
    to_script: &Script,
    to_value: u64,
    change_script: &Script,
    change_value: u64,
) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: spends,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![
            TxOut {
                value: Amount::from_sat(to_value),
                script_pubkey: to_script.to_owned(),
            },
            TxOut {
                value: Amount::from_sat(change_value),
                script_pubkey: change_script.to_owned(),
            },
        ],
    }
}

/// In-memory [`Blockchain`] with scriptable chain state
pub(crate) struct MockBlockchain {
    txs: Mutex<HashMap<Txid, Transaction>>,
    utxos: Mutex<Vec<(ScriptBuf, UnspentOutput)>>,
    history: Mutex<Vec<(ScriptBuf, HistoryEntry)>>,
    pub(crate) fee_rate: Mutex<f32>,
    pub(crate) broadcasts: Mutex<Vec<Transaction>>,
    counter: Mutex<u8>,
}

impl MockBlockchain {
    pub(crate) fn new() -> Self {
        MockBlockchain {
            txs: Mutex::new(HashMap::new()),
            utxos: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            fee_rate: Mutex::new(1.0),
            broadcasts: Mutex::new(Vec::new()),
            counter: Mutex::new(0),
        }
    }

    /// Credit `value` sats to `script` in a fresh confirmed transaction
    pub(crate) fn fund(&self, script: &Script, value: u64) -> OutPoint {
        let height = {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            100 + *counter as i32
        };
        self.fund_at_height(script, value, height)
    }

    /// Like [`fund`] with an explicit confirmation height
    ///
    /// The funding transaction spends an output the mock does not know, so
    /// its own fee is unrecoverable, like a deposit from a third party.
    ///
    /// [`fund`]: MockBlockchain::fund
    pub(crate) fn fund_at_height(&self, script: &Script, value: u64, height: i32) -> OutPoint {
        let serial = {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            *counter
        };
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::new(Txid::from_byte_array([serial; 32]), 0),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(value),
                script_pubkey: script.to_owned(),
            }],
        };
        let txid = tx.compute_txid();
        self.insert_tx(tx, height);
        OutPoint::new(txid, 0)
    }

    /// Register a transaction: its outputs become unspent, the outputs it
    /// spends stop being unspent, and history entries appear for every
    /// script it touches
    pub(crate) fn insert_tx(&self, tx: Transaction, height: i32) {
        let txid = tx.compute_txid();

        let mut touched: Vec<ScriptBuf> =
            tx.output.iter().map(|out| out.script_pubkey.clone()).collect();
        {
            let txs = self.txs.lock().unwrap();
            for txin in &tx.input {
                if let Some(parent) = txs.get(&txin.previous_output.txid) {
                    if let Some(prev_out) =
                        parent.output.get(txin.previous_output.vout as usize)
                    {
                        touched.push(prev_out.script_pubkey.clone());
                    }
                }
            }
        }
        touched.dedup();

        self.utxos
            .lock()
            .unwrap()
            .retain(|(_, utxo)| !tx.input.iter().any(|i| i.previous_output == utxo.outpoint));
        {
            let mut utxos = self.utxos.lock().unwrap();
            for (vout, out) in tx.output.iter().enumerate() {
                utxos.push((
                    out.script_pubkey.clone(),
                    UnspentOutput {
                        outpoint: OutPoint::new(txid, vout as u32),
                        value: out.value.to_sat(),
                    },
                ));
            }
        }
        {
            let mut history = self.history.lock().unwrap();
            for script in touched {
                history.push((script, HistoryEntry { txid, height }));
            }
        }
        self.txs.lock().unwrap().insert(txid, tx);
    }

    pub(crate) fn set_fee_rate(&self, sat_per_vb: f32) {
        *self.fee_rate.lock().unwrap() = sat_per_vb;
    }
}

impl Blockchain for MockBlockchain {
    fn get_balance(&self, script: &Script) -> Result<Balance, Error> {
        let confirmed = self
            .utxos
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s.as_script() == script)
            .map(|(_, utxo)| utxo.value)
            .sum();
        Ok(Balance {
            confirmed,
            unconfirmed: 0,
        })
    }

    fn list_unspent(&self, script: &Script) -> Result<Vec<UnspentOutput>, Error> {
        Ok(self
            .utxos
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s.as_script() == script)
            .map(|(_, utxo)| *utxo)
            .collect())
    }

    fn get_history(&self, script: &Script) -> Result<Vec<HistoryEntry>, Error> {
        let mut entries: Vec<HistoryEntry> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s.as_script() == script)
            .map(|(_, entry)| *entry)
            .collect();
        entries.sort_by_key(|entry| {
            if entry.height <= 0 {
                i64::MAX
            } else {
                entry.height as i64
            }
        });
        Ok(entries)
    }

    fn get_tx(&self, txid: &Txid) -> Result<Transaction, Error> {
        self.txs
            .lock()
            .unwrap()
            .get(txid)
            .cloned()
            .ok_or_else(|| Error::Generic(format!("transaction {} not found", txid)))
    }

    fn estimate_fee(&self, _target: usize) -> Result<FeeRate, Error> {
        Ok(FeeRate::from_sat_per_vb(*self.fee_rate.lock().unwrap()))
    }

    fn broadcast(&self, tx: &Transaction) -> Result<Txid, Error> {
        let txid = tx.compute_txid();
        self.broadcasts.lock().unwrap().push(tx.clone());
        self.insert_tx(tx.clone(), 0);
        Ok(txid)
    }
}
