// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! End-to-end wallet scenarios over an in-memory blockchain

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, Network, OutPoint, Script, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    Witness,
};

use bwk::blockchain::Blockchain;
use bwk::keys::KeyRing;
use bwk::{
    Balance, Error, FeeRate, HistoryEntry, TransferDirection, TransferQuery, UnspentOutput,
    WalletConfig, WalletManager,
};

const MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// In-memory chain: transactions, UTXOs and per-script history
#[derive(Default)]
struct MockChain {
    txs: Mutex<HashMap<Txid, Transaction>>,
    utxos: Mutex<Vec<(ScriptBuf, UnspentOutput)>>,
    history: Mutex<Vec<(ScriptBuf, HistoryEntry)>>,
    broadcasts: Mutex<Vec<Transaction>>,
    serial: Mutex<u8>,
}

impl MockChain {
    fn new() -> Arc<Self> {
        Arc::new(MockChain::default())
    }

    /// Credit `value` sats to `script` at the given height. The funding
    /// transaction spends an outpoint this mock does not know, like a
    /// deposit from a third party.
    fn fund(&self, script: &Script, value: u64, height: i32) -> OutPoint {
        let serial = {
            let mut counter = self.serial.lock().unwrap();
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
        self.accept(tx, height);
        OutPoint::new(txid, 0)
    }

    // register a transaction at a height, updating UTXOs and history
    fn accept(&self, tx: Transaction, height: i32) {
        let txid = tx.compute_txid();

        let mut touched: Vec<ScriptBuf> =
            tx.output.iter().map(|out| out.script_pubkey.clone()).collect();
        {
            let txs = self.txs.lock().unwrap();
            for txin in &tx.input {
                if let Some(parent) = txs.get(&txin.previous_output.txid) {
                    if let Some(prev) = parent.output.get(txin.previous_output.vout as usize) {
                        touched.push(prev.script_pubkey.clone());
                    }
                }
            }
        }
        touched.dedup();

        {
            let mut utxos = self.utxos.lock().unwrap();
            utxos.retain(|(_, utxo)| {
                !tx.input.iter().any(|i| i.previous_output == utxo.outpoint)
            });
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
}

impl Blockchain for MockChain {
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
        entries.sort_by_key(|e| if e.height <= 0 { i64::MAX } else { e.height as i64 });
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
        Ok(FeeRate::from_sat_per_vb(1.0))
    }

    fn broadcast(&self, tx: &Transaction) -> Result<Txid, Error> {
        let txid = tx.compute_txid();
        self.broadcasts.lock().unwrap().push(tx.clone());
        // straight into the mempool
        self.accept(tx.clone(), 0);
        Ok(txid)
    }
}

fn manager_on(chain: &Arc<MockChain>, config: WalletConfig) -> WalletManager {
    let keys = KeyRing::from_mnemonic(MNEMONIC, config.network).unwrap();
    WalletManager::with_blockchain(keys, config, Arc::clone(chain) as Arc<dyn Blockchain>).unwrap()
}

fn foreign_script(network: Network) -> ScriptBuf {
    let secp = bitcoin::secp256k1::Secp256k1::new();
    let secret = bitcoin::secp256k1::SecretKey::from_slice(&[0x42; 32]).unwrap();
    let public = bitcoin::secp256k1::PublicKey::from_secret_key(&secp, &secret);
    bwk::address::p2wpkh_script(&public, network)
}

fn foreign_addr_string(network: Network) -> String {
    bitcoin::Address::from_script(&foreign_script(network), network)
        .unwrap()
        .to_string()
}

#[test]
fn first_account_matches_the_bip84_vector() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());

    let account = manager.get_account(0).unwrap();
    assert_eq!(
        account.get_address().unwrap().to_string(),
        "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
    );
    assert_eq!(account.path(), "m/84'/0'/0'/0/0");

    // the same address falls out of the same seed and path every time
    let again = manager.get_account(0).unwrap();
    assert_eq!(
        account.get_address().unwrap(),
        again.get_address().unwrap()
    );
}

#[test]
fn path_tail_sets_the_account_index() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());

    let account = manager.get_account_by_path("0'/0/1").unwrap();
    assert_eq!(account.index(), 1);
}

#[test]
fn message_signature_is_deterministic_and_binding() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());
    let account = manager.get_account(0).unwrap();

    let signature = account.sign("Dummy message to sign.").unwrap();
    assert_eq!(signature, account.sign("Dummy message to sign.").unwrap());
    assert!(account
        .verify("Dummy message to sign.", &signature)
        .unwrap());
    assert!(!account.verify("Another message.", &signature).unwrap());
}

#[test]
fn quote_covers_the_fee_floor() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());
    let account = manager.get_account(0).unwrap();

    chain.fund(&account.get_address().unwrap().script_pubkey(), 100_000, 101);

    let fee = account
        .quote_transaction(&foreign_addr_string(Network::Bitcoin), 10_000)
        .unwrap();
    assert!(fee >= 141);
    assert!(chain.broadcasts.lock().unwrap().is_empty());
}

#[test]
fn history_shows_the_funding_and_the_spend() {
    let config = WalletConfig {
        network: Network::Regtest,
        ..Default::default()
    };
    let chain = MockChain::new();
    let manager = manager_on(&chain, config);
    let account = manager.get_account(0).unwrap();
    let own_script = account.get_address().unwrap().script_pubkey();

    // 0.01 BTC in, then 10_000 sats out to a foreign address
    chain.fund(&own_script, 1_000_000, 102);
    let sent = account
        .send_transaction(&foreign_addr_string(Network::Regtest), 10_000)
        .unwrap();

    let transfers = account.get_transfers(&TransferQuery::default()).unwrap();
    assert_eq!(transfers.len(), 2);

    let incoming = &transfers[0];
    assert_eq!(incoming.direction, TransferDirection::Incoming);
    assert_eq!(incoming.value, 1_000_000);
    assert_eq!(incoming.height, 102);

    let outgoing = &transfers[1];
    assert_eq!(outgoing.direction, TransferDirection::Outgoing);
    assert_eq!(outgoing.value, 10_000);
    assert_eq!(outgoing.height, 0); // still in the mempool
    assert_eq!(outgoing.fee, Some(sent.fee));
    assert_eq!(outgoing.txid, sent.txid);

    // pagination
    assert!(account
        .get_transfers(&TransferQuery {
            limit: 0,
            ..Default::default()
        })
        .unwrap()
        .is_empty());
    assert!(account
        .get_transfers(&TransferQuery {
            skip: 2,
            ..Default::default()
        })
        .unwrap()
        .is_empty());
}

#[test]
fn broadcast_transaction_parses_and_pays_the_recipient() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());
    let account = manager.get_account(0).unwrap();
    let own_script = account.get_address().unwrap().script_pubkey();
    chain.fund(&own_script, 100_000, 101);

    let recipient = foreign_addr_string(Network::Bitcoin);
    let sent = account.send_transaction(&recipient, 10_000).unwrap();

    let broadcasts = chain.broadcasts.lock().unwrap();
    let tx = &broadcasts[0];

    // serialization survives a consensus round trip with the same txid
    let raw = bitcoin::consensus::encode::serialize(tx);
    let parsed: Transaction = bitcoin::consensus::encode::deserialize(&raw).unwrap();
    assert_eq!(parsed.compute_txid(), sent.txid);

    // exactly one recipient output, change back to the account
    assert_eq!(tx.output.len(), 2);
    assert_eq!(tx.output[0].value.to_sat(), 10_000);
    assert_eq!(
        tx.output[0].script_pubkey,
        foreign_script(Network::Bitcoin)
    );
    assert_eq!(tx.output[1].script_pubkey, own_script);

    // every input carries a [signature, pubkey] witness and no scriptSig
    for input in &tx.input {
        assert!(input.script_sig.is_empty());
        assert_eq!(input.witness.len(), 2);
    }

    // inputs minus outputs equals the reported fee
    let spent: u64 = 100_000;
    let out: u64 = tx.output.iter().map(|o| o.value.to_sat()).sum();
    assert_eq!(spent - out, sent.fee);
}

#[test]
fn dust_boundary_is_exact() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());
    let account = manager.get_account(0).unwrap();
    chain.fund(&account.get_address().unwrap().script_pubkey(), 100_000, 101);

    let recipient = foreign_addr_string(Network::Bitcoin);
    assert!(matches!(
        account.send_transaction(&recipient, 546),
        Err(Error::BelowDustLimit(546))
    ));
    assert!(account.send_transaction(&recipient, 547).is_ok());
}

#[test]
fn overdraft_and_empty_wallets_fail_cleanly() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());
    let account = manager.get_account(0).unwrap();
    let recipient = foreign_addr_string(Network::Bitcoin);

    assert!(matches!(
        account.send_transaction(&recipient, 10_000),
        Err(Error::NoUnspentOutputs)
    ));

    chain.fund(&account.get_address().unwrap().script_pubkey(), 100_000, 101);
    assert!(matches!(
        account.send_transaction(&recipient, 1_000_000_000_000),
        Err(Error::InsufficientBalance { .. })
    ));
}

#[test]
fn disposal_is_terminal() {
    let chain = MockChain::new();
    let manager = manager_on(&chain, WalletConfig::default());
    let account = manager.get_account(0).unwrap();

    account.dispose();
    assert!(matches!(account.get_address(), Err(Error::DisposedAccount)));
    assert!(matches!(account.sign("x"), Err(Error::DisposedAccount)));

    manager.dispose();
    assert!(matches!(manager.get_account(0), Err(Error::DisposedWallet)));
}
