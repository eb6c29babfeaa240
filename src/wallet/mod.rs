// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Wallet manager and accounts
//!
//! A [`WalletManager`] owns the seed-derived [`KeyRing`], a blockchain
//! handle and the cache of [`Account`]s it has handed out, keyed by full
//! derivation path so repeated requests return the same instance. Accounts
//! are the operational surface: address, balance, message signatures,
//! payments and transfer history. Disposal is explicit and idempotent at
//! both levels and wipes key material.
//!
//! [`WatchOnlyAccount`] covers the keyless subset of the account surface
//! for an arbitrary address.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[allow(unused_imports)]
use log::{debug, info, trace};

use bitcoin::bip32::DerivationPath;
use bitcoin::secp256k1::PublicKey;
use bitcoin::{Address, Network, ScriptBuf};

pub mod signer;
pub mod transfers;
pub mod tx_builder;
pub(crate) mod utils;

use crate::address;
use crate::blockchain::fees::FeeTierClient;
use crate::blockchain::{Blockchain, ElectrumBlockchain};
use crate::config::WalletConfig;
use crate::error::Error;
use crate::keys::{self, AccountKey, KeyPair, KeyRing};
use crate::types::{FeeRate, FeeRates, SentTransaction, TransferQuery, TransferRecord};

use self::signer::{AccountSigner, PlaceholderSigner};
use self::transfers::TransferEngine;
use self::tx_builder::TxBuilder;

/// Hands out accounts derived from one seed under one configuration
pub struct WalletManager {
    config: WalletConfig,
    base_path: DerivationPath,
    blockchain: Arc<dyn Blockchain>,
    fee_client: FeeTierClient,
    state: Mutex<ManagerState>,
}

// `keys: None` marks a disposed manager
struct ManagerState {
    keys: Option<KeyRing>,
    accounts: HashMap<DerivationPath, Arc<Account>>,
}

impl WalletManager {
    /// Create a manager from a BIP-39 mnemonic, connecting to the
    /// configured Electrum server
    pub fn from_mnemonic(mnemonic: &str, config: WalletConfig) -> Result<Self, Error> {
        config.validate()?;
        let keys = KeyRing::from_mnemonic(mnemonic, config.network)?;
        let blockchain: Arc<dyn Blockchain> = Arc::new(ElectrumBlockchain::from_config(&config)?);
        Ok(Self::assemble(keys, config, blockchain))
    }

    /// Create a manager from raw seed bytes, connecting to the configured
    /// Electrum server
    pub fn from_seed(seed: &[u8], config: WalletConfig) -> Result<Self, Error> {
        config.validate()?;
        let keys = KeyRing::from_seed(seed, config.network)?;
        let blockchain: Arc<dyn Blockchain> = Arc::new(ElectrumBlockchain::from_config(&config)?);
        Ok(Self::assemble(keys, config, blockchain))
    }

    /// Create a manager on top of a caller-supplied blockchain backend
    pub fn with_blockchain(
        keys: KeyRing,
        config: WalletConfig,
        blockchain: Arc<dyn Blockchain>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::assemble(keys, config, blockchain))
    }

    fn assemble(keys: KeyRing, config: WalletConfig, blockchain: Arc<dyn Blockchain>) -> Self {
        WalletManager {
            base_path: config.base_path(),
            fee_client: FeeTierClient::new(&config.fee_endpoint),
            config,
            blockchain,
            state: Mutex::new(ManagerState {
                keys: Some(keys),
                accounts: HashMap::new(),
            }),
        }
    }

    /// The account at `<base>/0'/0/<index>`
    pub fn get_account(&self, index: u32) -> Result<Arc<Account>, Error> {
        self.get_account_by_path(&format!("0'/0/{}", index))
    }

    /// The account at the given path tail
    ///
    /// The tail is appended to the configured base path; a leading `/` is
    /// accepted, and an absolute `m/...` path is used verbatim.
    pub fn get_account_by_path(&self, path: &str) -> Result<Arc<Account>, Error> {
        let mut state = self.state.lock().unwrap();
        let keys = state.keys.as_ref().ok_or(Error::DisposedWallet)?;

        let full_path = keys::assemble_path(&self.base_path, path)?;
        if let Some(account) = state.accounts.get(&full_path) {
            return Ok(Arc::clone(account));
        }

        trace!("deriving account at {}", keys::absolute_path_string(&full_path));
        let key = keys.derive(&full_path)?;
        let account = Arc::new(Account::new(
            key,
            full_path.clone(),
            self.config.network,
            Arc::clone(&self.blockchain),
        ));
        state.accounts.insert(full_path, Arc::clone(&account));
        Ok(account)
    }

    /// Current fee tiers from the configured HTTP endpoint, in sats/vbyte
    pub fn get_fee_rates(&self) -> Result<FeeRates, Error> {
        self.ensure_live()?;
        self.fee_client.fee_rates()
    }

    /// The mnemonic this manager was created from, if any
    pub fn seed_phrase(&self) -> Result<Option<String>, Error> {
        let state = self.state.lock().unwrap();
        let keys = state.keys.as_ref().ok_or(Error::DisposedWallet)?;
        Ok(keys.seed_phrase().map(str::to_string))
    }

    /// Dispose every account handed out and wipe the key ring
    ///
    /// Idempotent; any other operation afterwards fails with
    /// [`Error::DisposedWallet`].
    pub fn dispose(&self) {
        let mut state = self.state.lock().unwrap();
        for account in state.accounts.values() {
            account.dispose();
        }
        state.accounts.clear();
        // dropping the ring zeroes the master key buffer
        state.keys = None;
        debug!("wallet manager disposed");
    }

    fn ensure_live(&self) -> Result<(), Error> {
        match self.state.lock().unwrap().keys {
            Some(_) => Ok(()),
            None => Err(Error::DisposedWallet),
        }
    }
}

// What disposal takes away: the key and the blockchain handle
struct AccountInner {
    key: AccountKey,
    blockchain: Arc<dyn Blockchain>,
}

/// One derived account: a key pair, its P2WPKH address and the operations
/// on them
///
/// Obtained from a [`WalletManager`]. All secret material is wiped on
/// [`dispose`](Account::dispose); afterwards every operation fails with
/// [`Error::DisposedAccount`].
pub struct Account {
    path: DerivationPath,
    index: u32,
    network: Network,
    public_key: PublicKey,
    address: Address,
    script_pubkey: ScriptBuf,
    inner: Mutex<Option<AccountInner>>,
}

impl Account {
    fn new(
        key: AccountKey,
        path: DerivationPath,
        network: Network,
        blockchain: Arc<dyn Blockchain>,
    ) -> Self {
        let public_key = *key.public_key();
        let address = address::p2wpkh_address(&public_key, network);
        let script_pubkey = address.script_pubkey();
        Account {
            index: key.index(),
            path,
            network,
            public_key,
            address,
            script_pubkey,
            inner: Mutex::new(Some(AccountInner { key, blockchain })),
        }
    }

    /// Index of the account, the final component of its path
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Absolute derivation path, e.g. `m/84'/0'/0'/0/0`
    pub fn path(&self) -> String {
        keys::absolute_path_string(&self.path)
    }

    /// The account's P2WPKH address
    pub fn get_address(&self) -> Result<Address, Error> {
        self.ensure_live()?;
        Ok(self.address.clone())
    }

    /// Copy of the account's key material
    pub fn key_pair(&self) -> Result<KeyPair, Error> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(Error::DisposedAccount)?;
        inner.key.key_pair()
    }

    /// Sign `message` with the account key
    ///
    /// Deterministic ECDSA (RFC 6979, low-S) over `SHA-256(message)`,
    /// serialized as base64 of the DER encoding.
    pub fn sign(&self, message: &str) -> Result<String, Error> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(Error::DisposedAccount)?;
        let secret = inner.key.secret_key()?;
        Ok(signer::sign_message(&secret, message))
    }

    /// Check a signature produced by [`sign`](Account::sign)
    ///
    /// `false` for a well-formed signature that does not match;
    /// [`Error::MalformedSignature`] when it cannot be decoded at all.
    pub fn verify(&self, message: &str, signature: &str) -> Result<bool, Error> {
        self.ensure_live()?;
        signer::verify_message(&self.public_key, message, signature)
    }

    /// Confirmed balance of the account's address, in sats
    pub fn get_balance(&self) -> Result<u64, Error> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(Error::DisposedAccount)?;
        Ok(inner.blockchain.get_balance(&self.script_pubkey)?.confirmed)
    }

    /// Build, sign and broadcast a payment of `value` sats to `to`
    ///
    /// Broadcast is the final step: no state is left behind by a failed
    /// call, but a transport error racing the broadcast can leave the
    /// transaction on-chain even though an error is returned.
    pub fn send_transaction(&self, to: &str, value: u64) -> Result<SentTransaction, Error> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(Error::DisposedAccount)?;

        let (tx, fee) = self.plan(inner, to, value)?;
        let txid = inner.blockchain.broadcast(&tx)?;
        info!("sent {} sat to {} in {} ({} sat fee)", value, to, txid, fee);
        Ok(SentTransaction { txid, fee })
    }

    /// The fee of [`send_transaction`](Account::send_transaction) without
    /// broadcasting anything
    pub fn quote_transaction(&self, to: &str, value: u64) -> Result<u64, Error> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(Error::DisposedAccount)?;
        self.plan(inner, to, value).map(|(_, fee)| fee)
    }

    fn plan(
        &self,
        inner: &AccountInner,
        to: &str,
        value: u64,
    ) -> Result<(bitcoin::Transaction, u64), Error> {
        let recipient = address::decode_recipient(to, self.network)?;
        let rate = inner
            .blockchain
            .estimate_fee(1)?
            .max(FeeRate::default_min_relay_fee());

        let secret = inner.key.secret_key()?;
        let signer = AccountSigner::new(&secret, &self.public_key);
        TxBuilder::new(inner.blockchain.as_ref(), &signer, &self.script_pubkey)
            .build(&recipient, value, rate)
    }

    /// Transfer records of the account's address
    pub fn get_transfers(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>, Error> {
        let guard = self.inner.lock().unwrap();
        let inner = guard.as_ref().ok_or(Error::DisposedAccount)?;
        TransferEngine::new(
            inner.blockchain.as_ref(),
            &self.address,
            &self.script_pubkey,
            self.network,
        )
        .get_transfers(query)
    }

    /// Token balances are permanently unsupported on this wallet
    pub fn get_token_balance(&self, _token: &str) -> Result<u64, Error> {
        Err(Error::UnsupportedOperation("getTokenBalance"))
    }

    /// Token transfers are permanently unsupported on this wallet
    pub fn transfer(&self) -> Result<(), Error> {
        Err(Error::UnsupportedOperation("transfer"))
    }

    /// Token transfer quoting is permanently unsupported on this wallet
    pub fn quote_transfer(&self) -> Result<u64, Error> {
        Err(Error::UnsupportedOperation("quoteTransfer"))
    }

    /// Wipe the key material and release the blockchain handle
    ///
    /// Idempotent; every other operation afterwards fails with
    /// [`Error::DisposedAccount`].
    pub fn dispose(&self) {
        // dropping the key zeroes its buffers
        self.inner.lock().unwrap().take();
    }

    fn ensure_live(&self) -> Result<(), Error> {
        match *self.inner.lock().unwrap() {
            Some(_) => Ok(()),
            None => Err(Error::DisposedAccount),
        }
    }
}

/// The keyless subset of the account surface, for an arbitrary address
///
/// Built from an address instead of a seed: it can read balance and
/// history and quote payment fees, but holds no key material and exposes
/// no signing or sending operations.
pub struct WatchOnlyAccount {
    network: Network,
    address: Address,
    script_pubkey: ScriptBuf,
    blockchain: Arc<dyn Blockchain>,
}

impl WatchOnlyAccount {
    /// Watch `address`, connecting to the configured Electrum server
    pub fn new(address: &str, config: &WalletConfig) -> Result<Self, Error> {
        config.validate()?;
        let blockchain: Arc<dyn Blockchain> = Arc::new(ElectrumBlockchain::from_config(config)?);
        Self::with_blockchain(address, config, blockchain)
    }

    /// Watch `address` on top of a caller-supplied blockchain backend
    pub fn with_blockchain(
        address: &str,
        config: &WalletConfig,
        blockchain: Arc<dyn Blockchain>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let address = address::decode_recipient(address, config.network)?;
        let script_pubkey = address.script_pubkey();
        Ok(WatchOnlyAccount {
            network: config.network,
            address,
            script_pubkey,
            blockchain,
        })
    }

    /// The watched address
    pub fn get_address(&self) -> &Address {
        &self.address
    }

    /// Confirmed balance of the watched address, in sats
    pub fn get_balance(&self) -> Result<u64, Error> {
        Ok(self.blockchain.get_balance(&self.script_pubkey)?.confirmed)
    }

    /// Transfer records of the watched address
    pub fn get_transfers(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>, Error> {
        TransferEngine::new(
            self.blockchain.as_ref(),
            &self.address,
            &self.script_pubkey,
            self.network,
        )
        .get_transfers(query)
    }

    /// Fee quote for a payment from the watched address
    ///
    /// Inputs are sized with stand-in witnesses of canonical P2WPKH shape,
    /// so the quote matches what a signing wallet would pay to within a
    /// few sats.
    pub fn quote_send_transaction(&self, to: &str, value: u64) -> Result<u64, Error> {
        let recipient = address::decode_recipient(to, self.network)?;
        let rate = self
            .blockchain
            .estimate_fee(1)?
            .max(FeeRate::default_min_relay_fee());

        TxBuilder::new(
            self.blockchain.as_ref(),
            &PlaceholderSigner,
            &self.script_pubkey,
        )
        .build(&recipient, value, rate)
        .map(|(_, fee)| fee)
    }
}
