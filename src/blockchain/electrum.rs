// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Electrum
//!
//! This module defines an [`ElectrumBlockchain`] struct that wraps an
//! [`electrum_client::Client`] and implements [`Blockchain`] on top of the
//! `blockchain.scripthash.*` protocol methods.
//!
//! ## Example
//!
//! ```no_run
//! # use bwk::blockchain::ElectrumBlockchain;
//! let client = electrum_client::Client::new("ssl://electrum.blockstream.info:50002")?;
//! let blockchain = ElectrumBlockchain::from(client);
//! # Ok::<(), bwk::Error>(())
//! ```

#[allow(unused_imports)]
use log::{debug, error, info, trace};

use bitcoin::{OutPoint, Script, Transaction, Txid};

use electrum_client::{Client, ConfigBuilder, ElectrumApi};

use super::Blockchain;
use crate::config::WalletConfig;
use crate::error::Error;
use crate::types::{Balance, FeeRate, HistoryEntry, UnspentOutput};

// Seconds before an idle server call is abandoned
const DEFAULT_TIMEOUT: u8 = 30;

/// Wrapper over an Electrum client that implements the [`Blockchain`] trait
pub struct ElectrumBlockchain {
    client: Client,
}

impl std::convert::From<Client> for ElectrumBlockchain {
    fn from(client: Client) -> Self {
        ElectrumBlockchain { client }
    }
}

impl ElectrumBlockchain {
    /// Connect to the Electrum server named by `config`
    pub fn from_config(config: &WalletConfig) -> Result<Self, Error> {
        let url = config.electrum_url();
        debug!("connecting to electrum server at {}", url);

        let client_config = ConfigBuilder::new().timeout(Some(DEFAULT_TIMEOUT)).build();
        Ok(ElectrumBlockchain {
            client: Client::from_config(&url, client_config)?,
        })
    }
}

impl Blockchain for ElectrumBlockchain {
    fn get_balance(&self, script: &Script) -> Result<Balance, Error> {
        let res = self.client.script_get_balance(script)?;
        Ok(Balance {
            confirmed: res.confirmed,
            unconfirmed: res.unconfirmed,
        })
    }

    fn list_unspent(&self, script: &Script) -> Result<Vec<UnspentOutput>, Error> {
        Ok(self
            .client
            .script_list_unspent(script)?
            .into_iter()
            .map(|utxo| UnspentOutput {
                outpoint: OutPoint::new(utxo.tx_hash, utxo.tx_pos as u32),
                value: utxo.value,
            })
            .collect())
    }

    fn get_history(&self, script: &Script) -> Result<Vec<HistoryEntry>, Error> {
        let mut entries: Vec<HistoryEntry> = self
            .client
            .script_get_history(script)?
            .into_iter()
            .map(|entry| HistoryEntry {
                txid: entry.tx_hash,
                height: entry.height,
            })
            .collect();

        // Confirmed ascending, mempool (height <= 0) last; the sort is
        // stable so server order survives within a height.
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
        Ok(self.client.transaction_get(txid)?)
    }

    fn estimate_fee(&self, target: usize) -> Result<FeeRate, Error> {
        // `blockchain.estimatefee` answers in BTC/kvB, -1 when the server
        // has no estimate; callers clamp to the min relay rate.
        Ok(FeeRate::from_btc_per_kvb(
            self.client.estimate_fee(target)? as f32
        ))
    }

    fn broadcast(&self, tx: &Transaction) -> Result<Txid, Error> {
        let txid = self.client.transaction_broadcast(tx)?;
        info!("broadcast transaction {}", txid);
        Ok(txid)
    }
}
