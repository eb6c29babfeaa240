// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Transfer history
//!
//! Rebuilds an address' transfer history from its raw on-chain history.
//! Every output of every history transaction is classified relative to the
//! owning address: paid to it by a third party (incoming), paid by it to a
//! third party (outgoing), or returned to it by itself (change, which is
//! internal and dropped). Fees are recovered by resolving each input's
//! previous output; when a parent transaction cannot be fetched the fee is
//! reported as unknown rather than failing the whole call, because partial
//! history is strictly more useful than none.

use std::collections::HashMap;
use std::sync::Arc;

#[allow(unused_imports)]
use log::{debug, trace};

use bitcoin::{Address, Network, Script, Transaction, Txid};

use crate::address;
use crate::blockchain::Blockchain;
use crate::error::Error;
use crate::types::{TransferDirection, TransferQuery, TransferRecord};

// Per-call cache so a transaction referenced by several inputs (or
// appearing both in the history and as a parent) is fetched once
struct TxCache<'a> {
    client: &'a dyn Blockchain,
    cache: HashMap<Txid, Arc<Transaction>>,
}

impl TxCache<'_> {
    fn get(&mut self, txid: &Txid) -> Result<Arc<Transaction>, Error> {
        if let Some(tx) = self.cache.get(txid) {
            return Ok(Arc::clone(tx));
        }
        let tx = Arc::new(self.client.get_tx(txid)?);
        self.cache.insert(*txid, Arc::clone(&tx));
        Ok(tx)
    }
}

/// Classifies the history of one address
pub struct TransferEngine<'a> {
    client: &'a dyn Blockchain,
    owner: &'a Address,
    own_script: &'a Script,
    network: Network,
}

impl<'a> TransferEngine<'a> {
    pub fn new(
        client: &'a dyn Blockchain,
        owner: &'a Address,
        own_script: &'a Script,
        network: Network,
    ) -> Self {
        TransferEngine {
            client,
            owner,
            own_script,
            network,
        }
    }

    /// Transfer records of the owning address, paginated per `query`
    ///
    /// `skip` drops whole history transactions; `limit` caps the records.
    pub fn get_transfers(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>, Error> {
        let mut records = Vec::new();
        if query.limit == 0 {
            return Ok(records);
        }

        let history = self.client.get_history(self.own_script)?;
        trace!("classifying {} history entries", history.len());
        let mut cache = TxCache {
            client: self.client,
            cache: HashMap::new(),
        };

        'history: for entry in history.into_iter().skip(query.skip) {
            let tx = cache.get(&entry.txid)?;

            let mut total_input: u64 = 0;
            let mut missing_input = false;
            let mut is_outgoing = false;
            for txin in &tx.input {
                if txin.previous_output.is_null() {
                    // coinbase input, nothing to resolve
                    continue;
                }
                let parent = match cache.get(&txin.previous_output.txid) {
                    Ok(parent) => parent,
                    Err(err) => {
                        debug!(
                            "cannot resolve input {} of {}: {}",
                            txin.previous_output, entry.txid, err
                        );
                        missing_input = true;
                        continue;
                    }
                };
                match parent.output.get(txin.previous_output.vout as usize) {
                    Some(prev_out) => {
                        total_input += prev_out.value.to_sat();
                        if prev_out.script_pubkey.as_script() == self.own_script {
                            is_outgoing = true;
                        }
                    }
                    None => missing_input = true,
                }
            }

            let total_output: u64 = tx.output.iter().map(|out| out.value.to_sat()).sum();
            let fee = if missing_input || total_input == 0 {
                None
            } else {
                Some(total_input.saturating_sub(total_output))
            };

            for (vout, out) in tx.output.iter().enumerate() {
                let to_self = out.script_pubkey.as_script() == self.own_script;
                let direction = match (to_self, is_outgoing) {
                    (true, false) => TransferDirection::Incoming,
                    (false, true) => TransferDirection::Outgoing,
                    // change back to self, or an output unrelated to us
                    _ => continue,
                };
                if let Some(wanted) = query.direction {
                    if wanted != direction {
                        continue;
                    }
                }

                records.push(TransferRecord {
                    txid: entry.txid,
                    vout: vout as u32,
                    height: entry.height.max(0) as u32,
                    value: out.value.to_sat(),
                    direction,
                    fee,
                    recipient: address::address_from_script(&out.script_pubkey, self.network),
                    owner: self.owner.clone(),
                });
                if records.len() == query.limit {
                    break 'history;
                }
            }
        }

        Ok(records)
    }
}
