// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Blockchain backends
//!
//! The wallet consumes chain state through the narrow [`Blockchain`] trait;
//! [`ElectrumBlockchain`] is the bundled implementation. Connection
//! lifecycle and retries live below this interface: the wallet treats every
//! call as potentially failing with the transport's error and never retries
//! on its own.

use bitcoin::{Script, Transaction, Txid};

use crate::error::Error;
use crate::types::{Balance, FeeRate, HistoryEntry, UnspentOutput};

pub mod electrum;
pub mod fees;

pub use self::electrum::ElectrumBlockchain;

/// Chain index operations the wallet reads from and broadcasts through
///
/// Methods take the output script of the wallet's address; implementations
/// own whatever address or script-hash mapping their protocol requires.
pub trait Blockchain: Send + Sync {
    /// Confirmed and unconfirmed balance of a script
    fn get_balance(&self, script: &Script) -> Result<Balance, Error>;

    /// Unspent outputs of a script, in server order
    fn list_unspent(&self, script: &Script) -> Result<Vec<UnspentOutput>, Error>;

    /// On-chain history of a script, ordered by height ascending with
    /// mempool entries last
    fn get_history(&self, script: &Script) -> Result<Vec<HistoryEntry>, Error>;

    /// Fetch a full transaction by id
    fn get_tx(&self, txid: &Txid) -> Result<Transaction, Error>;

    /// Estimated fee rate to confirm within `target` blocks
    ///
    /// May be negative when the backend has no estimate; callers clamp.
    fn estimate_fee(&self, target: usize) -> Result<FeeRate, Error>;

    /// Broadcast a transaction, returning its txid
    fn broadcast(&self, tx: &Transaction) -> Result<Txid, Error>;
}
