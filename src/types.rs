// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use bitcoin::{Address, OutPoint, Txid};

use serde::{Deserialize, Serialize};

/// Fee rate
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
// Internally stored as satoshi/vbyte
pub struct FeeRate(f32);

impl FeeRate {
    /// Create a new instance of [`FeeRate`] given a float fee rate in btc/kvbytes
    pub fn from_btc_per_kvb(btc_per_kvb: f32) -> Self {
        FeeRate(btc_per_kvb * 1e5)
    }

    /// Create a new instance of [`FeeRate`] given a float fee rate in satoshi/vbyte
    pub const fn from_sat_per_vb(sat_per_vb: f32) -> Self {
        FeeRate(sat_per_vb)
    }

    /// Create a new [`FeeRate`] with the default min relay fee value
    pub const fn default_min_relay_fee() -> Self {
        FeeRate(1.0)
    }

    /// Return the value as satoshi/vbyte
    pub fn as_sat_vb(&self) -> f32 {
        self.0
    }

    /// Calculate absolute fee in satoshis using size in virtual bytes, rounding up
    pub fn fee_vb(&self, vbytes: usize) -> u64 {
        (self.as_sat_vb() * vbytes as f32).ceil() as u64
    }

    /// Return the greater of the two rates
    pub fn max(self, other: FeeRate) -> FeeRate {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl std::default::Default for FeeRate {
    fn default() -> Self {
        FeeRate::default_min_relay_fee()
    }
}

/// Balance of an address, split by confirmation status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    /// Confirmed sats
    pub confirmed: u64,
    /// Unconfirmed sats; negative when mempool transactions spend from the address
    pub unconfirmed: i64,
}

/// An unspent output of the wallet's address, as reported by the backend
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnspentOutput {
    /// Location of the output
    pub outpoint: OutPoint,
    /// Value in sats
    pub value: u64,
}

/// One entry of an address' on-chain history
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Transaction id
    pub txid: Txid,
    /// Confirmation height; zero or negative for mempool transactions
    pub height: i32,
}

/// A transaction accepted for broadcast
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentTransaction {
    /// Transaction id, displayed big-endian
    pub txid: Txid,
    /// Fee paid (sats)
    pub fee: u64,
}

/// Direction of a transfer relative to the owning address
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    /// Value received by the owning address
    Incoming,
    /// Value paid to a foreign address
    Outgoing,
}

/// One transaction output relevant to the owning address
///
/// Change outputs are internal to the wallet and never reported as
/// transfers.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Transaction id of the parent transaction
    pub txid: Txid,
    /// Index of the output within the parent transaction
    pub vout: u32,
    /// Confirmation height, `0` while in the mempool
    pub height: u32,
    /// Value of the output (sats)
    pub value: u64,
    /// Direction relative to the owning address
    pub direction: TransferDirection,
    /// Fee of the parent transaction (sats). `None` when any input's
    /// previous output could not be fetched.
    pub fee: Option<u64>,
    /// Address of the output, when the script has an address form
    pub recipient: Option<Address>,
    /// The address this history belongs to
    pub owner: Address,
}

/// Filtering and pagination for [`get_transfers`]
///
/// `skip` applies at the transaction granularity, `limit` caps the record
/// count.
///
/// [`get_transfers`]: crate::wallet::Account::get_transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferQuery {
    /// Keep only records with this direction; `None` keeps both
    pub direction: Option<TransferDirection>,
    /// Maximum number of records returned
    pub limit: usize,
    /// Number of history transactions skipped before classification
    pub skip: usize,
}

impl Default for TransferQuery {
    fn default() -> Self {
        TransferQuery {
            direction: None,
            limit: 10,
            skip: 0,
        }
    }
}

/// Fee-rate tiers in sats/vbyte, as served by the configured HTTP endpoint
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRates {
    /// Rate targeting confirmation within the hour
    pub normal: u64,
    /// Rate targeting the next block
    pub fast: u64,
}
