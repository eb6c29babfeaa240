// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Fee-rate tiers by way of an HTTP endpoint
//!
//! Maps the mempool.space-style `{ fastestFee, hourFee, ... }` payload to
//! the wallet's `{ normal, fast }` tiers. Errors propagate unchanged; the
//! wallet performs no retries.

#[allow(unused_imports)]
use log::{debug, trace};

use serde::Deserialize;
use ureq::Agent;

use crate::error::Error;
use crate::types::FeeRates;

#[derive(Debug, Deserialize)]
struct RecommendedFees {
    #[serde(rename = "fastestFee")]
    fastest_fee: u64,
    #[serde(rename = "hourFee")]
    hour_fee: u64,
}

/// Blocking client for a recommended-fees endpoint
#[derive(Debug, Clone)]
pub struct FeeTierClient {
    url: String,
    agent: Agent,
}

impl FeeTierClient {
    /// Create a client for the given endpoint URL
    pub fn new(url: &str) -> Self {
        FeeTierClient {
            url: url.to_string(),
            agent: Agent::new(),
        }
    }

    /// Fetch the current tiers in sats/vbyte
    pub fn fee_rates(&self) -> Result<FeeRates, Error> {
        trace!("fetching fee tiers from {}", self.url);
        let fees: RecommendedFees = self.agent.get(&self.url).call()?.into_json()?;
        Ok(FeeRates {
            normal: fees.hour_fee,
            fast: fees.fastest_fee,
        })
    }
}
