// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Wallet configuration

use bitcoin::bip32::{ChildNumber, DerivationPath};
use bitcoin::Network;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Transport used to reach the Electrum server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plaintext TCP
    Tcp,
    /// TLS
    Ssl,
}

/// Configuration shared by a [`WalletManager`] and the accounts it hands out
///
/// ## Example
///
/// ```
/// use bwk::{Protocol, WalletConfig};
///
/// let config = WalletConfig {
///     protocol: Protocol::Ssl,
///     port: 50002,
///     ..Default::default()
/// };
/// assert_eq!(config.electrum_url(), "ssl://electrum.blockstream.info:50002");
/// ```
///
/// [`WalletManager`]: crate::wallet::WalletManager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Hostname of the Electrum server
    pub host: String,
    /// Port of the Electrum server
    pub port: u16,
    /// Transport to the Electrum server
    pub protocol: Protocol,
    /// Network the wallet operates on
    pub network: Network,
    /// Derivation purpose, 84 (native segwit, default) or 44. Addresses are
    /// encoded as P2WPKH for both values; 44 only changes the path.
    pub bip: u32,
    /// HTTP endpoint serving recommended fee tiers
    pub fee_endpoint: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            host: "electrum.blockstream.info".to_string(),
            port: 50001,
            protocol: Protocol::Tcp,
            network: Network::Bitcoin,
            bip: 84,
            fee_endpoint: "https://mempool.space/api/v1/fees/recommended".to_string(),
        }
    }
}

impl WalletConfig {
    /// Check the parts of the configuration that have a restricted domain
    pub fn validate(&self) -> Result<(), Error> {
        match self.bip {
            44 | 84 => Ok(()),
            other => Err(Error::UnsupportedBip(other)),
        }
    }

    /// The `tcp://host:port` or `ssl://host:port` URL of the Electrum server
    pub fn electrum_url(&self) -> String {
        let scheme = match self.protocol {
            Protocol::Tcp => "tcp",
            Protocol::Ssl => "ssl",
        };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// The `m/<purpose>'/0'` prefix account paths are appended to
    pub fn base_path(&self) -> DerivationPath {
        // `validate` restricts `bip` to 44 or 84, both well below the
        // hardened-index limit
        DerivationPath::from(vec![
            ChildNumber::Hardened { index: self.bip },
            ChildNumber::Hardened { index: 0 },
        ])
    }
}
