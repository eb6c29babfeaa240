// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! A non-custodial Bitcoin wallet engine.
//!
//! Given a BIP-39 seed phrase (or raw seed bytes) and a network
//! configuration, this library derives hierarchical deterministic accounts
//! (BIP-32/BIP-84), queries chain state from an Electrum server, and
//! constructs, signs and broadcasts P2WPKH transactions. Each account also
//! exposes a transfer history reconstructed from the on-chain history of
//! its address.
//!
//! ## Example
//!
//! ```no_run
//! use bwk::{WalletConfig, WalletManager};
//!
//! # fn main() -> Result<(), bwk::Error> {
//! let config = WalletConfig::default();
//! let manager = WalletManager::from_mnemonic(
//!     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
//!     config,
//! )?;
//!
//! let account = manager.get_account(0)?;
//! println!("receive at {}", account.get_address()?);
//! # Ok(())
//! # }
//! ```

pub use bitcoin;
pub use electrum_client;

pub mod address;
pub mod blockchain;
pub mod config;
pub(crate) mod error;
pub mod keys;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{Protocol, WalletConfig};
pub use error::Error;
pub use types::*;
pub use wallet::{Account, WalletManager, WatchOnlyAccount};
