// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Address encoding
//!
//! The wallet receives on P2WPKH only: every account address is the bech32
//! encoding of `hash160(pubkey)` with the network's human readable part.
//! Decoding the other direction is best effort and used by the transfer
//! history to label outputs of any standard script form.

use std::str::FromStr;

use bitcoin::secp256k1::PublicKey;
use bitcoin::{Address, CompressedPublicKey, Network, Script, ScriptBuf};

use crate::error::Error;

/// Encode the P2WPKH address of a compressed public key for the given network
pub fn p2wpkh_address(public_key: &PublicKey, network: Network) -> Address {
    Address::p2wpkh(&CompressedPublicKey(*public_key), network)
}

/// The `OP_0 <20-byte hash160>` output script paying to a compressed public key
pub fn p2wpkh_script(public_key: &PublicKey, network: Network) -> ScriptBuf {
    p2wpkh_address(public_key, network).script_pubkey()
}

/// Decode a recipient address, enforcing the configured network
pub fn decode_recipient(address: &str, network: Network) -> Result<Address, Error> {
    Address::from_str(address)
        .map_err(|_| Error::InvalidRecipient(address.to_string()))?
        .require_network(network)
        .map_err(|_| Error::InvalidRecipient(address.to_string()))
}

/// Best-effort mapping from an output script to an address
///
/// Covers the standard templates (P2PKH, P2SH, P2WPKH, P2WSH, P2TR).
/// Classification never fails: scripts without an address form yield `None`.
pub fn address_from_script(script: &Script, network: Network) -> Option<Address> {
    Address::from_script(script, network).ok()
}
