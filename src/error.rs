// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

use std::fmt;

/// Errors that can be returned by the wallet engine
#[derive(Debug)]
pub enum Error {
    /// Generic error
    Generic(String),
    /// The mnemonic failed BIP-39 validation
    InvalidMnemonic,
    /// The derivation path does not conform to BIP-32 syntax
    InvalidPath(String),
    /// The configured BIP purpose is not one of 44 or 84
    UnsupportedBip(u32),
    /// The recipient address cannot be decoded for the configured network
    InvalidRecipient(String),
    /// Output created is under the dust limit, 546 satoshis
    BelowDustLimit(u64),
    /// The source address has no unspent outputs
    NoUnspentOutputs,
    /// Wallet's UTXO set is not enough to cover recipient's requested amount plus fee
    InsufficientBalance {
        /// Sats needed for the transaction
        needed: u64,
        /// Sats available for spending
        available: u64,
    },
    /// The signature string is not valid base64-encoded DER
    MalformedSignature,
    /// The operation is permanently unsupported by this wallet
    UnsupportedOperation(&'static str),
    /// The account has been disposed
    DisposedAccount,
    /// The wallet manager has been disposed
    DisposedWallet,

    /// BIP32 error
    Bip32(bitcoin::bip32::Error),
    /// Secp256k1 error
    Secp256k1(bitcoin::secp256k1::Error),
    /// Segwit sighash computation error
    Sighash(bitcoin::sighash::P2wpkhError),
    /// JSON error
    Json(serde_json::Error),
    /// IO error
    Io(std::io::Error),
    /// Electrum client error
    Electrum(electrum_client::Error),
    /// HTTP client error
    Http(Box<ureq::Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(err) => write!(f, "Generic error: {}", err),
            Self::InvalidMnemonic => write!(f, "Invalid BIP-39 mnemonic"),
            Self::InvalidPath(path) => write!(f, "Invalid derivation path: {}", path),
            Self::UnsupportedBip(bip) => write!(f, "Unsupported BIP purpose: {}", bip),
            Self::InvalidRecipient(addr) => write!(f, "Invalid recipient address: {}", addr),
            Self::BelowDustLimit(value) => {
                write!(f, "Output of {} sat is below the dust limit", value)
            }
            Self::NoUnspentOutputs => write!(f, "No unspent outputs for the source address"),
            Self::InsufficientBalance { needed, available } => write!(
                f,
                "Insufficient balance: {} sat available of {} sat needed",
                available, needed
            ),
            Self::MalformedSignature => write!(f, "Signature is not valid base64-encoded DER"),
            Self::UnsupportedOperation(name) => write!(f, "Operation not supported: {}", name),
            Self::DisposedAccount => write!(f, "Account has been disposed"),
            Self::DisposedWallet => write!(f, "Wallet has been disposed"),
            Self::Bip32(err) => write!(f, "BIP32 error: {}", err),
            Self::Secp256k1(err) => write!(f, "Secp256k1 error: {}", err),
            Self::Sighash(err) => write!(f, "Sighash error: {}", err),
            Self::Json(err) => write!(f, "JSON error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Electrum(err) => write!(f, "Electrum client error: {}", err),
            Self::Http(err) => write!(f, "HTTP client error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! impl_error {
    ( $from:ty, $to:ident ) => {
        impl std::convert::From<$from> for Error {
            fn from(err: $from) -> Self {
                Error::$to(err)
            }
        }
    };
}

impl_error!(bitcoin::bip32::Error, Bip32);
impl_error!(bitcoin::secp256k1::Error, Secp256k1);
impl_error!(bitcoin::sighash::P2wpkhError, Sighash);
impl_error!(serde_json::Error, Json);
impl_error!(std::io::Error, Io);
impl_error!(electrum_client::Error, Electrum);

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Error::Http(Box::new(err))
    }
}
