// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Signers
//!
//! [`InputSigner`] is the seam between transaction assembly and key
//! material: the builder asks it for the witness of every input it
//! creates. [`AccountSigner`] produces real BIP-143 signatures;
//! [`PlaceholderSigner`] produces stand-in witnesses of canonical size so
//! that a watch-only account can measure virtual size without keys.
//!
//! The module also hosts the detached message signatures exposed by
//! accounts: deterministic ECDSA (RFC 6979, low-S) over the SHA-256 of the
//! message, serialized as base64 of the DER encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1::{ecdsa, Message, PublicKey, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{Amount, Script, Transaction, Witness};

use crate::error::Error;

/// Produces the witness for one P2WPKH input of an in-progress transaction
pub trait InputSigner {
    /// Witness for input `input_index` of `tx`, spending a previous output
    /// with the given script and value
    fn witness(
        &self,
        tx: &Transaction,
        input_index: usize,
        prev_script: &Script,
        prev_value: u64,
    ) -> Result<Witness, Error>;
}

/// BIP-143 signer backed by an account's derived key
pub struct AccountSigner<'a> {
    secret: &'a SecretKey,
    public: &'a PublicKey,
}

impl<'a> AccountSigner<'a> {
    pub fn new(secret: &'a SecretKey, public: &'a PublicKey) -> Self {
        AccountSigner { secret, public }
    }
}

impl InputSigner for AccountSigner<'_> {
    fn witness(
        &self,
        tx: &Transaction,
        input_index: usize,
        prev_script: &Script,
        prev_value: u64,
    ) -> Result<Witness, Error> {
        let mut cache = SighashCache::new(tx);
        let sighash = cache.p2wpkh_signature_hash(
            input_index,
            prev_script,
            Amount::from_sat(prev_value),
            EcdsaSighashType::All,
        )?;

        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(sighash.to_byte_array());
        let signature = secp.sign_ecdsa(&message, self.secret);

        let mut sig_bytes = signature.serialize_der().to_vec();
        sig_bytes.push(EcdsaSighashType::All as u8);

        let mut witness = Witness::new();
        witness.push(sig_bytes);
        witness.push(self.public.serialize());
        Ok(witness)
    }
}

/// Fills inputs with maximum-size stand-in witnesses
///
/// The transactions it "signs" are only ever measured, never broadcast.
pub struct PlaceholderSigner;

impl InputSigner for PlaceholderSigner {
    fn witness(
        &self,
        _tx: &Transaction,
        _input_index: usize,
        _prev_script: &Script,
        _prev_value: u64,
    ) -> Result<Witness, Error> {
        // worst-case low-S DER signature plus sighash flag, then the
        // compressed public key
        let mut witness = Witness::new();
        witness.push([0u8; 72]);
        witness.push([0u8; 33]);
        Ok(witness)
    }
}

/// Sign `message` with deterministic ECDSA over its SHA-256 digest
pub fn sign_message(secret: &SecretKey, message: &str) -> String {
    let secp = Secp256k1::signing_only();
    let digest = sha256::Hash::hash(message.as_bytes());
    let signature = secp.sign_ecdsa(&Message::from_digest(digest.to_byte_array()), secret);
    BASE64.encode(signature.serialize_der())
}

/// Check a signature produced by [`sign_message`]
///
/// Returns `false` for a well-formed signature that does not match;
/// [`Error::MalformedSignature`] when the input is not base64-encoded DER.
pub fn verify_message(public: &PublicKey, message: &str, signature: &str) -> Result<bool, Error> {
    let raw = BASE64
        .decode(signature)
        .map_err(|_| Error::MalformedSignature)?;
    let signature = ecdsa::Signature::from_der(&raw).map_err(|_| Error::MalformedSignature)?;

    let secp = Secp256k1::verification_only();
    let digest = sha256::Hash::hash(message.as_bytes());
    let message = Message::from_digest(digest.to_byte_array());
    Ok(secp.verify_ecdsa(&message, &signature, public).is_ok())
}
