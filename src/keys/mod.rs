// Bitcoin Wallet Kit
//
// Copyright (c) 2026 Bitcoin Wallet Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Seed handling and hierarchical key derivation
//!
//! A [`KeyRing`] owns the master extended key derived from a BIP-39
//! mnemonic or from raw seed bytes, and walks BIP-32 paths to produce the
//! per-account [`AccountKey`]s. Secret material (the 64-byte seed, the
//! serialized master key and every derived private key) lives in buffers
//! that are zeroed when dropped; the raw seed itself is discarded as soon
//! as the master key exists.

use std::fmt;
use std::str::FromStr;

use bip39::{Language, Mnemonic};
use bitcoin::bip32::{ChildNumber, DerivationPath, Fingerprint, Xpriv};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use bitcoin::Network;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::Error;

/// Whether the string is a valid BIP-39 English mnemonic
///
/// Checks the word count (12, 15, 18, 21 or 24), membership of every word
/// in the English word list and the checksum bits. Never errors.
pub fn valid_mnemonic(mnemonic: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, mnemonic).is_ok()
}

/// Generate a random 12-word BIP-39 English mnemonic
pub fn random_mnemonic() -> String {
    let mut entropy = Zeroizing::new([0u8; 16]);
    rand::thread_rng().fill_bytes(entropy.as_mut());
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_ref())
        .expect("16 bytes is a valid bip39 entropy length");
    mnemonic.to_string()
}

/// Derive the 64-byte seed of a mnemonic
///
/// PBKDF2-HMAC-SHA512 with 2048 iterations and salt `"mnemonic" ||
/// passphrase`, per BIP-39.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>, Error> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic)
        .map_err(|_| Error::InvalidMnemonic)?;
    Ok(Zeroizing::new(mnemonic.to_seed_normalized(passphrase)))
}

/// Join a caller-supplied path tail to the configured base path
///
/// A tail starting with `m/` (or equal to `m`) is treated as an absolute
/// path and used verbatim; a leading `/` is accepted and means
/// append-to-base, like no prefix at all.
pub fn assemble_path(base: &DerivationPath, tail: &str) -> Result<DerivationPath, Error> {
    let trimmed = tail.trim().trim_start_matches('/');
    let parsed = DerivationPath::from_str(trimmed)
        .map_err(|_| Error::InvalidPath(tail.to_string()))?;
    if trimmed == "m" || trimmed.starts_with("m/") {
        Ok(parsed)
    } else {
        Ok(base.extend(&parsed))
    }
}

/// Render a derivation path with the master notation, e.g. `m/84'/0'/0'/0/0`
pub fn absolute_path_string(path: &DerivationPath) -> String {
    let mut rendered = String::from("m");
    for child in path.as_ref() {
        rendered.push('/');
        rendered.push_str(&child.to_string());
    }
    rendered
}

// The BIP-32 serialization of an extended private key: one buffer holding
// both the key and the chain code, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct XprvBytes([u8; 78]);

impl fmt::Debug for XprvBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XprvBytes([REDACTED])")
    }
}

/// The master extended key of a seed, scoped to one network
///
/// Construction consumes the seed; only the serialized master key (private
/// key plus chain code) is retained, and it is zeroed when the ring is
/// dropped.
pub struct KeyRing {
    network: Network,
    master: XprvBytes,
    mnemonic: Option<Zeroizing<String>>,
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("network", &self.network)
            .field("master", &self.master)
            .finish_non_exhaustive()
    }
}

impl KeyRing {
    /// Build a key ring from a BIP-39 mnemonic (empty passphrase)
    pub fn from_mnemonic(mnemonic: &str, network: Network) -> Result<Self, Error> {
        let seed = mnemonic_to_seed(mnemonic, "")?;
        let mut ring = Self::from_seed(seed.as_ref(), network)?;
        ring.mnemonic = Some(Zeroizing::new(mnemonic.to_string()));
        Ok(ring)
    }

    /// Build a key ring from raw seed bytes
    ///
    /// The caller keeps ownership of `seed` and is responsible for wiping
    /// its own copy.
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self, Error> {
        let master = Xpriv::new_master(network, seed)?;
        Ok(KeyRing {
            network,
            master: XprvBytes(master.encode()),
            mnemonic: None,
        })
    }

    /// The mnemonic this ring was built from, if any
    pub fn seed_phrase(&self) -> Option<&str> {
        self.mnemonic.as_ref().map(|words| words.as_str())
    }

    /// The network the ring derives keys for
    pub fn network(&self) -> Network {
        self.network
    }

    /// Walk `path` from the master key and return the derived account key
    ///
    /// Fails with [`Error::Bip32`] in the statistically negligible case of
    /// a derived scalar outside the curve order.
    pub fn derive(&self, path: &DerivationPath) -> Result<AccountKey, Error> {
        let secp = Secp256k1::new();
        let master = Xpriv::decode(&self.master.0)?;
        let child = master.derive_priv(&secp, path)?;
        let public_key = PublicKey::from_secret_key(&secp, &child.private_key);
        Ok(AccountKey {
            path: path.clone(),
            depth: child.depth,
            parent_fingerprint: child.parent_fingerprint,
            child_number: child.child_number,
            public_key,
            secret: XprvBytes(child.encode()),
        })
    }
}

/// A key derived for one account, with its position in the tree
pub struct AccountKey {
    path: DerivationPath,
    depth: u8,
    parent_fingerprint: Fingerprint,
    child_number: ChildNumber,
    public_key: PublicKey,
    secret: XprvBytes,
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountKey")
            .field("path", &absolute_path_string(&self.path))
            .field("public_key", &self.public_key)
            .field("secret", &self.secret)
            .finish()
    }
}

impl AccountKey {
    /// The absolute derivation path of this key
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Depth in the derivation tree
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Fingerprint of the parent key
    pub fn parent_fingerprint(&self) -> Fingerprint {
        self.parent_fingerprint
    }

    /// The index of the final path component
    pub fn index(&self) -> u32 {
        match self.child_number {
            ChildNumber::Normal { index } | ChildNumber::Hardened { index } => index,
        }
    }

    /// The compressed public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Reconstruct the secret key for signing
    pub fn secret_key(&self) -> Result<SecretKey, Error> {
        Ok(Xpriv::decode(&self.secret.0)?.private_key)
    }

    /// Copy the key material into a caller-owned [`KeyPair`]
    pub fn key_pair(&self) -> Result<KeyPair, Error> {
        let secret = self.secret_key()?;
        Ok(KeyPair {
            public_key: self.public_key.serialize(),
            private_key: Zeroizing::new(secret.secret_bytes()),
        })
    }
}

/// An account's raw key material
///
/// The private half is zeroed when the pair is dropped.
pub struct KeyPair {
    /// Compressed SEC1 encoding, 33 bytes
    pub public_key: [u8; 33],
    private_key: Zeroizing<[u8; 32]>,
}

impl KeyPair {
    /// The 32-byte private key
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
