/*
 * Copyright (C) 2015-2022 IoT.bzh Company
 * Author: Fulup Ar Foll <fulup@iot.bzh>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
 * Reference:
 *   https://github.com/qca/open-plc-utils.git
 *   IEEE 1901-2010 (HomePlug AV FFT PHY/MAC)
 */

//! HomePlug AV key derivation (PBKDF1 style SHA-256 chain).
//!
//! A salted derivation hashes `passphrase || salt` then rehashes the digest
//! until 999 SHA-256 rounds have run. Without a salt the passphrase is padded
//! to 16 bytes and only 5 rounds run, which is the NID derivation shortcut.
//! Both round counts are protocol constants.

use sha2::{Digest, Sha256};

use crate::prelude::*;

/// Number of SHA-256 rounds applied for a given mode.
pub fn kdf_rounds(salted: bool) -> usize {
    if salted {
        HPAV_SALTED_ROUNDS
    } else {
        HPAV_NID_ROUNDS
    }
}

fn hash_rounds(secret: &[u8], rounds: usize) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::digest(secret).into();
    for _ in 1..rounds {
        digest = Sha256::digest(digest).into();
    }
    digest
}

/// Derives a 128 bit key from a passphrase. Passphrases longer than 64
/// bytes are silently cut.
pub fn derive_key(passphrase: &[u8], salt: Option<&[u8; HPAV_SALT_LEN]>) -> HpavKey {
    let passphrase = &passphrase[..passphrase.len().min(HPAV_PASSPHRASE_MAX)];

    let digest = match salt {
        Some(salt) => {
            let mut secret = Vec::with_capacity(passphrase.len() + HPAV_SALT_LEN);
            secret.extend_from_slice(passphrase);
            secret.extend_from_slice(salt);
            hash_rounds(&secret, kdf_rounds(true))
        }
        None => {
            let mut secret = [0u8; HPAV_NID_SECRET_LEN];
            let len = passphrase.len().min(HPAV_NID_SECRET_LEN);
            secret[..len].copy_from_slice(&passphrase[..len]);
            hash_rounds(&secret, kdf_rounds(false))
        }
    };

    let mut key: HpavKey = [0; HPAV_KEY_LEN];
    key.copy_from_slice(&digest[..HPAV_KEY_LEN]);
    key
}

/// Network Membership Key from an operator network password.
pub fn derive_nmk(passphrase: &str) -> HpavKey {
    derive_key(passphrase.as_bytes(), Some(&HPAV_SALT_NMK))
}

/// Device Access Key from the password printed on a device.
pub fn derive_dak(passphrase: &str) -> HpavKey {
    derive_key(passphrase.as_bytes(), Some(&HPAV_SALT_DAK))
}

// Network identifier of an AVLN: keep 52 bits of the NID mode digest of the
// NMK and place the security level in bits 52-53.
// https://github.com/qca/open-plc-utils/blob/master/key/HPAVKeyNID.c
pub fn derive_nid(nmk: &HpavKey, security_level: u8) -> HpavNid {
    let digest = derive_key(nmk, None);

    let mut nid: HpavNid = [0; 7];
    nid.copy_from_slice(&digest[..7]);
    nid[6] = (digest[6] >> 4) | ((security_level & 0x03) << 4);
    nid
}
