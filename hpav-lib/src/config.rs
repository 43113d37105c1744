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

use crate::prelude::*;
use serde::{Deserialize, Deserializer};

pub const ETHER_ADDR_LEN: usize = 6;
pub type HpavMac = [u8; ETHER_ADDR_LEN];
pub type HpavNid = [u8; 7];
pub type HpavKey = [u8; 16];
pub type HpavOui = [u8; 3];

pub const ETHER_HDR_LEN: usize = 14; // [ETH_HLEN]
pub const ETHER_MIN_LEN: usize = 60; // [ETH_ZLEN] without FCS
pub const ETHER_MAX_LEN: usize = 1518; // [ETH_FRAME_LEN + FCS]
pub const VLAN_TAG_LEN: usize = 4;

pub const ETH_P_HPAV: u16 = 0x88E1; // [ETHERTYPE_HOMEPLUG_AV]
pub const ETH_P_HP10: u16 = 0x887B; // [ETHERTYPE_HOMEPLUG]
pub const ETH_P_8021Q: u16 = 0x8100; // [ETHERTYPE_VLAN]

pub const HPAV_VERSION_1_0: u8 = 0x00;
pub const HPAV_VERSION_1_1: u8 = 0x01;
pub const HPAV_HDR_LEN: usize = 3; // mmver + mmtype
pub const HPAV_VENDOR_HDR_LEN: usize = 3; // oui
pub const HPAV_PUBLIC_HDR_LEN: usize = 2; // fmi + fmsn

pub const HP10_HDR_LEN: usize = 1; // mmecount
pub const HP10_ENTRY_HDR_LEN: usize = 2; // mmetype/version + length
pub const HP10_MAX_ENTRIES: u8 = 0x7F;

// Intellon/Qualcomm vendor namespace
pub const INTELLON_OUI: HpavOui = [0x00, 0xB0, 0x52];
pub const INTELLON_LOCAL_ADDR: HpavMac = [0x00, 0xB0, 0x52, 0x00, 0x00, 0x01];
pub const BROADCAST_ADDR: HpavMac = [0xFF; ETHER_ADDR_LEN];
pub const NULL_ADDR: HpavMac = [0x00; ETHER_ADDR_LEN];

// Key derivation
pub const HPAV_SALT_LEN: usize = 8;
pub const HPAV_SALT_NMK: [u8; HPAV_SALT_LEN] = [0x08, 0x85, 0x6D, 0xAF, 0x7C, 0xF5, 0x81, 0x85];
pub const HPAV_SALT_DAK: [u8; HPAV_SALT_LEN] = [0x08, 0x85, 0x6D, 0xAF, 0x7C, 0xF5, 0x81, 0x86];
pub const HPAV_PASSPHRASE_MAX: usize = 64;
pub const HPAV_NID_SECRET_LEN: usize = 16;
pub const HPAV_SALTED_ROUNDS: usize = 999;
pub const HPAV_NID_ROUNDS: usize = 5;
pub const HPAV_KEY_LEN: usize = 16;
pub const HPAV_SECURITY_SIMPLE: u8 = 0;
pub const HPAV_SECURITY_SECURE: u8 = 1;

// PHY frame control and beacon
pub const HPAV_FC_LEN: usize = 16;
pub const HPAV_BEACON_PAYLOAD_LEN: usize = 136;

// vendor payload limits
pub const HPAV_MODULE_CHUNK_MAX: usize = 1024; // [write module data]
pub const HPAV_LOOPBACK_MAX_SECS: u8 = 60;
pub const HPAV_HASH_KEY_LEN: usize = 384;

// convert an hexadecimal string "xx:xx:...:xx" into an &[u8] slice
pub fn hexa_to_byte(input: &str, buffer: &mut [u8]) -> FrameResult<()> {
    if buffer.is_empty() || input.len() != 3 * buffer.len() - 1 {
        return Err(FrameError::invalid(
            "hexa-string",
            format!("invalid len {}!=3*{}-1", input.len(), buffer.len()),
        ));
    }

    for (idx, hexa) in input.split(':').enumerate() {
        if idx >= buffer.len() || hexa.len() != 2 {
            return Err(FrameError::invalid("hexa-string", format!("bad token '{}'", hexa)));
        }
        buffer[idx] = u8::from_str_radix(hexa, 16)
            .map_err(|_| FrameError::invalid("hexa-string", format!("not hexa '{}'", hexa)))?;
    }
    Ok(())
}

pub fn parse_mac(input: &str) -> FrameResult<HpavMac> {
    let mut mac: HpavMac = [0; ETHER_ADDR_LEN];
    hexa_to_byte(input, &mut mac)?;
    Ok(mac)
}

pub fn fmt_mac(mac: &HpavMac) -> String {
    mac.iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<String>>()
        .join(":")
}

fn default_timeout() -> u64 {
    1000
}

fn mac_from_str<'de, D>(deserializer: D) -> Result<Option<HpavMac>, D::Error>
where
    D: Deserializer<'de>,
{
    let text: Option<String> = Option::deserialize(deserializer)?;
    match text {
        None => Ok(None),
        Some(value) => parse_mac(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Settings of a link between the codec and a capture interface.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub iface: String,
    #[serde(default, deserialize_with = "mac_from_str")]
    pub srcmac: Option<HpavMac>,
    #[serde(default, deserialize_with = "mac_from_str")]
    pub dstmac: Option<HpavMac>,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

impl LinkConfig {
    pub fn new(iface: &str) -> Self {
        LinkConfig {
            iface: iface.to_string(),
            srcmac: None,
            dstmac: None,
            timeout_ms: default_timeout(),
        }
    }
}
