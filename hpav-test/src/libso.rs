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

//! Shared fixtures for the hpav integration tests.

use std::sync::Once;

use hpav::prelude::*;

pub const HOST_MAC: HpavMac = [0x02, 0x00, 0x5E, 0x10, 0x00, 0x01];
pub const PLC_MAC: HpavMac = [0x00, 0xB0, 0x52, 0x12, 0x34, 0x56];
pub const TEST_IFACE: &str = "lo-hpav";

static LOGGER: Once = Once::new();

// RUST_LOG=debug cargo test to see the link traces
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Loopback link bound to a private codec, so registry overrides never
/// leak between tests.
pub fn loopback_link(timeout_ms: u64) -> FrameLink<LoopbackTransport> {
    init_logger();
    let mut config = LinkConfig::new(TEST_IFACE);
    config.timeout_ms = timeout_ms;
    FrameLink::new(
        LoopbackTransport::new(TEST_IFACE, HOST_MAC),
        FrameCodec::new(),
        config,
    )
}

pub fn link_from_json(jconf: &str) -> Result<FrameLink<LoopbackTransport>, serde_json::Error> {
    init_logger();
    let config: LinkConfig = serde_json::from_str(jconf)?;
    let transport = LoopbackTransport::new(&config.iface, HOST_MAC);
    Ok(FrameLink::new(transport, FrameCodec::new(), config))
}

pub fn params_from_json(jparams: &str) -> Result<MmParams, serde_json::Error> {
    serde_json::from_str::<MmParams>(jparams)
}

pub fn ether_header(dhost: &HpavMac, shost: &HpavMac, ether_type: u16) -> Vec<u8> {
    let mut frame = Vec::with_capacity(ETHER_MIN_LEN);
    frame.extend_from_slice(dhost);
    frame.extend_from_slice(shost);
    frame.extend_from_slice(&ether_type.to_be_bytes());
    frame
}

/// Inserts an 802.1Q tag after the source address.
pub fn vlan_tag(frame: &[u8], vid: u16) -> Vec<u8> {
    let mut tagged = Vec::with_capacity(frame.len() + VLAN_TAG_LEN);
    tagged.extend_from_slice(&frame[..2 * ETHER_ADDR_LEN]);
    tagged.extend_from_slice(&ETH_P_8021Q.to_be_bytes());
    tagged.extend_from_slice(&(vid & 0x0FFF).to_be_bytes());
    tagged.extend_from_slice(&frame[2 * ETHER_ADDR_LEN..]);
    tagged
}

/// HomePlug 1.0 entry as (mmetype, version, data).
pub struct Hp10Raw<'a> {
    pub mmetype: u8,
    pub version: u8,
    pub data: &'a [u8],
}

pub fn hp10_frame(shost: &HpavMac, entries: &[Hp10Raw]) -> Vec<u8> {
    let mut frame = ether_header(&BROADCAST_ADDR, shost, ETH_P_HP10);
    frame.push(entries.len() as u8 & HP10_MAX_ENTRIES);
    for entry in entries {
        frame.push((entry.version << 5) | (entry.mmetype & 0x1F));
        frame.push(entry.data.len() as u8);
        frame.extend_from_slice(entry.data);
    }
    if frame.len() < ETHER_MIN_LEN {
        frame.resize(ETHER_MIN_LEN, 0);
    }
    frame
}

/// Vendor frame with the Intellon OUI, body copied as is.
pub fn vendor_frame(mmtype: u16, body: &[u8]) -> Vec<u8> {
    let mut frame = ether_header(&HOST_MAC, &PLC_MAC, ETH_P_HPAV);
    frame.push(HPAV_VERSION_1_0);
    frame.extend_from_slice(&mmtype.to_le_bytes());
    frame.extend_from_slice(&INTELLON_OUI);
    frame.extend_from_slice(body);
    if frame.len() < ETHER_MIN_LEN {
        frame.resize(ETHER_MIN_LEN, 0);
    }
    frame
}

pub fn hexdump(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<String>>()
        .join(" ")
}
