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

//! MM type registries: one table per protocol family, keyed by exact code.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::prelude::*;

pub type BuildHook = Arc<dyn Fn(&mut FrameWriter, &MmParams) -> FrameResult<()> + Send + Sync>;
pub type ParseHook =
    Arc<dyn Fn(&[u8], &EtherHeader) -> FrameResult<(MmPayload, usize)> + Send + Sync>;

/// Outgoing side of a registry entry.
#[derive(Clone)]
pub enum BuildOp {
    /// not buildable, the frame carries headers only
    Absent,
    /// request without payload
    Empty,
    Encode(MmKind),
    Custom(BuildHook),
}

/// Incoming side of a registry entry.
#[derive(Clone)]
pub enum ParseOp {
    /// recognised, not decoded further
    Absent,
    Decode(MmKind),
    Custom(ParseHook),
}

impl BuildOp {
    pub fn is_absent(&self) -> bool {
        matches!(self, BuildOp::Absent)
    }

    pub fn run(&self, writer: &mut FrameWriter, params: &MmParams) -> FrameResult<()> {
        match self {
            BuildOp::Absent | BuildOp::Empty => Ok(()),
            BuildOp::Encode(kind) => kind.build(writer, params),
            BuildOp::Custom(hook) => hook(writer, params),
        }
    }
}

impl ParseOp {
    pub fn is_absent(&self) -> bool {
        matches!(self, ParseOp::Absent)
    }

    /// None when the entry has no parser.
    pub fn run(&self, data: &[u8], header: &EtherHeader) -> Option<FrameResult<(MmPayload, usize)>> {
        match self {
            ParseOp::Absent => None,
            ParseOp::Decode(kind) => Some(kind.decode(data)),
            ParseOp::Custom(hook) => Some(hook(data, header)),
        }
    }
}

impl fmt::Debug for BuildOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOp::Absent => fmt.write_str("Absent"),
            BuildOp::Empty => fmt.write_str("Empty"),
            BuildOp::Encode(kind) => write!(fmt, "Encode({:?})", kind),
            BuildOp::Custom(_) => fmt.write_str("Custom"),
        }
    }
}

impl fmt::Debug for ParseOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOp::Absent => fmt.write_str("Absent"),
            ParseOp::Decode(kind) => write!(fmt, "Decode({:?})", kind),
            ParseOp::Custom(_) => fmt.write_str("Custom"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FrameOps {
    pub mmtype: u16,
    pub desc: &'static str,
    pub build: BuildOp,
    pub parse: ParseOp,
}

impl fmt::Display for FrameOps {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!(
            "FrameOps:{{ mmtype:0x{:04X}, desc:'{}', build:{:?}, parse:{:?} }}",
            self.mmtype, self.desc, self.build, self.parse
        );
        fmt.pad(&text)
    }
}

pub fn mm_category(mmtype: u16) -> MmCategory {
    MmCategory::from_mmtype(mmtype)
}

pub fn mm_subtype(mmtype: u16) -> MmSubtype {
    MmSubtype::from_mmtype(mmtype)
}

/// Header version byte: vendor messages stay on 1.0.
pub fn mm_version(mmtype: u16) -> u8 {
    match mm_category(mmtype) {
        MmCategory::Vendor => HPAV_VERSION_1_0,
        _ => HPAV_VERSION_1_1,
    }
}

#[derive(Clone, Copy)]
enum Ops {
    Desc,
    Empty,
    Build,
    Parse,
    Both,
}

#[rustfmt::skip]
const HPAV_OPS: &[(u16, &str, Ops)] = &[
    (0x0014, "Central Coordination Discover List Request", Ops::Empty),
    (0x0015, "Central Coordination Discover List Confirm", Ops::Parse),
    (0x6004, "Encrypted Payload Indicate", Ops::Parse),
    (0x6005, "Encrypted Payload Response", Ops::Parse),
    (0x6008, "Set Key Request", Ops::Both),
    (0x6009, "Set Key Confirm", Ops::Parse),
    (0x600C, "Get Key Request", Ops::Parse),
    (0x600D, "Get Key Confirm", Ops::Parse),
    (0x6020, "Get Bridge Infos Request", Ops::Empty),
    (0x6021, "Get Bridge Infos Confirm", Ops::Parse),
    (0x6038, "Get Network Infos Request", Ops::Empty),
    (0x6039, "Get Network Infos Confirm", Ops::Parse),
    (0x6046, "MME Error Indicate", Ops::Parse),
    (0x6048, "Get Network Stats Request", Ops::Empty),
    (0x6049, "Get Network Stats Confirm", Ops::Parse),
    (0xA000, "Get Device/SW Version Request", Ops::Empty),
    (0xA001, "Get Device/SW Version Confirm", Ops::Parse),
    (0xA004, "Write MAC Memory Request", Ops::Both),
    (0xA005, "Write MAC Memory Confirm", Ops::Parse),
    (0xA008, "Read MAC Memory Request", Ops::Both),
    (0xA009, "Read MAC Memory Confirm", Ops::Parse),
    (0xA00C, "Start MAC Request", Ops::Both),
    (0xA00D, "Start MAC Confirm", Ops::Parse),
    (0xA010, "Get NVM parameters Request", Ops::Empty),
    (0xA011, "Get NVM parameters Confirm", Ops::Parse),
    (0xA01C, "Reset Device Request", Ops::Empty),
    (0xA01D, "Reset Device Confirm", Ops::Parse),
    (0xA020, "Write Module Data Request", Ops::Both),
    (0xA021, "Write Module Data Confirm", Ops::Parse),
    (0xA022, "Write Module Data Indicate", Ops::Parse),
    (0xA024, "Read Module Data Request", Ops::Both),
    (0xA025, "Read Module Data Confirm", Ops::Parse),
    (0xA028, "Write Module Data to NVM Request", Ops::Both),
    (0xA029, "Write Module Data to NVM Confirm", Ops::Parse),
    (0xA02C, "Get Watchdog Report Request", Ops::Build),
    (0xA02E, "Get Watchdog Report Indicate", Ops::Parse),
    (0xA030, "Get Link Statistics Request", Ops::Build),
    (0xA031, "Get Link Statistics Confirm", Ops::Parse),
    (0xA034, "Sniffer Mode Request", Ops::Both),
    (0xA035, "Sniffer Mode Confirm", Ops::Parse),
    (0xA036, "Sniffer Mode Indicate", Ops::Parse),
    (0xA038, "Network Info Request (Vendor-Specific)", Ops::Empty),
    (0xA039, "Network Info Confirm (Vendor-Specific)", Ops::Parse),
    (0xA040, "Check Points Request", Ops::Build),
    (0xA042, "Check Points Indicate", Ops::Parse),
    (0xA048, "Loopback Request", Ops::Build),
    (0xA049, "Loopback Confirm", Ops::Parse),
    (0xA04C, "Loopback Status Request", Ops::Empty),
    (0xA04D, "Loopback Status Confirm", Ops::Parse),
    (0xA050, "Set Encryption Key Request", Ops::Both),
    (0xA051, "Set Encryption Key Confirm", Ops::Parse),
    (0xA054, "Get Manufacturing String Request", Ops::Empty),
    (0xA055, "Get Manufacturing String Confirm", Ops::Parse),
    (0xA058, "Read Configuration Block Request", Ops::Empty),
    (0xA059, "Read Configuration Block Confirm", Ops::Parse),
    (0xA05C, "Set SDRAM Configuration Request", Ops::Both),
    (0xA05D, "Set SDRAM Configuration Confirm", Ops::Parse),
    (0xA062, "Embedded Host Action Required Indicate", Ops::Parse),
    (0xA063, "Embedded Host Action Required Response", Ops::Both),
    (0xA068, "Get Device Attributes Request", Ops::Build),
    (0xA069, "Get Device Attributes Confirm", Ops::Parse),
    (0xA06C, "Get Ethernet PHY Settings Request", Ops::Build),
    (0xA06D, "Get Ethernet PHY Settings Confirm", Ops::Parse),
    (0xA070, "Get Tone Map Caracteristics Request", Ops::Build),
    (0xA071, "Get Tone Map Characteristics Confirm", Ops::Parse),
];

#[rustfmt::skip]
const HP10_OPS: &[(u16, &str, Ops)] = &[
    (0x00, "Channel Estimation Request", Ops::Both),
    (0x01, "Channel Estimation Confirm", Ops::Desc),
    (0x04, "Set Network Encryption Key Request", Ops::Empty),
    (0x06, "Set Network Encryption Key Confirm", Ops::Desc),
    (0x07, "Parameters and Statistics Request", Ops::Empty),
    (0x08, "Parameters and Statistics Confirm", Ops::Parse),
    (0x19, "Set Local parameters Request", Ops::Empty),
    (0x1A, "Basic Network Statistics Confirm", Ops::Desc),
    (0x1C, "Extended Network Statistics Confirm", Ops::Parse),
    (0x1D, "Set Local Overrides Request", Ops::Empty),
    (0x1E, "Bridging Characteristics Response", Ops::Desc),
    (0x1F, "Set Transmit Characteristics Request", Ops::Desc),
];

fn frame_ops(family: MmFamily, mmtype: u16, desc: &'static str, ops: Ops) -> FrameOps {
    let kind = MmKind::lookup(family, mmtype);
    let build = match (ops, kind) {
        (Ops::Empty, _) => BuildOp::Empty,
        (Ops::Build | Ops::Both, Some(kind)) => BuildOp::Encode(kind),
        _ => BuildOp::Absent,
    };
    let parse = match (ops, kind) {
        (Ops::Parse | Ops::Both, Some(kind)) => ParseOp::Decode(kind),
        _ => ParseOp::Absent,
    };
    FrameOps {
        mmtype,
        desc,
        build,
        parse,
    }
}

/// Both dispatch tables. Lookups never cross families.
#[derive(Clone, Debug)]
pub struct Registries {
    av: HashMap<u16, FrameOps>,
    hp10: HashMap<u8, FrameOps>,
}

impl Registries {
    pub fn new() -> Self {
        let av = HPAV_OPS
            .iter()
            .map(|(code, desc, ops)| (*code, frame_ops(MmFamily::HomePlugAv, *code, *desc, *ops)))
            .collect();
        let hp10 = HP10_OPS
            .iter()
            .map(|(code, desc, ops)| {
                (*code as u8, frame_ops(MmFamily::HomePlug10, *code, *desc, *ops))
            })
            .collect();
        Registries { av, hp10 }
    }

    pub fn av(&self, mmtype: u16) -> Option<&FrameOps> {
        self.av.get(&mmtype)
    }

    pub fn hp10(&self, mmetype: u8) -> Option<&FrameOps> {
        self.hp10.get(&mmetype)
    }

    pub fn av_len(&self) -> usize {
        self.av.len()
    }

    pub fn hp10_len(&self) -> usize {
        self.hp10.len()
    }

    /// Registered HomePlug AV codes in ascending order.
    pub fn av_codes(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self.av.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn hp10_codes(&self) -> Vec<u8> {
        let mut codes: Vec<u8> = self.hp10.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn set_av_build(&mut self, mmtype: u16, build: BuildOp) -> FrameResult<()> {
        match self.av.get_mut(&mmtype) {
            Some(entry) => {
                entry.build = build;
                Ok(())
            }
            None => Err(FrameError::OverrideOfUnregisteredType(mmtype)),
        }
    }

    pub fn set_av_parse(&mut self, mmtype: u16, parse: ParseOp) -> FrameResult<()> {
        match self.av.get_mut(&mmtype) {
            Some(entry) => {
                entry.parse = parse;
                Ok(())
            }
            None => Err(FrameError::OverrideOfUnregisteredType(mmtype)),
        }
    }

    pub fn set_hp10_build(&mut self, mmetype: u8, build: BuildOp) -> FrameResult<()> {
        match self.hp10.get_mut(&mmetype) {
            Some(entry) => {
                entry.build = build;
                Ok(())
            }
            None => Err(FrameError::OverrideOfUnregisteredType(mmetype as u16)),
        }
    }

    pub fn set_hp10_parse(&mut self, mmetype: u8, parse: ParseOp) -> FrameResult<()> {
        match self.hp10.get_mut(&mmetype) {
            Some(entry) => {
                entry.parse = parse;
                Ok(())
            }
            None => Err(FrameError::OverrideOfUnregisteredType(mmetype as u16)),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Registries::new()
    }
}
