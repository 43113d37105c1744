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

//! Top level frame codec: Ethernet framing, MM headers and registry dispatch.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EtherHeader {
    pub dhost: HpavMac,
    pub shost: HpavMac,
    pub ether_type: u16,
    /// 802.1Q tag control when the frame was tagged
    pub vlan: Option<u16>,
}

impl EtherHeader {
    /// Returns the header and the offset of the payload.
    pub fn decode(frame: &[u8]) -> FrameResult<(EtherHeader, usize)> {
        let mut reader = ByteReader::new(frame, "ethernet header");
        let dhost = reader.array()?;
        let shost = reader.array()?;
        let mut ether_type = u16::from_be_bytes(reader.array()?);
        let mut vlan = None;
        if ether_type == ETH_P_8021Q {
            vlan = Some(u16::from_be_bytes(reader.array()?));
            ether_type = u16::from_be_bytes(reader.array()?);
        }
        let header = EtherHeader {
            dhost,
            shost,
            ether_type,
            vlan,
        };
        Ok((header, reader.position()))
    }
}

/// Sub-header following the HomePlug AV MM header.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AvSubHeader {
    Vendor {
        oui: HpavOui,
    },
    Public {
        frag_count: u8,
        frag_index: u8,
        frag_seqnum: u8,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AvBody {
    Decoded(MmPayload),
    /// registered type without parser
    NoParser,
    /// vendor category carrying another vendor's OUI
    ForeignVendor(HpavOui),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvFrame {
    pub header: EtherHeader,
    pub mmver: u8,
    pub mmtype: u16,
    pub desc: &'static str,
    pub sub: AvSubHeader,
    pub body: AvBody,
    /// payload bytes used by the parser
    pub consumed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Hp10Outcome {
    Decoded(MmPayload),
    /// registered type without parser
    NotDecoded,
    Unknown,
    /// parser rejected the entry data, following entries are still read
    Failed(FrameError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hp10Entry {
    pub mmetype: u8,
    pub version: u8,
    pub length: u8,
    pub desc: Option<&'static str>,
    pub outcome: Hp10Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hp10Frame {
    pub header: EtherHeader,
    pub entries: Vec<Hp10Entry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    /// ethertype outside both HomePlug families
    Ignored { ether_type: u16 },
    HomePlugAv(AvFrame),
    HomePlug10(Hp10Frame),
}

impl DecodedFrame {
    pub fn mmtype(&self) -> Option<u16> {
        match self {
            DecodedFrame::HomePlugAv(frame) => Some(frame.mmtype),
            _ => None,
        }
    }

    /// Decoded payload of an AV frame.
    pub fn payload(&self) -> Option<&MmPayload> {
        match self {
            DecodedFrame::HomePlugAv(AvFrame {
                body: AvBody::Decoded(payload),
                ..
            }) => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DecodedFrame::Ignored { ether_type } => {
                format!("Ignored:{{ ether_type:0x{:04X} }}", ether_type)
            }
            DecodedFrame::HomePlugAv(frame) => {
                let body = match &frame.body {
                    AvBody::Decoded(payload) => match payload.kind() {
                        Some(kind) => kind.name(),
                        None => "raw",
                    },
                    AvBody::NoParser => "not decoded",
                    AvBody::ForeignVendor(_) => "foreign vendor",
                };
                format!(
                    "HomePlugAv:{{ mmtype:0x{:04X}, desc:'{}', src:{}, body:{} }}",
                    frame.mmtype,
                    frame.desc,
                    fmt_mac(&frame.header.shost),
                    body
                )
            }
            DecodedFrame::HomePlug10(frame) => format!(
                "HomePlug10:{{ src:{}, entries:{} }}",
                fmt_mac(&frame.header.shost),
                frame.entries.len()
            ),
        };
        fmt.pad(&text)
    }
}

fn put_ether_header(
    writer: &mut FrameWriter,
    dhost: &HpavMac,
    shost: &HpavMac,
    ether_type: u16,
) -> FrameResult<()> {
    writer.put_bytes(dhost)?;
    writer.put_bytes(shost)?;
    writer.put_u16_be(ether_type)
}

fn finish(mut buffer: Vec<u8>, len: usize) -> Vec<u8> {
    buffer.truncate(len.max(ETHER_MIN_LEN));
    buffer
}

fn av_destination(da: Option<&HpavMac>) -> HpavMac {
    match da {
        Some(mac) if *mac != NULL_ADDR => *mac,
        _ => INTELLON_LOCAL_ADDR,
    }
}

/// HomePlug frame encoder and decoder bound to a set of registries.
///
/// Clones share their registries, overrides are visible to every clone.
#[derive(Clone)]
pub struct FrameCodec {
    registries: Arc<RwLock<Registries>>,
}

static SHARED_CODEC: OnceLock<FrameCodec> = OnceLock::new();

impl FrameCodec {
    /// Codec with its own freshly built default tables.
    pub fn new() -> Self {
        FrameCodec {
            registries: Arc::new(RwLock::new(Registries::new())),
        }
    }

    /// Process wide codec, built on first use.
    pub fn shared() -> &'static FrameCodec {
        SHARED_CODEC.get_or_init(FrameCodec::new)
    }

    fn read(&self) -> RwLockReadGuard<'_, Registries> {
        self.registries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registries> {
        self.registries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lookup_av(&self, mmtype: u16) -> Option<FrameOps> {
        self.read().av(mmtype).cloned()
    }

    pub fn lookup_hp10(&self, mmetype: u8) -> Option<FrameOps> {
        self.read().hp10(mmetype).cloned()
    }

    /// Copy of the current tables.
    pub fn snapshot(&self) -> Registries {
        self.read().clone()
    }

    pub fn set_build_callback(&self, mmtype: u16, build: BuildOp) -> FrameResult<()> {
        debug!("hpav-codec override build 0x{:04X} with {:?}", mmtype, build);
        self.write().set_av_build(mmtype, build)
    }

    pub fn set_parse_callback(&self, mmtype: u16, parse: ParseOp) -> FrameResult<()> {
        debug!("hpav-codec override parse 0x{:04X} with {:?}", mmtype, parse);
        self.write().set_av_parse(mmtype, parse)
    }

    pub fn set_hp10_build_callback(&self, mmetype: u8, build: BuildOp) -> FrameResult<()> {
        debug!("hp10-codec override build 0x{:02X} with {:?}", mmetype, build);
        self.write().set_hp10_build(mmetype, build)
    }

    pub fn set_hp10_parse_callback(&self, mmetype: u8, parse: ParseOp) -> FrameResult<()> {
        debug!("hp10-codec override parse 0x{:02X} with {:?}", mmetype, parse);
        self.write().set_hp10_parse(mmetype, parse)
    }

    /// Builds an outgoing frame, padded to the Ethernet minimum. HomePlug AV
    /// codes are looked up first, then HomePlug 1.0 entry types.
    pub fn encode_frame(
        &self,
        mmtype: u16,
        da: Option<&HpavMac>,
        sa: Option<&HpavMac>,
        params: &MmParams,
    ) -> FrameResult<Vec<u8>> {
        if let Some(ops) = self.lookup_av(mmtype) {
            return encode_av(mmtype, da, sa, |writer| ops.build.run(writer, params));
        }
        let hp10 = u8::try_from(mmtype)
            .ok()
            .and_then(|code| self.lookup_hp10(code).map(|ops| (code, ops)));
        match hp10 {
            Some((code, ops)) => encode_hp10(code, sa, |writer| ops.build.run(writer, params)),
            None => Err(FrameError::UnknownType(mmtype)),
        }
    }

    /// Frames a payload with its own layout encoder, whatever the registry
    /// holds for its type. Raw payloads take their family from the registry.
    pub fn encode_message(
        &self,
        payload: &MmPayload,
        da: Option<&HpavMac>,
        sa: Option<&HpavMac>,
    ) -> FrameResult<Vec<u8>> {
        let (family, mmtype) = match (payload.kind(), payload) {
            (Some(kind), _) => (kind.family(), kind.mmtype()),
            (None, MmPayload::Raw { mmtype, .. }) => {
                if self.lookup_av(*mmtype).is_some() {
                    (MmFamily::HomePlugAv, *mmtype)
                } else if u8::try_from(*mmtype)
                    .ok()
                    .and_then(|code| self.lookup_hp10(code))
                    .is_some()
                {
                    (MmFamily::HomePlug10, *mmtype)
                } else {
                    return Err(FrameError::UnknownType(*mmtype));
                }
            }
            (None, _) => return Err(FrameError::invalid("payload", "no layout")),
        };
        match family {
            MmFamily::HomePlugAv => encode_av(mmtype, da, sa, |writer| payload.encode(writer)),
            MmFamily::HomePlug10 => {
                let code = u8::try_from(mmtype)
                    .map_err(|_| FrameError::invalid("mmetype", format!("0x{:04X}", mmtype)))?;
                encode_hp10(code, sa, |writer| payload.encode(writer))
            }
        }
    }

    /// Classifies a received Ethernet frame and decodes its management
    /// message(s).
    pub fn decode_frame(&self, frame: &[u8]) -> FrameResult<DecodedFrame> {
        let (header, offset) = EtherHeader::decode(frame)?;
        let payload = &frame[offset..];
        match header.ether_type {
            ETH_P_HPAV => self.decode_av(header, payload).map(DecodedFrame::HomePlugAv),
            ETH_P_HP10 => self.decode_hp10(header, payload).map(DecodedFrame::HomePlug10),
            ether_type => Ok(DecodedFrame::Ignored { ether_type }),
        }
    }

    fn decode_av(&self, header: EtherHeader, payload: &[u8]) -> FrameResult<AvFrame> {
        let mut reader = ByteReader::new(payload, "HomePlug AV header");
        let mmver = reader.u8()?;
        let mmtype = reader.u16_le()?;

        let ops = self
            .lookup_av(mmtype)
            .ok_or(FrameError::UnknownType(mmtype))?;

        let sub = match mm_category(mmtype) {
            MmCategory::Vendor => AvSubHeader::Vendor {
                oui: reader.array()?,
            },
            _ => {
                let frag = reader.u8()?;
                AvSubHeader::Public {
                    frag_count: frag & 0x0F,
                    frag_index: frag >> 4,
                    frag_seqnum: reader.u8()?,
                }
            }
        };

        let (body, consumed) = match sub {
            AvSubHeader::Vendor { oui } if oui != INTELLON_OUI => (AvBody::ForeignVendor(oui), 0),
            _ => match ops.parse.run(reader.rest(), &header) {
                None => (AvBody::NoParser, 0),
                Some(result) => {
                    let (payload, used) = result?;
                    (AvBody::Decoded(payload), used)
                }
            },
        };

        Ok(AvFrame {
            header,
            mmver,
            mmtype,
            desc: ops.desc,
            sub,
            body,
            consumed,
        })
    }

    fn decode_hp10(&self, header: EtherHeader, payload: &[u8]) -> FrameResult<Hp10Frame> {
        let mut reader = ByteReader::new(payload, "HomePlug 1.0 frame");
        let count = reader.u8()? & HP10_MAX_ENTRIES;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let kind = reader.u8()?;
            let length = reader.u8()?;
            let data = reader.bytes(length as usize)?;
            let mmetype = kind & 0x1F;

            let ops = self.lookup_hp10(mmetype);
            let outcome = match &ops {
                None => Hp10Outcome::Unknown,
                Some(ops) => match ops.parse.run(data, &header) {
                    None => Hp10Outcome::NotDecoded,
                    Some(Ok((payload, _))) => Hp10Outcome::Decoded(payload),
                    Some(Err(error)) => Hp10Outcome::Failed(error),
                },
            };
            entries.push(Hp10Entry {
                mmetype,
                version: kind >> 5,
                length,
                desc: ops.map(|ops| ops.desc),
                outcome,
            });
        }
        Ok(Hp10Frame { header, entries })
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new()
    }
}

fn encode_av<F>(mmtype: u16, da: Option<&HpavMac>, sa: Option<&HpavMac>, body: F) -> FrameResult<Vec<u8>>
where
    F: FnOnce(&mut FrameWriter) -> FrameResult<()>,
{
    let mut buffer = vec![0u8; ETHER_MAX_LEN];
    let mut writer = FrameWriter::new(&mut buffer);

    let dhost = av_destination(da);
    let shost = sa.copied().unwrap_or(NULL_ADDR);
    put_ether_header(&mut writer, &dhost, &shost, ETH_P_HPAV)?;

    writer.put_u8(mm_version(mmtype))?;
    writer.put_u16_le(mmtype)?;
    match mm_category(mmtype) {
        MmCategory::Vendor => writer.put_bytes(&INTELLON_OUI)?,
        // single fragment, sequence 0
        _ => writer.put_zeros(HPAV_PUBLIC_HDR_LEN)?,
    }

    body(&mut writer).map_err(|error| error.into_build_failure(mmtype))?;
    let len = writer.position();
    Ok(finish(buffer, len))
}

fn encode_hp10<F>(mmetype: u8, sa: Option<&HpavMac>, body: F) -> FrameResult<Vec<u8>>
where
    F: FnOnce(&mut FrameWriter) -> FrameResult<()>,
{
    let mut buffer = vec![0u8; ETHER_MAX_LEN];
    let mut writer = FrameWriter::new(&mut buffer);

    let shost = sa.copied().unwrap_or(BROADCAST_ADDR);
    put_ether_header(&mut writer, &BROADCAST_ADDR, &shost, ETH_P_HP10)?;

    writer.put_u8(1)?;
    writer.put_u8(mmetype & 0x1F)?;
    let length_at = writer.position();
    writer.put_u8(0)?;

    let start = writer.position();
    body(&mut writer).map_err(|error| error.into_build_failure(mmetype as u16))?;
    let length = u8::try_from(writer.position() - start).map_err(|_| FrameError::BuildFailed {
        mmtype: mmetype as u16,
        reason: format!("entry of {} bytes exceeds 255", writer.position() - start),
    })?;
    writer.patch_u8(length_at, length)?;

    let len = writer.position();
    Ok(finish(buffer, len))
}

pub fn encode_frame(
    mmtype: u16,
    da: Option<&HpavMac>,
    sa: Option<&HpavMac>,
    params: &MmParams,
) -> FrameResult<Vec<u8>> {
    FrameCodec::shared().encode_frame(mmtype, da, sa, params)
}

pub fn encode_message(
    payload: &MmPayload,
    da: Option<&HpavMac>,
    sa: Option<&HpavMac>,
) -> FrameResult<Vec<u8>> {
    FrameCodec::shared().encode_message(payload, da, sa)
}

pub fn decode_frame(frame: &[u8]) -> FrameResult<DecodedFrame> {
    FrameCodec::shared().decode_frame(frame)
}

pub fn set_build_callback(mmtype: u16, build: BuildOp) -> FrameResult<()> {
    FrameCodec::shared().set_build_callback(mmtype, build)
}

pub fn set_parse_callback(mmtype: u16, parse: ParseOp) -> FrameResult<()> {
    FrameCodec::shared().set_parse_callback(mmtype, parse)
}

pub fn set_hp10_build_callback(mmetype: u8, build: BuildOp) -> FrameResult<()> {
    FrameCodec::shared().set_hp10_build_callback(mmetype, build)
}

pub fn set_hp10_parse_callback(mmetype: u8, parse: ParseOp) -> FrameResult<()> {
    FrameCodec::shared().set_hp10_parse_callback(mmetype, parse)
}
