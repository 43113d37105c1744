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

//! Typed payload model shared by the registry and the frame codec.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Wire codec of one management message layout (payload only, after the
/// MM header and its OUI or fragmentation sub-header).
pub trait MmeCodec: Sized {
    const NAME: &'static str;
    /// Fixed part checked before any field is read.
    const MIN_LEN: usize;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self>;
    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()>;
}

/// Decodes a payload, returns it with the number of bytes consumed.
pub fn decode_mme<T: MmeCodec>(buf: &[u8]) -> FrameResult<(T, usize)> {
    if buf.len() < T::MIN_LEN {
        return Err(FrameError::truncated(T::NAME, T::MIN_LEN, buf.len()));
    }
    let mut reader = ByteReader::new(buf, T::NAME);
    let value = T::decode(&mut reader)?;
    Ok((value, reader.position()))
}

/// Protocol family a management message belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MmFamily {
    HomePlugAv,
    HomePlug10,
}

macro_rules! mm_payloads {
    ($($variant:ident($ty:ty) = $family:ident $code:literal,)+) => {
        /// Closed union of every decoded or buildable payload layout.
        #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
        #[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
        pub enum MmPayload {
            $($variant($ty),)+
            /// bytes produced or consumed by a custom handler
            Raw { mmtype: u16, data: Vec<u8> },
        }

        /// Discriminant of [`MmPayload`], used as builtin registry handler.
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[serde(rename_all = "snake_case")]
        pub enum MmKind {
            $($variant,)+
        }

        impl MmKind {
            pub const ALL: &'static [MmKind] = &[$(MmKind::$variant,)+];

            /// Layout registered for a code within one protocol family.
            pub fn lookup(family: MmFamily, mmtype: u16) -> Option<MmKind> {
                MmKind::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.family() == family && kind.mmtype() == mmtype)
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(MmKind::$variant => <$ty as MmeCodec>::NAME,)+
                }
            }

            pub fn min_len(&self) -> usize {
                match self {
                    $(MmKind::$variant => <$ty as MmeCodec>::MIN_LEN,)+
                }
            }

            pub fn family(&self) -> MmFamily {
                match self {
                    $(MmKind::$variant => MmFamily::$family,)+
                }
            }

            /// MM type code, 5 bit entry type for HomePlug 1.0 layouts.
            pub fn mmtype(&self) -> u16 {
                match self {
                    $(MmKind::$variant => $code,)+
                }
            }

            pub fn decode(&self, buf: &[u8]) -> FrameResult<(MmPayload, usize)> {
                match self {
                    $(MmKind::$variant => {
                        decode_mme::<$ty>(buf).map(|(value, len)| (MmPayload::$variant(value), len))
                    })+
                }
            }
        }

        impl MmPayload {
            pub fn kind(&self) -> Option<MmKind> {
                match self {
                    $(MmPayload::$variant(_) => Some(MmKind::$variant),)+
                    MmPayload::Raw { .. } => None,
                }
            }

            pub fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
                match self {
                    $(MmPayload::$variant(value) => value.encode(writer),)+
                    MmPayload::Raw { data, .. } => writer.put_bytes(data),
                }
            }
        }
    };
}

mm_payloads! {
    CcDiscoverListConfirm(CcDiscoverListConfirm) = HomePlugAv 0x0015,
    EncPayloadIndicate(EncPayloadIndicate) = HomePlugAv 0x6004,
    EncPayloadResponse(EncPayloadResponse) = HomePlugAv 0x6005,
    CmSetKeyRequest(CmSetKeyRequest) = HomePlugAv 0x6008,
    CmSetKeyConfirm(CmSetKeyConfirm) = HomePlugAv 0x6009,
    CmGetKeyRequest(CmGetKeyRequest) = HomePlugAv 0x600C,
    CmGetKeyConfirm(CmGetKeyConfirm) = HomePlugAv 0x600D,
    BridgeInfosConfirm(BridgeInfosConfirm) = HomePlugAv 0x6021,
    NetworkInfosConfirm(NetworkInfosConfirm) = HomePlugAv 0x6039,
    MmeErrorIndicate(MmeErrorIndicate) = HomePlugAv 0x6046,
    NetworkStatsConfirm(NetworkStatsConfirm) = HomePlugAv 0x6049,
    SwVersionConfirm(SwVersionConfirm) = HomePlugAv 0xA001,
    WriteMacMemoryRequest(WriteMacMemoryRequest) = HomePlugAv 0xA004,
    WriteMacMemoryConfirm(WriteMacMemoryConfirm) = HomePlugAv 0xA005,
    ReadMacMemoryRequest(ReadMacMemoryRequest) = HomePlugAv 0xA008,
    ReadMacMemoryConfirm(ReadMacMemoryConfirm) = HomePlugAv 0xA009,
    StartMacRequest(StartMacRequest) = HomePlugAv 0xA00C,
    StartMacConfirm(ModuleReply) = HomePlugAv 0xA00D,
    NvmParametersConfirm(NvmParametersConfirm) = HomePlugAv 0xA011,
    ResetDeviceConfirm(StatusReply) = HomePlugAv 0xA01D,
    WriteModuleDataRequest(WriteModuleDataRequest) = HomePlugAv 0xA020,
    WriteModuleDataConfirm(WriteModuleDataConfirm) = HomePlugAv 0xA021,
    WriteModuleDataIndicate(ModuleReply) = HomePlugAv 0xA022,
    ReadModuleDataRequest(ReadModuleDataRequest) = HomePlugAv 0xA024,
    ReadModuleDataConfirm(ReadModuleDataConfirm) = HomePlugAv 0xA025,
    NvmModuleRequest(NvmModuleRequest) = HomePlugAv 0xA028,
    NvmModuleConfirm(ModuleReply) = HomePlugAv 0xA029,
    WatchdogReportRequest(SessionRequest) = HomePlugAv 0xA02C,
    WatchdogReportIndicate(WatchdogReportIndicate) = HomePlugAv 0xA02E,
    LinkStatsRequest(LinkStatsRequest) = HomePlugAv 0xA030,
    LinkStatsConfirm(LinkStatsConfirm) = HomePlugAv 0xA031,
    SnifferRequest(SnifferRequest) = HomePlugAv 0xA034,
    SnifferConfirm(SnifferConfirm) = HomePlugAv 0xA035,
    SnifferIndicate(SnifferIndicate) = HomePlugAv 0xA036,
    NetworkInfoConfirm(NetworkInfoConfirm) = HomePlugAv 0xA039,
    CheckPointsRequest(SessionRequest) = HomePlugAv 0xA040,
    CheckPointsIndicate(CheckPointsIndicate) = HomePlugAv 0xA042,
    LoopbackRequest(LoopbackRequest) = HomePlugAv 0xA048,
    LoopbackConfirm(LoopbackConfirm) = HomePlugAv 0xA049,
    LoopbackStatusConfirm(LoopbackStatusConfirm) = HomePlugAv 0xA04D,
    SetEncryptionKeyRequest(SetEncryptionKeyRequest) = HomePlugAv 0xA050,
    SetEncryptionKeyConfirm(StatusReply) = HomePlugAv 0xA051,
    ManufStringConfirm(ManufStringConfirm) = HomePlugAv 0xA055,
    ReadConfigBlockConfirm(ReadConfigBlockConfirm) = HomePlugAv 0xA059,
    SetSdramConfigRequest(SetSdramConfigRequest) = HomePlugAv 0xA05C,
    SetSdramConfigConfirm(StatusReply) = HomePlugAv 0xA05D,
    HostActionIndicate(HostActionIndicate) = HomePlugAv 0xA062,
    HostActionResponse(StatusReply) = HomePlugAv 0xA063,
    DeviceAttrsRequest(DeviceAttrsRequest) = HomePlugAv 0xA068,
    DeviceAttrsConfirm(DeviceAttrsConfirm) = HomePlugAv 0xA069,
    EnetPhyRequest(EnetPhyRequest) = HomePlugAv 0xA06C,
    EnetPhyConfirm(EnetPhyConfirm) = HomePlugAv 0xA06D,
    ToneMapRequest(ToneMapRequest) = HomePlugAv 0xA070,
    ToneMapConfirm(ToneMapConfirm) = HomePlugAv 0xA071,
    Hp10ChannelEstimationRequest(Hp10ChannelEstimationRequest) = HomePlug10 0x00,
    Hp10ParamsStatsConfirm(Hp10ParamsStatsConfirm) = HomePlug10 0x08,
    Hp10NetworkStatsConfirm(Hp10NetworkStatsConfirm) = HomePlug10 0x1C,
}

impl MmKind {
    // layouts that can be built without caller parameters
    fn default_payload(&self) -> Option<MmPayload> {
        match self {
            MmKind::Hp10ChannelEstimationRequest => Some(MmPayload::Hp10ChannelEstimationRequest(
                Hp10ChannelEstimationRequest::default(),
            )),
            MmKind::EnetPhyRequest => Some(MmPayload::EnetPhyRequest(EnetPhyRequest::default())),
            _ => None,
        }
    }

    /// Builtin build operation: encode the payload described by `params`.
    pub fn build(&self, writer: &mut FrameWriter, params: &MmParams) -> FrameResult<()> {
        let payload = match (self, params) {
            (_, MmParams::Message(payload)) if payload.kind() == Some(*self) => {
                return payload.encode(writer)
            }
            (MmKind::SetEncryptionKeyRequest, MmParams::SetEncryptionKey(params)) => {
                MmPayload::SetEncryptionKeyRequest(SetEncryptionKeyRequest::from_params(params))
            }
            (MmKind::WriteModuleDataRequest, MmParams::WriteModuleData(params)) => {
                MmPayload::WriteModuleDataRequest(WriteModuleDataRequest::from_params(params)?)
            }
            (MmKind::LoopbackRequest, MmParams::Loopback(params)) => {
                MmPayload::LoopbackRequest(LoopbackRequest::from_params(params)?)
            }
            (kind, MmParams::None) => match kind.default_payload() {
                Some(payload) => payload,
                None => {
                    return Err(FrameError::invalid(
                        "parameters",
                        format!("{} requires parameters", kind.name()),
                    ))
                }
            },
            (kind, other) => {
                return Err(FrameError::invalid(
                    "parameters",
                    format!("{} cannot be built from {}", kind.name(), other.label()),
                ))
            }
        };
        payload.encode(writer)
    }
}

/// Caller supplied context of a build operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MmParams {
    #[default]
    None,
    /// fully populated payload, encoded as is
    Message(MmPayload),
    SetEncryptionKey(SetKeyParams),
    WriteModuleData(WriteModuleParams),
    Loopback(LoopbackParams),
}

impl MmParams {
    pub fn label(&self) -> &'static str {
        match self {
            MmParams::None => "no parameters",
            MmParams::Message(payload) => match payload.kind() {
                Some(kind) => kind.name(),
                None => "raw bytes",
            },
            MmParams::SetEncryptionKey(_) => "set-key parameters",
            MmParams::WriteModuleData(_) => "write-module parameters",
            MmParams::Loopback(_) => "loopback parameters",
        }
    }
}

impl From<MmPayload> for MmParams {
    fn from(payload: MmPayload) -> Self {
        MmParams::Message(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_metadata() {
        assert_eq!(MmKind::SnifferRequest.mmtype(), 0xA034);
        assert_eq!(MmKind::SnifferRequest.family(), MmFamily::HomePlugAv);
        assert_eq!(MmKind::Hp10ParamsStatsConfirm.family(), MmFamily::HomePlug10);
        assert_eq!(MmKind::SetEncryptionKeyRequest.min_len(), 40);
    }

    #[test]
    fn decode_checks_min_len_first() {
        assert_eq!(
            MmKind::WriteMacMemoryConfirm.decode(&[0u8; 8]),
            Err(FrameError::TruncatedInput {
                what: MmKind::WriteMacMemoryConfirm.name(),
                need: 9,
                got: 8
            })
        );
    }

    #[test]
    fn build_rejects_mismatched_params() {
        let mut buf = [0u8; 64];
        let mut writer = FrameWriter::new(&mut buf);
        let params = MmParams::Message(MmPayload::SnifferRequest(SnifferRequest::default()));
        assert!(matches!(
            MmKind::LinkStatsRequest.build(&mut writer, &params),
            Err(FrameError::InvalidParameter { .. })
        ));
        assert!(matches!(
            MmKind::ToneMapRequest.build(&mut writer, &MmParams::None),
            Err(FrameError::InvalidParameter { .. })
        ));
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn build_with_defaults() {
        let mut buf = [0xFFu8; 8];
        let mut writer = FrameWriter::new(&mut buf);
        MmKind::EnetPhyRequest
            .build(&mut writer, &MmParams::None)
            .unwrap();
        assert_eq!(writer.position(), 5);
        assert_eq!(buf[..5], [0u8; 5]);
    }

    #[test]
    fn params_from_json() {
        let jparams = r#"{"message":{"kind":"sniffer_request","fields":{"control":"enable","reserved":[0,0,0,0]}}}"#;
        let params: MmParams = serde_json::from_str(jparams).unwrap();
        assert_eq!(
            params,
            MmParams::Message(MmPayload::SnifferRequest(SnifferRequest {
                control: SnifferControl::Enable,
                reserved: [0; 4],
            }))
        );
        let none: MmParams = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(none, MmParams::None);
    }
}
