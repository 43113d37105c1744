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

use hpav::prelude::*;
use hpavtest::*;

fn station(last: u8, tei: u8) -> StaInfo {
    StaInfo {
        macaddr: [0x00, 0xB0, 0x52, 0x00, 0x00, last],
        tei,
        bridge_macaddr: [0xFF; 6],
        avg_phy_tx_rate: 98,
        avg_phy_rx_rate: 121,
    }
}

fn av_samples() -> Vec<MmPayload> {
    vec![
        MmPayload::CmGetKeyRequest(CmGetKeyRequest {
            req_type: 0,
            req_key_type: KeyType::Nmk,
            nid: [0x02, 0x6B, 0xCB, 0xA5, 0x35, 0x4E, 0x08],
            my_nonce: 0xAABBCCDD,
            pid: ProtocolId::HleProtocol,
            prn: 0x1234,
            pmn: 2,
            hash_key: Vec::new(),
        }),
        MmPayload::MmeErrorIndicate(MmeErrorIndicate {
            reason: MmeErrorReason::InvalidFields,
            rx_version: 1,
            rx_mmtype: 0x6008,
            invalid_offset: 12,
        }),
        MmPayload::ResetDeviceConfirm(StatusReply { mstatus: 0 }),
        MmPayload::StartMacConfirm(ModuleReply {
            mstatus: ModuleStatus::Success,
            module_id: ModuleId::MacSoftware,
        }),
        MmPayload::NvmParametersConfirm(NvmParametersConfirm {
            mstatus: 0,
            manuf_code: 0x001F_4701,
            page_size: 256,
            block_size: 0x1_0000,
            mem_size: 0x20_0000,
        }),
        MmPayload::ReadModuleDataRequest(ReadModuleDataRequest {
            module_id: ModuleId::Pib,
            length: 1024,
            offset: 0x400,
        }),
        MmPayload::NetworkInfoConfirm(NetworkInfoConfirm {
            num_avlns: 1,
            nid: [0xB0, 0xF2, 0xE6, 0x95, 0x66, 0x6B, 0x03],
            snid: 5,
            tei: 1,
            sta_role: StaRole::Cco,
            cco_macaddr: PLC_MAC,
            cco_tei: 1,
            stations: vec![station(0x10, 2), station(0x11, 3), station(0x12, 4)],
        }),
        MmPayload::LoopbackConfirm(LoopbackConfirm {
            mstatus: 0,
            duration: 10,
            length: 60,
        }),
        MmPayload::ManufStringConfirm(ManufStringConfirm {
            status: 0,
            text: "HomePlug AV bench".to_string(),
        }),
        MmPayload::EnetPhyConfirm(EnetPhyConfirm {
            status: 0,
            speed: EnetSpeed::FastEthernet,
            duplex: 1,
        }),
    ]
}

fn hp10_samples() -> Vec<MmPayload> {
    let tone_maps = (0..HP10_NUM_TONE_MAP as u16)
        .map(|idx| Hp10ToneMapStats {
            netw_da: [0x00, 0x11, 0x22, 0x33, 0x44, idx as u8],
            bytes40: 100 + idx,
            fails: idx,
            drops: 0,
        })
        .collect();
    vec![
        MmPayload::Hp10ChannelEstimationRequest(Hp10ChannelEstimationRequest { version: 1 }),
        MmPayload::Hp10ParamsStatsConfirm(Hp10ParamsStatsConfirm {
            tx_ack_cnt: 1000,
            tx_nack_cnt: 3,
            tx_fail_cnt: 1,
            tx_cont_loss_cnt: 0,
            tx_coll_cnt: 12,
            tx_ca3_cnt: 40,
            tx_ca2_cnt: 30,
            tx_ca1_cnt: 20,
            tx_ca0_cnt: 10,
            rx_cumul: 0x0001_0000,
        }),
        MmPayload::Hp10NetworkStatsConfirm(Hp10NetworkStatsConfirm {
            icid: 0x11,
            ac: true,
            bytes40_robo: 512,
            fails_robo: 2,
            drops_robo: 1,
            tone_maps,
        }),
    ]
}

#[test]
fn av_messages_survive_the_wire() {
    init_logger();
    let codec = FrameCodec::new();
    for message in av_samples() {
        let frame = codec
            .encode_message(&message, Some(&HOST_MAC), Some(&PLC_MAC))
            .unwrap();
        assert!(frame.len() >= ETHER_MIN_LEN, "{:?}", message.kind());

        let decoded = codec.decode_frame(&frame).unwrap();
        assert_eq!(
            decoded.payload(),
            Some(&message),
            "frame:{}",
            hexdump(&frame)
        );
        match decoded {
            DecodedFrame::HomePlugAv(av) => {
                assert_eq!(av.header.dhost, HOST_MAC);
                assert_eq!(av.header.shost, PLC_MAC);
                assert_eq!(Some(av.mmtype), message.kind().map(|kind| kind.mmtype()));
            }
            other => panic!("unexpected {}", other),
        }
    }
}

#[test]
fn hp10_messages_survive_the_wire() {
    init_logger();
    let codec = FrameCodec::new();
    for message in hp10_samples() {
        let frame = codec.encode_message(&message, None, Some(&PLC_MAC)).unwrap();
        assert_eq!(frame[..6], BROADCAST_ADDR);

        match codec.decode_frame(&frame).unwrap() {
            DecodedFrame::HomePlug10(hp10) => {
                assert_eq!(hp10.entries.len(), 1);
                let entry = &hp10.entries[0];
                assert_eq!(Some(entry.mmetype as u16), message.kind().map(|kind| kind.mmtype()));
                assert_eq!(entry.outcome, Hp10Outcome::Decoded(message));
            }
            other => panic!("unexpected {}", other),
        }
    }
}

#[test]
fn registry_builds_match_their_layouts() {
    let codec = FrameCodec::new();
    let registries = codec.snapshot();

    for code in registries.av_codes() {
        let ops = registries.av(code).unwrap();
        let built = codec.encode_frame(code, None, Some(&HOST_MAC), &MmParams::None);
        match &ops.build {
            BuildOp::Empty | BuildOp::Absent => {
                let frame = built.unwrap();
                assert_eq!(frame.len(), ETHER_MIN_LEN, "0x{:04X}", code);
                assert_eq!(u16::from_le_bytes([frame[15], frame[16]]), code);
            }
            BuildOp::Encode(kind) => {
                assert_eq!(kind.mmtype(), code);
                assert_eq!(kind.family(), MmFamily::HomePlugAv);
                // builds needing caller data refuse to run without them
                if let Err(error) = built {
                    assert!(
                        matches!(error, FrameError::BuildFailed { mmtype, .. } if mmtype == code),
                        "0x{:04X}: {}",
                        code,
                        error
                    );
                }
            }
            BuildOp::Custom(_) => panic!("fresh codec holds a custom build for 0x{:04X}", code),
        }
    }

    for code in registries.hp10_codes() {
        let ops = registries.hp10(code).unwrap();
        if let BuildOp::Encode(kind) = &ops.build {
            assert_eq!(kind.mmtype(), code as u16);
            assert_eq!(kind.family(), MmFamily::HomePlug10);
        }
    }
}

#[test]
fn params_from_json_drive_builds() {
    let codec = FrameCodec::new();

    let params = params_from_json(
        r#"{"set_encryption_key":{"nmk_passphrase":"HomePlugAV0123","target":{"remote":{"dak_passphrase":"ABCD-EFGH-IJKL-MNOP"}}}}"#,
    )
    .unwrap();
    let frame = codec
        .encode_frame(0xA050, Some(&PLC_MAC), Some(&HOST_MAC), &params)
        .unwrap();
    match codec.decode_frame(&frame).unwrap().payload() {
        Some(MmPayload::SetEncryptionKeyRequest(request)) => {
            assert_eq!(request.nmk, derive_nmk("HomePlugAV0123"));
            assert_eq!(request.dak, derive_dak("ABCD-EFGH-IJKL-MNOP"));
            assert_eq!(request.rdra, BROADCAST_ADDR);
        }
        other => panic!("unexpected {:?}", other),
    }

    let params = params_from_json(r#"{"loopback":{"duration":5}}"#).unwrap();
    let frame = codec.encode_frame(0xA048, None, None, &params).unwrap();
    assert_eq!(frame[..6], INTELLON_LOCAL_ADDR);

    let params = params_from_json(r#"{"loopback":{"duration":61}}"#).unwrap();
    assert!(matches!(
        codec.encode_frame(0xA048, None, None, &params),
        Err(FrameError::BuildFailed { mmtype: 0xA048, .. })
    ));
}
