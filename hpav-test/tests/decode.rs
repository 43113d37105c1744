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

fn sw_version_body(version: &str) -> Vec<u8> {
    let mut body = vec![0x00, 0x03, version.len() as u8];
    let mut text = [0u8; 64];
    text[..version.len()].copy_from_slice(version.as_bytes());
    body.extend_from_slice(&text);
    body.push(0x01);
    body
}

#[test]
fn vendor_confirm_from_raw_bytes() {
    init_logger();
    let frame = vendor_frame(0xA001, &sw_version_body("INT6400-MAC-4-1-4102"));
    let decoded = decode_frame(&frame).unwrap();
    assert_eq!(decoded.mmtype(), Some(0xA001));
    match decoded.payload() {
        Some(MmPayload::SwVersionConfirm(confirm)) => {
            assert_eq!(confirm.device_id, DeviceId::Int6400);
            assert_eq!(confirm.version, "INT6400-MAC-4-1-4102");
            assert_eq!(confirm.upgradeable, 1);
        }
        other => panic!("unexpected {:?}", other),
    }
    match decoded {
        DecodedFrame::HomePlugAv(av) => {
            assert_eq!(av.mmver, HPAV_VERSION_1_0);
            assert_eq!(av.consumed, 68);
            assert_eq!(av.desc, "Get Device/SW Version Confirm");
        }
        other => panic!("unexpected {}", other),
    }
}

#[test]
fn vlan_tag_is_skipped() {
    let frame = vendor_frame(0xA001, &sw_version_body("1.0"));
    let plain = decode_frame(&frame).unwrap();
    let tagged = decode_frame(&vlan_tag(&frame, 42)).unwrap();
    assert_eq!(plain.payload(), tagged.payload());

    match tagged {
        DecodedFrame::HomePlugAv(av) => {
            assert_eq!(av.header.vlan, Some(42));
            assert_eq!(av.header.ether_type, ETH_P_HPAV);
            assert_eq!(av.header.dhost, HOST_MAC);
        }
        other => panic!("unexpected {}", other),
    }
}

#[test]
fn link_stats_counters_follow_direction() {
    let mut body = vec![0x00, 0x00, 0x00, 0x05];
    for counter in 1u64..=5 {
        body.extend_from_slice(&(counter * 1000).to_le_bytes());
    }
    match decode_frame(&vendor_frame(0xA031, &body)).unwrap().payload() {
        Some(MmPayload::LinkStatsConfirm(confirm)) => {
            assert_eq!(confirm.direction, StatsDirection::Tx);
            assert_eq!(confirm.tei, 5);
            let tx = confirm.tx.as_ref().unwrap();
            assert_eq!(tx.mpdu_ack, 1000);
            assert_eq!(tx.pb_failed, 5000);
            assert!(confirm.rx.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }

    // failed requests carry no counters even when bytes follow
    body[0] = 0x10;
    match decode_frame(&vendor_frame(0xA031, &body)).unwrap().payload() {
        Some(MmPayload::LinkStatsConfirm(confirm)) => {
            assert_eq!(confirm.mstatus, StatsStatus::InvalidLinkId);
            assert!(confirm.tx.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn other_ethertypes_are_ignored() {
    let mut frame = ether_header(&BROADCAST_ADDR, &HOST_MAC, 0x0800);
    frame.resize(ETHER_MIN_LEN, 0);
    assert_eq!(
        decode_frame(&frame).unwrap(),
        DecodedFrame::Ignored { ether_type: 0x0800 }
    );

    let tagged = vlan_tag(&frame, 7);
    assert_eq!(
        decode_frame(&tagged).unwrap(),
        DecodedFrame::Ignored { ether_type: 0x0800 }
    );
}

#[test]
fn unknown_reported_before_truncation() {
    // 0xA0FE is not registered and the frame stops after the MM header
    let mut frame = ether_header(&HOST_MAC, &PLC_MAC, ETH_P_HPAV);
    frame.extend_from_slice(&[0x00, 0xFE, 0xA0]);
    assert_eq!(decode_frame(&frame), Err(FrameError::UnknownType(0xA0FE)));

    // a registered confirm cut inside its payload
    let full = vendor_frame(0xA001, &sw_version_body("1.0"));
    let cut = &full[..ETHER_HDR_LEN + HPAV_HDR_LEN + HPAV_VENDOR_HDR_LEN + 10];
    assert!(matches!(
        decode_frame(cut),
        Err(FrameError::TruncatedInput { .. })
    ));
}

#[test]
fn hp10_multi_entry_frame() {
    let stats = [0x02u8; 22];
    let frame = hp10_frame(
        &PLC_MAC,
        &[
            Hp10Raw {
                mmetype: 0x00,
                version: 1,
                data: &[0x20],
            },
            Hp10Raw {
                mmetype: 0x1A,
                version: 0,
                data: &[0xAA, 0xBB],
            },
            Hp10Raw {
                mmetype: 0x03,
                version: 0,
                data: &[0x01, 0x02, 0x03],
            },
            Hp10Raw {
                mmetype: 0x08,
                version: 0,
                data: &stats,
            },
        ],
    );

    let hp10 = match decode_frame(&frame).unwrap() {
        DecodedFrame::HomePlug10(hp10) => hp10,
        other => panic!("unexpected {}", other),
    };
    assert_eq!(hp10.header.shost, PLC_MAC);
    assert_eq!(hp10.entries.len(), 4);

    assert_eq!(hp10.entries[0].version, 1);
    assert_eq!(
        hp10.entries[0].outcome,
        Hp10Outcome::Decoded(MmPayload::Hp10ChannelEstimationRequest(
            Hp10ChannelEstimationRequest { version: 2 }
        ))
    );
    assert_eq!(hp10.entries[1].outcome, Hp10Outcome::NotDecoded);
    assert_eq!(hp10.entries[1].desc, Some("Basic Network Statistics Confirm"));
    assert_eq!(hp10.entries[2].outcome, Hp10Outcome::Unknown);
    assert_eq!(hp10.entries[2].length, 3);
    match &hp10.entries[3].outcome {
        Hp10Outcome::Decoded(MmPayload::Hp10ParamsStatsConfirm(confirm)) => {
            assert_eq!(confirm.tx_ca0_cnt, 0x0202);
            assert_eq!(confirm.rx_cumul, 0x0202_0202);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn hp10_overrun_fails_whole_frame() {
    let mut frame = ether_header(&BROADCAST_ADDR, &PLC_MAC, ETH_P_HP10);
    // two entries announced, second one runs past the end
    frame.extend_from_slice(&[0x02, 0x00, 0x01, 0x10, 0x08, 0x40, 0x00]);
    assert!(matches!(
        decode_frame(&frame),
        Err(FrameError::TruncatedInput { .. })
    ));
}

#[test]
fn display_names_the_frame() {
    let decoded = decode_frame(&vendor_frame(0xA001, &sw_version_body("1.0"))).unwrap();
    let text = format!("{}", decoded);
    assert!(text.starts_with("HomePlugAv:{ mmtype:0xA001"), "{}", text);
    assert!(text.contains(&fmt_mac(&PLC_MAC)), "{}", text);
}
