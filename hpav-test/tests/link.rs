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

use std::time::Duration;

use hpav::prelude::*;
use hpavtest::*;

fn device_reply(link: &FrameLink<LoopbackTransport>, payload: MmPayload) {
    let frame = link
        .codec()
        .encode_message(&payload, Some(&HOST_MAC), Some(&PLC_MAC))
        .unwrap();
    link.transport().inject(&frame).unwrap();
}

#[test]
fn request_returns_matching_confirm() {
    let link = loopback_link(100);
    let confirm = MmPayload::EnetPhyConfirm(EnetPhyConfirm {
        status: 0,
        speed: EnetSpeed::GigabitEthernet,
        duplex: 1,
    });
    // unrelated traffic before the expected confirm
    device_reply(
        &link,
        MmPayload::LoopbackStatusConfirm(LoopbackStatusConfirm {
            mstatus: 0,
            state: 0,
        }),
    );
    device_reply(&link, confirm.clone());

    let reply = link
        .request(0xA06C, &MmParams::None, 0xA06D)
        .unwrap()
        .unwrap();
    assert_eq!(reply.payload(), Some(&confirm));
    match reply {
        DecodedFrame::HomePlugAv(av) => assert_eq!(av.header.shost, PLC_MAC),
        other => panic!("unexpected {}", other),
    }
    // our own request echo is still queued
    assert_eq!(link.transport().pending(), 1);
}

#[test]
fn request_times_out_quietly() {
    let link = loopback_link(30);
    let reply = link.request(0xA000, &MmParams::None, 0xA001).unwrap();
    assert!(reply.is_none());
}

#[test]
fn send_failure_surfaces() {
    let link = loopback_link(30);
    assert!(matches!(
        link.send_request(0xA0FE, &MmParams::None),
        Err(FrameError::UnknownType(0xA0FE))
    ));
    assert!(matches!(
        link.request(0xA068, &MmParams::None, 0xA069),
        Err(FrameError::BuildFailed { mmtype: 0xA068, .. })
    ));
    assert_eq!(link.transport().pending(), 0);
}

#[test]
fn poll_reports_undecodable_frames() {
    let link = loopback_link(30);
    let mut frame = ether_header(&HOST_MAC, &PLC_MAC, ETH_P_HPAV);
    frame.extend_from_slice(&[0x00, 0xFE, 0xA0]);
    link.transport().inject(&frame).unwrap();
    assert_eq!(link.poll(), Err(FrameError::UnknownType(0xA0FE)));
    assert_eq!(link.poll(), Ok(None));
}

#[test]
fn send_message_pads_and_loops_back() {
    let link = loopback_link(30);
    let request = MmPayload::DeviceAttrsRequest(DeviceAttrsRequest {
        cookie: 0x0102_0304,
        rtype: 0,
    });
    assert_eq!(link.send_message(&request).unwrap(), ETHER_MIN_LEN);

    let raw = link
        .transport()
        .receive(Duration::from_millis(10))
        .unwrap()
        .unwrap();
    assert_eq!(raw.len(), ETHER_MIN_LEN);
    assert_eq!(raw[..6], INTELLON_LOCAL_ADDR);
    assert_eq!(raw[6..12], HOST_MAC);
    assert_eq!(raw[20..24], [0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn json_config_overrides_addresses() {
    let link = link_from_json(
        r#"{"iface":"plc0","srcmac":"02:00:00:aa:bb:cc","dstmac":"00:b0:52:12:34:56","timeout_ms":20}"#,
    )
    .unwrap();
    assert_eq!(link.config().iface, "plc0");
    assert_eq!(link.transport().iface(), "plc0");

    link.send_request(0xA038, &MmParams::None).unwrap();
    match link.poll().unwrap() {
        Some(DecodedFrame::HomePlugAv(av)) => {
            assert_eq!(av.header.shost, [0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC]);
            assert_eq!(av.header.dhost, PLC_MAC);
            assert_eq!(av.desc, "Network Info Request (Vendor-Specific)");
        }
        other => panic!("unexpected {:?}", other),
    }

    assert!(link_from_json(r#"{"srcmac":"02:00:00:aa:bb:cc"}"#).is_err());
}

#[test]
fn closed_link_refuses_traffic() {
    let link = loopback_link(30);
    link.close().unwrap();
    assert!(matches!(
        link.send_request(0xA000, &MmParams::None),
        Err(FrameError::Transport { .. })
    ));
    assert!(matches!(link.poll(), Err(FrameError::Transport { .. })));
}
