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

//! Frame control (delimiter) and beacon MPDU payload decoders.
//!
//! A frame control is 16 bytes: byte 0 carries DT (bits 0-2), ACCESS (bit 3)
//! and SNID (bits 4-7), bytes 1-12 the 96 bit variant field and bytes 13-15
//! the FCCS. Field tables follow IEEE 1901 FFT order, LSB first.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

const VARIANT_BITS: usize = 96;
const FCCS_OFFSET: usize = 13;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BeaconDelimiter {
    pub bts: u32,
    pub bto: [u16; 4],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SofDelimiter {
    pub stei: u8,
    pub dtei: u8,
    pub lid: u8,
    pub cfs: bool,
    pub bdf: bool,
    pub hp10df: bool,
    pub hp11df: bool,
    pub eks: u8,
    pub ppb: u8,
    pub ble: u8,
    pub pbsz: bool,
    pub num_sym: u8,
    pub tmi_av: u8,
    pub fl_av: u16,
    pub mpdu_cnt: u8,
    pub burst_cnt: u8,
    pub bbf: bool,
    pub mrtfl: u8,
    pub dcppcf: bool,
    pub mcf: bool,
    pub mnbf: bool,
    pub rsr: bool,
    pub clst: bool,
    pub mfs_cmd_mgmt: u8,
    pub mfs_cmd_data: u8,
    pub mfs_rsp_mgmt: u8,
    pub mfs_rsp_data: u8,
    pub bm_sacki: u8,
}

// FL_AV counts 1.28 us units, codes up to 0x3D are reserved
fn fl_av_us(fl_av: u16) -> Option<f32> {
    match fl_av {
        0..=0x3D => None,
        fl => Some(fl as f32 * 1.28),
    }
}

impl SofDelimiter {
    /// Frame length in microseconds, None for reserved codes.
    pub fn frame_length_us(&self) -> Option<f32> {
        fl_av_us(self.fl_av)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SackDelimiter {
    pub dtei: u8,
    pub cfs: bool,
    pub bdf: bool,
    pub svn: bool,
    pub rrtf: bool,
    pub mfs_rsp_data: u8,
    pub mfs_rsp_mgmt: u8,
    pub sack_info: [u8; 10],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RtsCtsDelimiter {
    pub stei: u8,
    pub dtei: u8,
    pub lid: u8,
    pub cfs: bool,
    pub bdf: bool,
    pub hp10df: bool,
    pub hp11df: bool,
    pub rtsf: bool,
    pub igf: bool,
    pub mnbf: bool,
    pub mcf: bool,
    pub duration: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SoundDelimiter {
    pub stei: u8,
    pub dtei: u8,
    pub lid: u8,
    pub cfs: bool,
    pub pbsz: bool,
    pub bdf: bool,
    pub saf: bool,
    pub scf: bool,
    pub req_tm: u8,
    pub fl_av: u16,
    pub mpdu_cnt: u8,
    pub ppb: u8,
    pub src: u8,
    pub add_req_tm: u8,
    pub max_pb_sym: u8,
    pub ecsf: bool,
    pub ecuf: bool,
    pub ems: u8,
    pub esgisf: bool,
    pub elgisf: bool,
    pub efrs: u8,
}

impl SoundDelimiter {
    pub fn frame_length_us(&self) -> Option<f32> {
        fl_av_us(self.fl_av)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RsofDelimiter {
    pub dtei: u8,
    pub cfs: bool,
    pub bdf: bool,
    pub svn: bool,
    pub rrtf: bool,
    pub mfs_rsp_data: u8,
    pub mfs_rsp_mgmt: u8,
    pub sack_info: [u8; 7],
    pub rsof_fl: u16,
    pub tmi: u8,
    pub pbsz: bool,
    pub num_sym: u8,
    pub mfs_cmd_mgmt: u8,
    pub mfs_cmd_data: u8,
}

impl RsofDelimiter {
    /// Reverse SOF frame length in microseconds, None for reserved codes.
    /// Codes below 0x200 count 1.28 us units, the upper range 2.56 us.
    pub fn frame_length_us(&self) -> Option<f32> {
        match self.rsof_fl {
            0..=0x3D => None,
            fl if fl < 0x200 => Some(fl as f32 * 1.28),
            fl if fl <= 0x3FF => Some(fl as f32 * 2.56),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum DelimiterVariant {
    Beacon(BeaconDelimiter),
    StartOfFrame(SofDelimiter),
    SelectiveAck(SackDelimiter),
    RtsCts(RtsCtsDelimiter),
    Sound(SoundDelimiter),
    ReverseStartOfFrame(RsofDelimiter),
    Reserved { raw: [u8; 12] },
}

/// A decoded 16 byte frame control.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    pub delimiter_type: DelimiterType,
    pub access: bool,
    pub snid: u8,
    pub variant: DelimiterVariant,
    pub fccs: [u8; 3],
}

impl Delimiter {
    pub fn is_beacon(&self) -> bool {
        matches!(self.variant, DelimiterVariant::Beacon(_))
    }
}

fn decode_variant(kind: DelimiterType, bits: &mut BitReader) -> DelimiterVariant {
    match kind {
        DelimiterType::Beacon => DelimiterVariant::Beacon(BeaconDelimiter {
            bts: bits.take(32) as u32,
            bto: [
                bits.take_u16(16),
                bits.take_u16(16),
                bits.take_u16(16),
                bits.take_u16(16),
            ],
        }),
        DelimiterType::StartOfFrame => DelimiterVariant::StartOfFrame(SofDelimiter {
            stei: bits.take_u8(8),
            dtei: bits.take_u8(8),
            lid: bits.take_u8(8),
            cfs: bits.flag(),
            bdf: bits.flag(),
            hp10df: bits.flag(),
            hp11df: bits.flag(),
            eks: bits.take_u8(4),
            ppb: bits.take_u8(8),
            ble: bits.take_u8(8),
            pbsz: bits.flag(),
            num_sym: bits.take_u8(2),
            tmi_av: bits.take_u8(5),
            fl_av: bits.take_u16(12),
            mpdu_cnt: bits.take_u8(2),
            burst_cnt: bits.take_u8(2),
            bbf: bits.flag(),
            mrtfl: bits.take_u8(4),
            dcppcf: bits.flag(),
            mcf: bits.flag(),
            mnbf: bits.flag(),
            rsr: bits.flag(),
            clst: bits.flag(),
            mfs_cmd_mgmt: bits.take_u8(3),
            mfs_cmd_data: bits.take_u8(3),
            mfs_rsp_mgmt: bits.take_u8(2),
            mfs_rsp_data: bits.take_u8(2),
            bm_sacki: bits.take_u8(4),
        }),
        DelimiterType::SelectiveAck => DelimiterVariant::SelectiveAck(SackDelimiter {
            dtei: bits.take_u8(8),
            cfs: bits.flag(),
            bdf: bits.flag(),
            svn: bits.flag(),
            rrtf: bits.flag(),
            mfs_rsp_data: bits.take_u8(2),
            mfs_rsp_mgmt: bits.take_u8(2),
            sack_info: bits.take_bytes(),
        }),
        DelimiterType::RtsCts => {
            let variant = RtsCtsDelimiter {
                stei: bits.take_u8(8),
                dtei: bits.take_u8(8),
                lid: bits.take_u8(8),
                cfs: bits.flag(),
                bdf: bits.flag(),
                hp10df: bits.flag(),
                hp11df: bits.flag(),
                rtsf: bits.flag(),
                igf: bits.flag(),
                mnbf: bits.flag(),
                mcf: bits.flag(),
                duration: bits.take_u16(16),
            };
            bits.skip(48);
            DelimiterVariant::RtsCts(variant)
        }
        DelimiterType::Sound => {
            let stei = bits.take_u8(8);
            let dtei = bits.take_u8(8);
            let lid = bits.take_u8(8);
            let cfs = bits.flag();
            let pbsz = bits.flag();
            let bdf = bits.flag();
            let saf = bits.flag();
            let scf = bits.flag();
            let req_tm = bits.take_u8(3);
            let fl_av = bits.take_u16(12);
            let mpdu_cnt = bits.take_u8(2);
            bits.skip(2);
            let ppb = bits.take_u8(8);
            let src = bits.take_u8(8);
            let add_req_tm = bits.take_u8(3);
            let max_pb_sym = bits.take_u8(3);
            let ecsf = bits.flag();
            let ecuf = bits.flag();
            let ems = bits.take_u8(2);
            let esgisf = bits.flag();
            let elgisf = bits.flag();
            let efrs = bits.take_u8(2);
            bits.skip(18);
            DelimiterVariant::Sound(SoundDelimiter {
                stei,
                dtei,
                lid,
                cfs,
                pbsz,
                bdf,
                saf,
                scf,
                req_tm,
                fl_av,
                mpdu_cnt,
                ppb,
                src,
                add_req_tm,
                max_pb_sym,
                ecsf,
                ecuf,
                ems,
                esgisf,
                elgisf,
                efrs,
            })
        }
        DelimiterType::ReverseStartOfFrame => DelimiterVariant::ReverseStartOfFrame(RsofDelimiter {
            dtei: bits.take_u8(8),
            cfs: bits.flag(),
            bdf: bits.flag(),
            svn: bits.flag(),
            rrtf: bits.flag(),
            mfs_rsp_data: bits.take_u8(2),
            mfs_rsp_mgmt: bits.take_u8(2),
            sack_info: bits.take_bytes(),
            rsof_fl: bits.take_u16(10),
            tmi: bits.take_u8(5),
            pbsz: bits.flag(),
            num_sym: bits.take_u8(2),
            mfs_cmd_mgmt: bits.take_u8(3),
            mfs_cmd_data: bits.take_u8(3),
        }),
        DelimiterType::Unknown(_) => DelimiterVariant::Reserved {
            raw: bits.take_bytes(),
        },
    }
}

/// Decodes a frame control. Only the length is checked: every 3 bit type
/// maps to a variant, reserved codes keep their raw bits.
pub fn decode_delimiter(bytes: &[u8]) -> FrameResult<Delimiter> {
    if bytes.len() < HPAV_FC_LEN {
        return Err(FrameError::truncated("frame control", HPAV_FC_LEN, bytes.len()));
    }

    let mut bits = BitReader::new(&bytes[..HPAV_FC_LEN]);
    let delimiter_type = DelimiterType::from(bits.take_u8(3));
    let access = bits.flag();
    let snid = bits.take_u8(4);

    let variant = decode_variant(delimiter_type, &mut bits);
    debug_assert_eq!(bits.position(), 8 + VARIANT_BITS);

    let mut fccs = [0u8; 3];
    fccs.copy_from_slice(&bytes[FCCS_OFFSET..HPAV_FC_LEN]);

    Ok(Delimiter {
        delimiter_type,
        access,
        snid,
        variant,
        fccs,
    })
}

/// Beacon MPDU payload carried after a beacon frame control.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BeaconMpduPayload {
    pub nid: HpavNid,
    pub hybrid_mode: HybridMode,
    pub stei: u8,
    pub beacon_type: BeaconType,
    pub ncnr: bool,
    pub npsm: bool,
    pub num_slots: u8,
    pub slot_usage: u8,
    pub slot_id: u8,
    pub aclss: u8,
    pub hoip: bool,
    pub rtsbf: bool,
    pub network_mode: NetworkMode,
    pub cco_cap: CcoCapability,
    pub rsf: bool,
    pub plevel: u8,
    pub mgmt_info: Vec<u8>,
    pub bpcs: u32,
}

const BEACON_MGMT_OFFSET: usize = 12;
const BEACON_BPCS_OFFSET: usize = 132;

impl BeaconMpduPayload {
    pub fn slot_in_use(&self, slot: u8) -> bool {
        slot < 8 && self.slot_usage & (1 << slot) != 0
    }
}

pub fn decode_beacon_payload(bytes: &[u8]) -> FrameResult<BeaconMpduPayload> {
    if bytes.len() < HPAV_BEACON_PAYLOAD_LEN {
        return Err(FrameError::truncated(
            "beacon payload",
            HPAV_BEACON_PAYLOAD_LEN,
            bytes.len(),
        ));
    }

    let mut bits = BitReader::new(&bytes[..BEACON_MGMT_OFFSET]);
    let nid_bits = bits.take(54);
    let hybrid_mode = HybridMode::from(bits.take_u8(2));
    let mut nid: HpavNid = [0; 7];
    nid.copy_from_slice(&nid_bits.to_le_bytes()[..7]);

    let payload = BeaconMpduPayload {
        nid,
        hybrid_mode,
        stei: bits.take_u8(8),
        // IEEE 1901 beacon header: NID 54, HM 2, STEI 8, BT 3, NCNR, NPSM,
        // NumSlots 3, SlotUsage 8, SlotID 3, ACLSS 3, HOIP, RTSBF, NM 2,
        // CCoCap 2, RSF, PLevel 3 = 96 bits
        beacon_type: BeaconType::from(bits.take_u8(3)),
        ncnr: bits.flag(),
        npsm: bits.flag(),
        num_slots: bits.take_u8(3),
        slot_usage: bits.take_u8(8),
        slot_id: bits.take_u8(3),
        aclss: bits.take_u8(3),
        hoip: bits.flag(),
        rtsbf: bits.flag(),
        network_mode: NetworkMode::from(bits.take_u8(2)),
        cco_cap: CcoCapability::from(bits.take_u8(2)),
        rsf: bits.flag(),
        plevel: bits.take_u8(3),
        mgmt_info: bytes[BEACON_MGMT_OFFSET..BEACON_BPCS_OFFSET].to_vec(),
        bpcs: u32::from_le_bytes([
            bytes[BEACON_BPCS_OFFSET],
            bytes[BEACON_BPCS_OFFSET + 1],
            bytes[BEACON_BPCS_OFFSET + 2],
            bytes[BEACON_BPCS_OFFSET + 3],
        ]),
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_control(dt: u8, access: bool, snid: u8, fields: &[(usize, u64)]) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let mut bits = BitWriter::new(&mut buf);
        bits.put(3, dt as u64);
        bits.flag(access);
        bits.put(4, snid as u64);
        for (width, value) in fields {
            bits.put(*width, *value);
        }
        buf[13..].copy_from_slice(&[0xC1, 0xC2, 0xC3]);
        buf
    }

    #[test]
    fn too_short_is_truncated() {
        assert_eq!(
            decode_delimiter(&[0u8; 15]),
            Err(FrameError::TruncatedInput {
                what: "frame control",
                need: 16,
                got: 15
            })
        );
    }

    #[test]
    fn beacon_fields() {
        let buf = frame_control(
            0,
            true,
            0x9,
            &[
                (32, 0x1234_5678),
                (16, 0x0102),
                (16, 0x0304),
                (16, 0x0506),
                (16, 0x0708),
            ],
        );
        // byte 0: DT=0, ACCESS=1, SNID=9
        assert_eq!(buf[0], 0x98);
        // BTS little-endian straight after the common byte
        assert_eq!(buf[1..5], [0x78, 0x56, 0x34, 0x12]);

        let fc = decode_delimiter(&buf).unwrap();
        assert_eq!(fc.delimiter_type, DelimiterType::Beacon);
        assert!(fc.access);
        assert_eq!(fc.snid, 0x9);
        assert_eq!(fc.fccs, [0xC1, 0xC2, 0xC3]);
        assert!(fc.is_beacon());
        assert_eq!(
            fc.variant,
            DelimiterVariant::Beacon(BeaconDelimiter {
                bts: 0x1234_5678,
                bto: [0x0102, 0x0304, 0x0506, 0x0708],
            })
        );
    }

    #[test]
    fn sof_fields() {
        let buf = frame_control(
            1,
            false,
            0x3,
            &[
                (8, 0x11),  // stei
                (8, 0x22),  // dtei
                (8, 0x01),  // lid
                (1, 1),     // cfs
                (1, 0),     // bdf
                (1, 1),     // hp10df
                (1, 0),     // hp11df
                (4, 0x0F),  // eks
                (8, 0x44),  // ppb
                (8, 0x55),  // ble
                (1, 1),     // pbsz
                (2, 0x2),   // num_sym
                (5, 0x13),  // tmi_av
                (12, 0xABC), // fl_av
                (2, 0x1),   // mpdu_cnt
                (2, 0x3),   // burst_cnt
                (1, 1),     // bbf
                (4, 0x9),   // mrtfl
                (1, 0),     // dcppcf
                (1, 1),     // mcf
                (1, 1),     // mnbf
                (1, 0),     // rsr
                (1, 1),     // clst
                (3, 0x5),   // mfs_cmd_mgmt
                (3, 0x6),   // mfs_cmd_data
                (2, 0x1),   // mfs_rsp_mgmt
                (2, 0x2),   // mfs_rsp_data
                (4, 0xA),   // bm_sacki
            ],
        );
        let fc = decode_delimiter(&buf).unwrap();
        let sof = match fc.variant {
            DelimiterVariant::StartOfFrame(sof) => sof,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            sof,
            SofDelimiter {
                stei: 0x11,
                dtei: 0x22,
                lid: 0x01,
                cfs: true,
                bdf: false,
                hp10df: true,
                hp11df: false,
                eks: 0x0F,
                ppb: 0x44,
                ble: 0x55,
                pbsz: true,
                num_sym: 2,
                tmi_av: 0x13,
                fl_av: 0xABC,
                mpdu_cnt: 1,
                burst_cnt: 3,
                bbf: true,
                mrtfl: 9,
                dcppcf: false,
                mcf: true,
                mnbf: true,
                rsr: false,
                clst: true,
                mfs_cmd_mgmt: 5,
                mfs_cmd_data: 6,
                mfs_rsp_mgmt: 1,
                mfs_rsp_data: 2,
                bm_sacki: 0xA,
            }
        );
        // last variant nibble sits just before the FCCS
        assert_eq!(buf[12] >> 4, 0xA);
        assert_eq!(sof.frame_length_us(), Some(0xABC as f32 * 1.28));
    }

    #[test]
    fn sack_keeps_raw_info() {
        let mut fields: Vec<(usize, u64)> = vec![(8, 0x42), (1, 1), (1, 1), (1, 0), (1, 1), (2, 2), (2, 1)];
        for idx in 0..10u64 {
            fields.push((8, 0xE0 + idx));
        }
        let fc = decode_delimiter(&frame_control(2, false, 0, &fields)).unwrap();
        assert_eq!(
            fc.variant,
            DelimiterVariant::SelectiveAck(SackDelimiter {
                dtei: 0x42,
                cfs: true,
                bdf: true,
                svn: false,
                rrtf: true,
                mfs_rsp_data: 2,
                mfs_rsp_mgmt: 1,
                sack_info: [0xE0, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9],
            })
        );
    }

    #[test]
    fn rts_cts_duration() {
        let fields: [(usize, u64); 6] = [
            (8, 1),
            (8, 2),
            (8, 3),
            (4, 0b0101),
            (4, 0b1010),
            (16, 0xBEEF),
        ];
        let fc = decode_delimiter(&frame_control(3, false, 1, &fields)).unwrap();
        match fc.variant {
            DelimiterVariant::RtsCts(rts) => {
                assert_eq!((rts.stei, rts.dtei, rts.lid), (1, 2, 3));
                assert!(rts.cfs && !rts.bdf && rts.hp10df && !rts.hp11df);
                assert!(!rts.rtsf && rts.igf && !rts.mnbf && rts.mcf);
                assert_eq!(rts.duration, 0xBEEF);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn sound_fields() {
        let fields: [(usize, u64); 18] = [
            (8, 0x10),
            (8, 0x20),
            (8, 0x30),
            (5, 0b10011),
            (3, 0x6),
            (12, 0x321),
            (2, 0x3),
            (2, 0),
            (8, 0x77),
            (8, 0x88),
            (3, 0x2),
            (3, 0x7),
            (1, 1),
            (1, 0),
            (2, 0x1),
            (1, 0),
            (1, 1),
            (2, 0x3),
        ];
        let fc = decode_delimiter(&frame_control(4, false, 2, &fields)).unwrap();
        match fc.variant {
            DelimiterVariant::Sound(sound) => {
                assert_eq!((sound.stei, sound.dtei, sound.lid), (0x10, 0x20, 0x30));
                assert!(sound.cfs && sound.pbsz && !sound.bdf && !sound.saf && sound.scf);
                assert_eq!(sound.req_tm, 6);
                assert_eq!(sound.fl_av, 0x321);
                assert_eq!(sound.frame_length_us(), Some(0x321 as f32 * 1.28));
                assert_eq!(sound.mpdu_cnt, 3);
                assert_eq!((sound.ppb, sound.src), (0x77, 0x88));
                assert_eq!((sound.add_req_tm, sound.max_pb_sym), (2, 7));
                assert!(sound.ecsf && !sound.ecuf);
                assert_eq!(sound.ems, 1);
                assert!(!sound.esgisf && sound.elgisf);
                assert_eq!(sound.efrs, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rsof_fields_and_length() {
        let mut fields: Vec<(usize, u64)> = vec![(8, 0x05), (4, 0b1001), (2, 1), (2, 2)];
        for idx in 0..7u64 {
            fields.push((8, idx));
        }
        fields.extend_from_slice(&[(10, 0x250), (5, 0x1F), (1, 1), (2, 3), (3, 4), (3, 5)]);
        let fc = decode_delimiter(&frame_control(5, false, 0, &fields)).unwrap();
        match fc.variant {
            DelimiterVariant::ReverseStartOfFrame(rsof) => {
                assert_eq!(rsof.dtei, 5);
                assert!(rsof.cfs && !rsof.bdf && !rsof.svn && rsof.rrtf);
                assert_eq!(rsof.sack_info, [0, 1, 2, 3, 4, 5, 6]);
                assert_eq!(rsof.rsof_fl, 0x250);
                assert_eq!(rsof.tmi, 0x1F);
                assert!(rsof.pbsz);
                assert_eq!(rsof.num_sym, 3);
                assert_eq!((rsof.mfs_cmd_mgmt, rsof.mfs_cmd_data), (4, 5));
                assert_eq!(rsof.frame_length_us(), Some(0x250 as f32 * 2.56));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn decoded_sof_with_reserved_length() {
        // 56 bits of addressing and modulation ahead of FL_AV
        let buf = frame_control(1, false, 0, &[(56, 0), (12, 0x10)]);
        match decode_delimiter(&buf).unwrap().variant {
            DelimiterVariant::StartOfFrame(sof) => {
                assert_eq!(sof.fl_av, 0x10);
                assert_eq!(sof.frame_length_us(), None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fl_av_reserved_lengths() {
        let mut sof = SofDelimiter {
            fl_av: 0x10,
            ..Default::default()
        };
        assert_eq!(sof.frame_length_us(), None);
        sof.fl_av = 0x3D;
        assert_eq!(sof.frame_length_us(), None);
        sof.fl_av = 0x3E;
        assert_eq!(sof.frame_length_us(), Some(0x3E as f32 * 1.28));

        let mut sound = SoundDelimiter {
            fl_av: 0x3D,
            ..Default::default()
        };
        assert_eq!(sound.frame_length_us(), None);
        sound.fl_av = 0x3E;
        assert_eq!(sound.frame_length_us(), Some(0x3E as f32 * 1.28));
    }

    #[test]
    fn rsof_reserved_lengths() {
        let mut rsof = RsofDelimiter {
            dtei: 0,
            cfs: false,
            bdf: false,
            svn: false,
            rrtf: false,
            mfs_rsp_data: 0,
            mfs_rsp_mgmt: 0,
            sack_info: [0; 7],
            rsof_fl: 0x10,
            tmi: 0,
            pbsz: false,
            num_sym: 0,
            mfs_cmd_mgmt: 0,
            mfs_cmd_data: 0,
        };
        assert_eq!(rsof.frame_length_us(), None);
        rsof.rsof_fl = 0x100;
        assert_eq!(rsof.frame_length_us(), Some(0x100 as f32 * 1.28));
    }

    #[test]
    fn reserved_type_keeps_raw_bits() {
        let mut buf = [0u8; 16];
        buf[0] = 0x07;
        buf[1] = 0xAA;
        buf[12] = 0x55;
        let fc = decode_delimiter(&buf).unwrap();
        assert_eq!(fc.delimiter_type, DelimiterType::Unknown(7));
        match fc.variant {
            DelimiterVariant::Reserved { raw } => {
                assert_eq!(raw[0], 0xAA);
                assert_eq!(raw[11], 0x55);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    fn beacon_payload() -> Vec<u8> {
        let mut buf = vec![0u8; HPAV_BEACON_PAYLOAD_LEN];
        {
            let mut bits = BitWriter::new(&mut buf[..12]);
            bits.put(54, 0x0012_3456_789A_BCDE & ((1 << 54) - 1));
            bits.put(2, 2); // hybrid mode
            bits.put(8, 0x07); // stei
            bits.put(3, 5); // reserved beacon type
            bits.flag(true);
            bits.flag(false);
            bits.put(3, 6);
            bits.put(8, 0b1000_0101);
            bits.put(3, 2);
            bits.put(3, 4);
            bits.flag(false);
            bits.flag(true);
            bits.put(2, 1);
            bits.put(2, 2);
            bits.flag(true);
            bits.put(3, 3);
        }
        buf[12] = 0x01;
        buf[131] = 0xFE;
        buf[132..136].copy_from_slice(&0xCAFEBABEu32.to_le_bytes());
        buf
    }

    #[test]
    fn beacon_payload_fields() {
        let payload = decode_beacon_payload(&beacon_payload()).unwrap();
        assert_eq!(payload.nid, [0xDE, 0xBC, 0x9A, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(payload.hybrid_mode, HybridMode::FullHybrid);
        assert_eq!(payload.stei, 0x07);
        assert_eq!(payload.beacon_type, BeaconType::Unknown(5));
        assert!(payload.ncnr && !payload.npsm);
        assert_eq!(payload.num_slots, 6);
        assert!(payload.slot_in_use(0));
        assert!(!payload.slot_in_use(1));
        assert!(payload.slot_in_use(7));
        assert!(!payload.slot_in_use(8));
        assert_eq!((payload.slot_id, payload.aclss), (2, 4));
        assert!(!payload.hoip && payload.rtsbf);
        assert_eq!(payload.network_mode, NetworkMode::Coordinated);
        assert_eq!(payload.cco_cap, CcoCapability::Level2);
        assert!(payload.rsf);
        assert_eq!(payload.plevel, 3);
        assert_eq!(payload.mgmt_info.len(), 120);
        assert_eq!(payload.mgmt_info[0], 0x01);
        assert_eq!(payload.mgmt_info[119], 0xFE);
        assert_eq!(payload.bpcs, 0xCAFEBABE);
    }

    #[test]
    fn beacon_payload_needs_136_bytes() {
        let buf = beacon_payload();
        assert!(matches!(
            decode_beacon_payload(&buf[..135]),
            Err(FrameError::TruncatedInput { need: 136, got: 135, .. })
        ));
    }
}
