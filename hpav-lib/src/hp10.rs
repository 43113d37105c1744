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

//! HomePlug 1.0 MAC management entry payloads (ethertype 0x887B).

use serde::{Deserialize, Serialize};

use crate::prelude::*;

// 00 - Channel Estimation Request

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hp10ChannelEstimationRequest {
    /// 4 bit version, upper nibble
    pub version: u8,
}

impl MmeCodec for Hp10ChannelEstimationRequest {
    const NAME: &'static str = "HP1.0 channel estimation request";
    const MIN_LEN: usize = 1;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(Hp10ChannelEstimationRequest {
            version: reader.u8()? >> 4,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8((self.version & 0x0F) << 4)
    }
}

// 08 - Parameters and Statistics Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Hp10ParamsStatsConfirm {
    pub tx_ack_cnt: u16,
    pub tx_nack_cnt: u16,
    pub tx_fail_cnt: u16,
    pub tx_cont_loss_cnt: u16,
    pub tx_coll_cnt: u16,
    pub tx_ca3_cnt: u16,
    pub tx_ca2_cnt: u16,
    pub tx_ca1_cnt: u16,
    pub tx_ca0_cnt: u16,
    /// bytes per 40 symbol packet
    pub rx_cumul: u32,
}

impl MmeCodec for Hp10ParamsStatsConfirm {
    const NAME: &'static str = "HP1.0 parameters and statistics confirm";
    const MIN_LEN: usize = 9 * 2 + 4;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(Hp10ParamsStatsConfirm {
            tx_ack_cnt: reader.u16_le()?,
            tx_nack_cnt: reader.u16_le()?,
            tx_fail_cnt: reader.u16_le()?,
            tx_cont_loss_cnt: reader.u16_le()?,
            tx_coll_cnt: reader.u16_le()?,
            tx_ca3_cnt: reader.u16_le()?,
            tx_ca2_cnt: reader.u16_le()?,
            tx_ca1_cnt: reader.u16_le()?,
            tx_ca0_cnt: reader.u16_le()?,
            rx_cumul: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        for count in [
            self.tx_ack_cnt,
            self.tx_nack_cnt,
            self.tx_fail_cnt,
            self.tx_cont_loss_cnt,
            self.tx_coll_cnt,
            self.tx_ca3_cnt,
            self.tx_ca2_cnt,
            self.tx_ca1_cnt,
            self.tx_ca0_cnt,
        ] {
            writer.put_u16_le(count)?;
        }
        writer.put_u32_le(self.rx_cumul)
    }
}

// 1C - Extended Network Statistics Confirm

pub const HP10_NUM_TONE_MAP: usize = 15;
const HP10_TONE_MAP_LEN: usize = ETHER_ADDR_LEN + 6;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Hp10ToneMapStats {
    pub netw_da: HpavMac,
    pub bytes40: u16,
    pub fails: u16,
    pub drops: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Hp10NetworkStatsConfirm {
    pub icid: u8,
    pub ac: bool,
    pub bytes40_robo: u16,
    pub fails_robo: u16,
    pub drops_robo: u16,
    pub tone_maps: Vec<Hp10ToneMapStats>,
}

impl MmeCodec for Hp10NetworkStatsConfirm {
    const NAME: &'static str = "HP1.0 extended network statistics confirm";
    const MIN_LEN: usize = 7 + HP10_NUM_TONE_MAP * HP10_TONE_MAP_LEN;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let flags = reader.u8()?;
        let mut confirm = Hp10NetworkStatsConfirm {
            icid: flags & 0x7F,
            ac: flags & 0x80 != 0,
            bytes40_robo: reader.u16_le()?,
            fails_robo: reader.u16_le()?,
            drops_robo: reader.u16_le()?,
            tone_maps: Vec::with_capacity(HP10_NUM_TONE_MAP),
        };
        for _ in 0..HP10_NUM_TONE_MAP {
            confirm.tone_maps.push(Hp10ToneMapStats {
                netw_da: reader.array()?,
                bytes40: reader.u16_le()?,
                fails: reader.u16_le()?,
                drops: reader.u16_le()?,
            });
        }
        Ok(confirm)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        if self.tone_maps.len() > HP10_NUM_TONE_MAP {
            return Err(FrameError::invalid(
                "tone maps",
                format!("{} > {}", self.tone_maps.len(), HP10_NUM_TONE_MAP),
            ));
        }
        writer.put_u8((self.icid & 0x7F) | ((self.ac as u8) << 7))?;
        writer.put_u16_le(self.bytes40_robo)?;
        writer.put_u16_le(self.fails_robo)?;
        writer.put_u16_le(self.drops_robo)?;
        for map in &self.tone_maps {
            writer.put_bytes(&map.netw_da)?;
            writer.put_u16_le(map.bytes40)?;
            writer.put_u16_le(map.fails)?;
            writer.put_u16_le(map.drops)?;
        }
        // the table is fixed size on the wire
        writer.put_zeros((HP10_NUM_TONE_MAP - self.tone_maps.len()) * HP10_TONE_MAP_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_estimation_version_nibble() {
        let (request, used) = decode_mme::<Hp10ChannelEstimationRequest>(&[0x3A]).unwrap();
        assert_eq!(request.version, 3);
        assert_eq!(used, 1);

        let mut buf = [0u8; 1];
        Hp10ChannelEstimationRequest { version: 0x13 }
            .encode(&mut FrameWriter::new(&mut buf))
            .unwrap();
        assert_eq!(buf, [0x30]);
    }

    #[test]
    fn params_stats_counters() {
        let mut raw = Vec::new();
        for idx in 1u16..=9 {
            raw.extend_from_slice(&idx.to_le_bytes());
        }
        raw.extend_from_slice(&0x00010203u32.to_le_bytes());

        let (confirm, used) = decode_mme::<Hp10ParamsStatsConfirm>(&raw).unwrap();
        assert_eq!(used, 22);
        assert_eq!(confirm.tx_ack_cnt, 1);
        assert_eq!(confirm.tx_cont_loss_cnt, 4);
        assert_eq!(confirm.tx_ca0_cnt, 9);
        assert_eq!(confirm.rx_cumul, 0x00010203);

        assert!(matches!(
            decode_mme::<Hp10ParamsStatsConfirm>(&raw[..21]),
            Err(FrameError::TruncatedInput { need: 22, got: 21, .. })
        ));
    }

    #[test]
    fn network_stats_table() {
        let confirm = Hp10NetworkStatsConfirm {
            icid: 0x05,
            ac: true,
            bytes40_robo: 40,
            fails_robo: 2,
            drops_robo: 1,
            tone_maps: vec![Hp10ToneMapStats {
                netw_da: [0x00, 0x50, 0xC2, 0x00, 0x00, 0x01],
                bytes40: 100,
                fails: 3,
                drops: 0,
            }],
        };
        let mut buf = vec![0u8; 256];
        let mut writer = FrameWriter::new(&mut buf);
        confirm.encode(&mut writer).unwrap();
        let len = writer.position();
        assert_eq!(len, 187);
        assert_eq!(buf[0], 0x85);

        let (decoded, used) = decode_mme::<Hp10NetworkStatsConfirm>(&buf[..len]).unwrap();
        assert_eq!(used, 187);
        assert_eq!(decoded.tone_maps.len(), HP10_NUM_TONE_MAP);
        assert_eq!(decoded.tone_maps[0], confirm.tone_maps[0]);
        assert_eq!(decoded.tone_maps[14], Hp10ToneMapStats::default());
        assert!(decoded.ac);
        assert_eq!(decoded.icid, 5);
    }
}
