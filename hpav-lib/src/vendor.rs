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

//! Intellon vendor specific messages (MMType 0xA000-0xA071, OUI 00:B0:52).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::prelude::*;

const MMTYPE_WRITE_MODULE_REQ: u16 = 0xA020;
const MMTYPE_LOOPBACK_REQ: u16 = 0xA048;

fn put_len_u16(writer: &mut FrameWriter, len: usize, what: &'static str) -> FrameResult<()> {
    let len = u16::try_from(len).map_err(|_| FrameError::invalid(what, "longer than 65535"))?;
    writer.put_u16_le(len)
}

fn put_len_u32(writer: &mut FrameWriter, len: usize, what: &'static str) -> FrameResult<()> {
    let len = u32::try_from(len).map_err(|_| FrameError::invalid(what, "too long"))?;
    writer.put_u32_le(len)
}

/// Single status byte replies (reset, set key, SDRAM, host action).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusReply {
    pub mstatus: u8,
}

impl MmeCodec for StatusReply {
    const NAME: &'static str = "status reply";
    const MIN_LEN: usize = 1;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(StatusReply {
            mstatus: reader.u8()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)
    }
}

/// Status plus module id (start MAC, module write indicate, NVM write).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleReply {
    pub mstatus: ModuleStatus,
    pub module_id: ModuleId,
}

impl MmeCodec for ModuleReply {
    const NAME: &'static str = "module reply";
    const MIN_LEN: usize = 2;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(ModuleReply {
            mstatus: ModuleStatus::from(reader.u8()?),
            module_id: ModuleId::from(reader.u8()?),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus.into())?;
        writer.put_u8(self.module_id.into())
    }
}

/// Watchdog and check point report requests.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionRequest {
    pub session_id: u16,
    pub clr_flag: bool,
}

impl MmeCodec for SessionRequest {
    const NAME: &'static str = "report session request";
    const MIN_LEN: usize = 3;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(SessionRequest {
            session_id: reader.u16_le()?,
            clr_flag: reader.u8()? != 0,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u16_le(self.session_id)?;
        writer.put_u8(self.clr_flag as u8)
    }
}

// A001 - Get Device/SW Version Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SwVersionConfirm {
    pub mstatus: u8,
    pub device_id: DeviceId,
    pub version: String,
    pub upgradeable: u8,
}

const SW_VERSION_LEN: usize = 64;

impl MmeCodec for SwVersionConfirm {
    const NAME: &'static str = "get SW version confirm";
    const MIN_LEN: usize = 3 + SW_VERSION_LEN + 1;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = reader.u8()?;
        let device_id = DeviceId::from(reader.u8()?);
        let length = (reader.u8()? as usize).min(SW_VERSION_LEN);
        let raw = reader.bytes(SW_VERSION_LEN)?;
        let mut text = ByteReader::new(&raw[..length], Self::NAME);
        Ok(SwVersionConfirm {
            mstatus,
            device_id,
            version: text.text(length)?,
            upgradeable: reader.u8()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u8(self.device_id.into())?;
        writer.put_u8(self.version.len().min(SW_VERSION_LEN) as u8)?;
        writer.put_text(&self.version, SW_VERSION_LEN)?;
        writer.put_u8(self.upgradeable)
    }
}

impl fmt::Display for SwVersionConfirm {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!(
            "SwVersion:{{ status:{}, device:{:?}, version:'{}', upgradeable:{} }}",
            self.mstatus, self.device_id, self.version, self.upgradeable
        );
        fmt.pad(&text)
    }
}

// A004 - Write MAC Memory Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteMacMemoryRequest {
    pub address: u32,
    pub data: Vec<u8>,
}

impl MmeCodec for WriteMacMemoryRequest {
    const NAME: &'static str = "write MAC memory request";
    const MIN_LEN: usize = 8;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let address = reader.u32_le()?;
        let length = reader.u32_le()? as usize;
        Ok(WriteMacMemoryRequest {
            address,
            data: reader.bytes(length)?.to_vec(),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u32_le(self.address)?;
        put_len_u32(writer, self.data.len(), "MAC memory data")?;
        writer.put_bytes(&self.data)
    }
}

// A005 - Write MAC Memory Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteMacMemoryConfirm {
    pub mstatus: u8,
    pub address: u32,
    pub length: u32,
}

impl MmeCodec for WriteMacMemoryConfirm {
    const NAME: &'static str = "write MAC memory confirm";
    const MIN_LEN: usize = 9;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(WriteMacMemoryConfirm {
            mstatus: reader.u8()?,
            address: reader.u32_le()?,
            length: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u32_le(self.address)?;
        writer.put_u32_le(self.length)
    }
}

// A008 - Read MAC Memory Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadMacMemoryRequest {
    pub address: u32,
    pub length: u32,
}

impl MmeCodec for ReadMacMemoryRequest {
    const NAME: &'static str = "read MAC memory request";
    const MIN_LEN: usize = 8;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(ReadMacMemoryRequest {
            address: reader.u32_le()?,
            length: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u32_le(self.address)?;
        writer.put_u32_le(self.length)
    }
}

// A009 - Read MAC Memory Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadMacMemoryConfirm {
    pub mstatus: u8,
    pub address: u32,
    pub data: Vec<u8>,
}

impl MmeCodec for ReadMacMemoryConfirm {
    const NAME: &'static str = "read MAC memory confirm";
    const MIN_LEN: usize = 9;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = reader.u8()?;
        let address = reader.u32_le()?;
        let length = reader.u32_le()? as usize;
        let data = if mstatus == 0 {
            reader.bytes(length)?.to_vec()
        } else {
            Vec::new()
        };
        Ok(ReadMacMemoryConfirm {
            mstatus,
            address,
            data,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u32_le(self.address)?;
        put_len_u32(writer, self.data.len(), "MAC memory data")?;
        writer.put_bytes(&self.data)
    }
}

// A00C - Start MAC Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StartMacRequest {
    pub module_id: ModuleId,
    pub image_load: u32,
    pub image_length: u32,
    pub image_chksum: u32,
    pub image_saddr: u32,
}

impl MmeCodec for StartMacRequest {
    const NAME: &'static str = "start MAC request";
    const MIN_LEN: usize = 20;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let module_id = ModuleId::from(reader.u8()?);
        reader.skip(3)?;
        Ok(StartMacRequest {
            module_id,
            image_load: reader.u32_le()?,
            image_length: reader.u32_le()?,
            image_chksum: reader.u32_le()?,
            image_saddr: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.module_id.into())?;
        writer.put_zeros(3)?;
        writer.put_u32_le(self.image_load)?;
        writer.put_u32_le(self.image_length)?;
        writer.put_u32_le(self.image_chksum)?;
        writer.put_u32_le(self.image_saddr)
    }
}

// A011 - Get NVM Parameters Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NvmParametersConfirm {
    pub mstatus: u8,
    pub manuf_code: u32,
    pub page_size: u32,
    pub block_size: u32,
    pub mem_size: u32,
}

impl MmeCodec for NvmParametersConfirm {
    const NAME: &'static str = "get NVM parameters confirm";
    const MIN_LEN: usize = 17;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(NvmParametersConfirm {
            mstatus: reader.u8()?,
            manuf_code: reader.u32_le()?,
            page_size: reader.u32_le()?,
            block_size: reader.u32_le()?,
            mem_size: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u32_le(self.manuf_code)?;
        writer.put_u32_le(self.page_size)?;
        writer.put_u32_le(self.block_size)?;
        writer.put_u32_le(self.mem_size)
    }
}

// A020 - Write Module Data Request

/// Where the module chunk comes from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSource {
    File(PathBuf),
    Inline(Vec<u8>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteModuleParams {
    pub module_id: ModuleId,
    pub offset: u32,
    pub source: ModuleSource,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteModuleDataRequest {
    pub module_id: ModuleId,
    pub offset: u32,
    pub checksum: u32,
    pub data: Vec<u8>,
}

impl WriteModuleDataRequest {
    /// Loads the chunk and computes its CRC-32. The chunk is limited to
    /// 1024 bytes.
    pub fn from_params(params: &WriteModuleParams) -> FrameResult<Self> {
        let data = match &params.source {
            ModuleSource::Inline(data) => data.clone(),
            ModuleSource::File(path) => std::fs::read(path).map_err(|error| FrameError::BuildFailed {
                mmtype: MMTYPE_WRITE_MODULE_REQ,
                reason: format!("cannot read {}: {}", path.display(), error),
            })?,
        };
        if data.len() > HPAV_MODULE_CHUNK_MAX {
            return Err(FrameError::BuildFailed {
                mmtype: MMTYPE_WRITE_MODULE_REQ,
                reason: format!("module size {} > {}", data.len(), HPAV_MODULE_CHUNK_MAX),
            });
        }
        Ok(WriteModuleDataRequest {
            module_id: params.module_id,
            offset: params.offset,
            checksum: crc32fast::hash(&data),
            data,
        })
    }
}

impl MmeCodec for WriteModuleDataRequest {
    const NAME: &'static str = "write module data request";
    const MIN_LEN: usize = 12;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let module_id = ModuleId::from(reader.u8()?);
        reader.skip(1)?;
        let length = reader.u16_le()? as usize;
        let offset = reader.u32_le()?;
        let checksum = reader.u32_le()?;
        Ok(WriteModuleDataRequest {
            module_id,
            offset,
            checksum,
            data: reader.bytes(length)?.to_vec(),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.module_id.into())?;
        writer.put_zeros(1)?;
        put_len_u16(writer, self.data.len(), "module data")?;
        writer.put_u32_le(self.offset)?;
        writer.put_u32_le(self.checksum)?;
        writer.put_bytes(&self.data)
    }
}

// A021 - Write Module Data Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteModuleDataConfirm {
    pub mstatus: ModuleStatus,
    pub module_id: ModuleId,
    pub length: u16,
    pub offset: u32,
}

impl MmeCodec for WriteModuleDataConfirm {
    const NAME: &'static str = "write module data confirm";
    const MIN_LEN: usize = 9;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = ModuleStatus::from(reader.u8()?);
        let module_id = ModuleId::from(reader.u8()?);
        reader.skip(1)?;
        Ok(WriteModuleDataConfirm {
            mstatus,
            module_id,
            length: reader.u16_le()?,
            offset: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus.into())?;
        writer.put_u8(self.module_id.into())?;
        writer.put_zeros(1)?;
        writer.put_u16_le(self.length)?;
        writer.put_u32_le(self.offset)
    }
}

// A024 - Read Module Data Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadModuleDataRequest {
    pub module_id: ModuleId,
    pub length: u16,
    pub offset: u32,
}

impl MmeCodec for ReadModuleDataRequest {
    const NAME: &'static str = "read module data request";
    const MIN_LEN: usize = 8;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let module_id = ModuleId::from(reader.u8()?);
        reader.skip(1)?;
        Ok(ReadModuleDataRequest {
            module_id,
            length: reader.u16_le()?,
            offset: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.module_id.into())?;
        writer.put_zeros(1)?;
        writer.put_u16_le(self.length)?;
        writer.put_u32_le(self.offset)
    }
}

// A025 - Read Module Data Confirm

/// The device places the returned chunk `offset` bytes into the data area.
/// A window reaching past the received bytes is a truncated frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadModuleDataConfirm {
    pub mstatus: ModuleStatus,
    pub module_id: ModuleId,
    pub offset: u32,
    pub checksum: u32,
    pub data: Vec<u8>,
}

impl MmeCodec for ReadModuleDataConfirm {
    const NAME: &'static str = "read module data confirm";
    const MIN_LEN: usize = 16;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = ModuleStatus::from(reader.u8()?);
        reader.skip(3)?;
        let module_id = ModuleId::from(reader.u8()?);
        reader.skip(1)?;
        let length = reader.u16_le()? as usize;
        let offset = reader.u32_le()?;
        let checksum = reader.u32_le()?;

        let start = usize::try_from(offset)
            .map_err(|_| FrameError::truncated(Self::NAME, usize::MAX, reader.remaining()))?;
        let end = start.saturating_add(length);
        if end > reader.remaining() {
            return Err(FrameError::truncated(
                Self::NAME,
                reader.position().saturating_add(end),
                reader.position() + reader.remaining(),
            ));
        }
        reader.skip(start)?;
        Ok(ReadModuleDataConfirm {
            mstatus,
            module_id,
            offset,
            checksum,
            data: reader.bytes(length)?.to_vec(),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus.into())?;
        writer.put_zeros(3)?;
        writer.put_u8(self.module_id.into())?;
        writer.put_zeros(1)?;
        put_len_u16(writer, self.data.len(), "module data")?;
        writer.put_u32_le(self.offset)?;
        writer.put_u32_le(self.checksum)?;
        writer.put_zeros(self.offset as usize)?;
        writer.put_bytes(&self.data)
    }
}

// A028 - Write Module Data to NVM Request

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvmModuleRequest {
    pub module_id: ModuleId,
}

impl MmeCodec for NvmModuleRequest {
    const NAME: &'static str = "write module to NVM request";
    const MIN_LEN: usize = 1;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(NvmModuleRequest {
            module_id: ModuleId::from(reader.u8()?),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.module_id.into())
    }
}

// A02E - Get Watchdog Report Indicate

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WatchdogReportIndicate {
    pub mstatus: u8,
    pub session_id: u16,
    pub num_parts: u8,
    pub cur_part: u8,
    pub data_offset: u8,
    pub data: Vec<u8>,
}

impl MmeCodec for WatchdogReportIndicate {
    const NAME: &'static str = "watchdog report indicate";
    const MIN_LEN: usize = 9;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = reader.u8()?;
        let session_id = reader.u16_le()?;
        let num_parts = reader.u8()?;
        let cur_part = reader.u8()?;
        let data_length = reader.u16_le()? as usize;
        let data_offset = reader.u8()?;
        Ok(WatchdogReportIndicate {
            mstatus,
            session_id,
            num_parts,
            cur_part,
            data_offset,
            data: reader.bytes(data_length)?.to_vec(),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u16_le(self.session_id)?;
        writer.put_u8(self.num_parts)?;
        writer.put_u8(self.cur_part)?;
        put_len_u16(writer, self.data.len(), "watchdog report")?;
        writer.put_u8(self.data_offset)?;
        writer.put_bytes(&self.data)
    }
}

// A030 - Link Statistics Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkStatsRequest {
    pub control: u8,
    pub direction: StatsDirection,
    pub link_id: LinkId,
    pub macaddr: HpavMac,
}

impl MmeCodec for LinkStatsRequest {
    const NAME: &'static str = "link statistics request";
    const MIN_LEN: usize = 9;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(LinkStatsRequest {
            control: reader.u8()?,
            direction: StatsDirection::from(reader.u8()?),
            link_id: LinkId::from(reader.u8()?),
            macaddr: reader.array()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.control)?;
        writer.put_u8(self.direction.into())?;
        writer.put_u8(self.link_id.into())?;
        writer.put_bytes(&self.macaddr)
    }
}

// A031 - Link Statistics Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TxLinkStats {
    pub mpdu_ack: u64,
    pub mpdu_coll: u64,
    pub mpdu_fail: u64,
    pub pb_passed: u64,
    pub pb_failed: u64,
}

impl TxLinkStats {
    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(TxLinkStats {
            mpdu_ack: reader.u64_le()?,
            mpdu_coll: reader.u64_le()?,
            mpdu_fail: reader.u64_le()?,
            pb_passed: reader.u64_le()?,
            pb_failed: reader.u64_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u64_le(self.mpdu_ack)?;
        writer.put_u64_le(self.mpdu_coll)?;
        writer.put_u64_le(self.mpdu_fail)?;
        writer.put_u64_le(self.pb_passed)?;
        writer.put_u64_le(self.pb_failed)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RxIntervalStats {
    pub phyrate: u8,
    pub pb_passed: u64,
    pub pb_failed: u64,
    pub tbe_passed: u64,
    pub tbe_failed: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RxLinkStats {
    pub mpdu_ack: u64,
    pub mpdu_fail: u64,
    pub pb_passed: u64,
    pub pb_failed: u64,
    pub tbe_passed: u64,
    pub tbe_failed: u64,
    pub intervals: Vec<RxIntervalStats>,
}

impl RxLinkStats {
    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mut stats = RxLinkStats {
            mpdu_ack: reader.u64_le()?,
            mpdu_fail: reader.u64_le()?,
            pb_passed: reader.u64_le()?,
            pb_failed: reader.u64_le()?,
            tbe_passed: reader.u64_le()?,
            tbe_failed: reader.u64_le()?,
            intervals: Vec::new(),
        };
        let count = reader.u8()?;
        for _ in 0..count {
            stats.intervals.push(RxIntervalStats {
                phyrate: reader.u8()?,
                pb_passed: reader.u64_le()?,
                pb_failed: reader.u64_le()?,
                tbe_passed: reader.u64_le()?,
                tbe_failed: reader.u64_le()?,
            });
        }
        Ok(stats)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u64_le(self.mpdu_ack)?;
        writer.put_u64_le(self.mpdu_fail)?;
        writer.put_u64_le(self.pb_passed)?;
        writer.put_u64_le(self.pb_failed)?;
        writer.put_u64_le(self.tbe_passed)?;
        writer.put_u64_le(self.tbe_failed)?;
        let count = u8::try_from(self.intervals.len())
            .map_err(|_| FrameError::invalid("rx intervals", "more than 255"))?;
        writer.put_u8(count)?;
        for interval in &self.intervals {
            writer.put_u8(interval.phyrate)?;
            writer.put_u64_le(interval.pb_passed)?;
            writer.put_u64_le(interval.pb_failed)?;
            writer.put_u64_le(interval.tbe_passed)?;
            writer.put_u64_le(interval.tbe_failed)?;
        }
        Ok(())
    }
}

/// Counters follow only on success; which ones depends on `direction`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkStatsConfirm {
    pub mstatus: StatsStatus,
    pub direction: StatsDirection,
    pub link_id: LinkId,
    pub tei: u8,
    pub tx: Option<TxLinkStats>,
    pub rx: Option<RxLinkStats>,
}

impl MmeCodec for LinkStatsConfirm {
    const NAME: &'static str = "link statistics confirm";
    const MIN_LEN: usize = 4;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mut confirm = LinkStatsConfirm {
            mstatus: StatsStatus::from(reader.u8()?),
            direction: StatsDirection::from(reader.u8()?),
            link_id: LinkId::from(reader.u8()?),
            tei: reader.u8()?,
            tx: None,
            rx: None,
        };
        if confirm.mstatus != StatsStatus::Success {
            return Ok(confirm);
        }
        if matches!(confirm.direction, StatsDirection::Tx | StatsDirection::Both) {
            confirm.tx = Some(TxLinkStats::decode(reader)?);
        }
        if matches!(confirm.direction, StatsDirection::Rx | StatsDirection::Both) {
            confirm.rx = Some(RxLinkStats::decode(reader)?);
        }
        Ok(confirm)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus.into())?;
        writer.put_u8(self.direction.into())?;
        writer.put_u8(self.link_id.into())?;
        writer.put_u8(self.tei)?;
        if let Some(tx) = &self.tx {
            tx.encode(writer)?;
        }
        if let Some(rx) = &self.rx {
            rx.encode(writer)?;
        }
        Ok(())
    }
}

// A034 - Sniffer Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnifferRequest {
    pub control: SnifferControl,
    pub reserved: [u8; 4],
}

impl Default for SnifferRequest {
    fn default() -> Self {
        SnifferRequest {
            control: SnifferControl::NoChange,
            reserved: [0; 4],
        }
    }
}

impl MmeCodec for SnifferRequest {
    const NAME: &'static str = "sniffer request";
    const MIN_LEN: usize = 5;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(SnifferRequest {
            control: SnifferControl::from(reader.u8()?),
            reserved: reader.array()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.control.into())?;
        writer.put_bytes(&self.reserved)
    }
}

// A035 - Sniffer Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnifferConfirm {
    pub mstatus: u8,
    pub state: SnifferState,
    pub da: HpavMac,
}

impl MmeCodec for SnifferConfirm {
    const NAME: &'static str = "sniffer confirm";
    const MIN_LEN: usize = 8;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(SnifferConfirm {
            mstatus: reader.u8()?,
            state: SnifferState::from(reader.u8()?),
            da: reader.array()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u8(self.state.into())?;
        writer.put_bytes(&self.da)
    }
}

// A036 - Sniffer Indicate

/// Captured PHY frame control, plus the beacon MPDU payload when the
/// capture is a beacon and the indication carries it. The raw bytes are
/// kept next to their decoded form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnifferIndicate {
    pub kind: u8,
    pub direction: u8,
    pub systime: u64,
    pub beacon_time: u32,
    pub frame_control: [u8; HPAV_FC_LEN],
    pub delimiter: Delimiter,
    pub beacon_raw: Option<Vec<u8>>,
    pub beacon: Option<BeaconMpduPayload>,
}

impl SnifferIndicate {
    pub fn new(
        kind: u8,
        direction: u8,
        systime: u64,
        beacon_time: u32,
        frame_control: [u8; HPAV_FC_LEN],
        beacon_raw: Option<Vec<u8>>,
    ) -> FrameResult<Self> {
        let delimiter = decode_delimiter(&frame_control)?;
        let beacon = match (&beacon_raw, delimiter.is_beacon()) {
            (Some(raw), true) => Some(decode_beacon_payload(raw)?),
            _ => None,
        };
        Ok(SnifferIndicate {
            kind,
            direction,
            systime,
            beacon_time,
            frame_control,
            delimiter,
            beacon_raw,
            beacon,
        })
    }
}

impl MmeCodec for SnifferIndicate {
    const NAME: &'static str = "sniffer indicate";
    const MIN_LEN: usize = 14 + HPAV_FC_LEN;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let kind = reader.u8()?;
        let direction = reader.u8()?;
        let systime = reader.u64_le()?;
        let beacon_time = reader.u32_le()?;
        let frame_control = reader.array()?;
        let beacon_raw = if reader.remaining() >= HPAV_BEACON_PAYLOAD_LEN {
            Some(reader.bytes(HPAV_BEACON_PAYLOAD_LEN)?.to_vec())
        } else {
            None
        };
        SnifferIndicate::new(kind, direction, systime, beacon_time, frame_control, beacon_raw)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.kind)?;
        writer.put_u8(self.direction)?;
        writer.put_u64_le(self.systime)?;
        writer.put_u32_le(self.beacon_time)?;
        writer.put_bytes(&self.frame_control)?;
        if let Some(raw) = &self.beacon_raw {
            writer.put_bytes(raw)?;
        }
        Ok(())
    }
}

// A039 - Network Info Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StaInfo {
    pub macaddr: HpavMac,
    pub tei: u8,
    pub bridge_macaddr: HpavMac,
    pub avg_phy_tx_rate: u8,
    pub avg_phy_rx_rate: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfoConfirm {
    pub num_avlns: u8,
    pub nid: HpavNid,
    pub snid: u8,
    pub tei: u8,
    pub sta_role: StaRole,
    pub cco_macaddr: HpavMac,
    pub cco_tei: u8,
    pub stations: Vec<StaInfo>,
}

impl MmeCodec for NetworkInfoConfirm {
    const NAME: &'static str = "network info confirm";
    const MIN_LEN: usize = 19;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mut confirm = NetworkInfoConfirm {
            num_avlns: reader.u8()?,
            nid: reader.array()?,
            snid: reader.u8()?,
            tei: reader.u8()?,
            sta_role: StaRole::from(reader.u8()?),
            cco_macaddr: reader.array()?,
            cco_tei: reader.u8()?,
            stations: Vec::new(),
        };
        let count = reader.u8()?;
        for _ in 0..count {
            confirm.stations.push(StaInfo {
                macaddr: reader.array()?,
                tei: reader.u8()?,
                bridge_macaddr: reader.array()?,
                avg_phy_tx_rate: reader.u8()?,
                avg_phy_rx_rate: reader.u8()?,
            });
        }
        Ok(confirm)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.num_avlns)?;
        writer.put_bytes(&self.nid)?;
        writer.put_u8(self.snid)?;
        writer.put_u8(self.tei)?;
        writer.put_u8(self.sta_role.into())?;
        writer.put_bytes(&self.cco_macaddr)?;
        writer.put_u8(self.cco_tei)?;
        let count = u8::try_from(self.stations.len())
            .map_err(|_| FrameError::invalid("station list", "more than 255"))?;
        writer.put_u8(count)?;
        for sta in &self.stations {
            writer.put_bytes(&sta.macaddr)?;
            writer.put_u8(sta.tei)?;
            writer.put_bytes(&sta.bridge_macaddr)?;
            writer.put_u8(sta.avg_phy_tx_rate)?;
            writer.put_u8(sta.avg_phy_rx_rate)?;
        }
        Ok(())
    }
}

impl fmt::Display for NetworkInfoConfirm {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!(
            "NetworkInfo:{{ avlns:{}, nid:{:02X?}, snid:{}, tei:{}, role:{:?}, cco:{}, stations:{} }}",
            self.num_avlns,
            self.nid,
            self.snid,
            self.tei,
            self.sta_role,
            fmt_mac(&self.cco_macaddr),
            self.stations.len()
        );
        fmt.pad(&text)
    }
}

// A042 - Check Points Indicate

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckPointsIndicate {
    pub mstatus: u8,
    pub major: bool,
    pub buf_locked: bool,
    pub auto_lock: bool,
    pub unsoc_upd: bool,
    pub unsoc: bool,
    pub session_id: u16,
    pub length: u32,
    pub offset: u32,
    pub index: u32,
    pub num_parts: u8,
    pub cur_part: u8,
    pub data_length: u16,
    pub data_offset: u16,
}

impl MmeCodec for CheckPointsIndicate {
    const NAME: &'static str = "check points indicate";
    const MIN_LEN: usize = 35;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let flags = [reader.u8()?];
        let mut bits = BitReader::new(&flags);
        let mstatus = bits.take_u8(3);
        let major = bits.flag();
        let buf_locked = bits.flag();
        let auto_lock = bits.flag();
        let unsoc_upd = bits.flag();
        let unsoc = bits.flag();
        reader.skip(14)?;
        Ok(CheckPointsIndicate {
            mstatus,
            major,
            buf_locked,
            auto_lock,
            unsoc_upd,
            unsoc,
            session_id: reader.u16_le()?,
            length: reader.u32_le()?,
            offset: reader.u32_le()?,
            index: reader.u32_le()?,
            num_parts: reader.u8()?,
            cur_part: reader.u8()?,
            data_length: reader.u16_le()?,
            data_offset: reader.u16_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        let mut flags = [0u8; 1];
        {
            let mut bits = BitWriter::new(&mut flags);
            bits.put(3, self.mstatus as u64);
            bits.flag(self.major);
            bits.flag(self.buf_locked);
            bits.flag(self.auto_lock);
            bits.flag(self.unsoc_upd);
            bits.flag(self.unsoc);
        }
        writer.put_bytes(&flags)?;
        writer.put_zeros(14)?;
        writer.put_u16_le(self.session_id)?;
        writer.put_u32_le(self.length)?;
        writer.put_u32_le(self.offset)?;
        writer.put_u32_le(self.index)?;
        writer.put_u8(self.num_parts)?;
        writer.put_u8(self.cur_part)?;
        writer.put_u16_le(self.data_length)?;
        writer.put_u16_le(self.data_offset)
    }
}

// A048 - Loopback Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoopbackParams {
    pub duration: u8,
    /// frame to loop, a minimal broadcast HomePlug AV frame when absent
    pub frame: Option<Vec<u8>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoopbackRequest {
    pub duration: u8,
    pub data: Vec<u8>,
}

impl LoopbackRequest {
    pub fn test_frame() -> Vec<u8> {
        let mut frame = vec![0u8; ETHER_MIN_LEN];
        frame[..ETHER_ADDR_LEN].copy_from_slice(&BROADCAST_ADDR);
        frame[ETHER_ADDR_LEN..2 * ETHER_ADDR_LEN].copy_from_slice(&INTELLON_LOCAL_ADDR);
        frame[12..14].copy_from_slice(&ETH_P_HPAV.to_be_bytes());
        frame
    }

    pub fn from_params(params: &LoopbackParams) -> FrameResult<Self> {
        if params.duration > HPAV_LOOPBACK_MAX_SECS {
            return Err(FrameError::BuildFailed {
                mmtype: MMTYPE_LOOPBACK_REQ,
                reason: format!(
                    "duration {}s > {}s",
                    params.duration, HPAV_LOOPBACK_MAX_SECS
                ),
            });
        }
        Ok(LoopbackRequest {
            duration: params.duration,
            data: params.frame.clone().unwrap_or_else(LoopbackRequest::test_frame),
        })
    }
}

impl MmeCodec for LoopbackRequest {
    const NAME: &'static str = "loopback request";
    const MIN_LEN: usize = 3;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let duration = reader.u8()?;
        let length = reader.u16_le()? as usize;
        Ok(LoopbackRequest {
            duration,
            data: reader.bytes(length)?.to_vec(),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.duration)?;
        put_len_u16(writer, self.data.len(), "loopback frame")?;
        writer.put_bytes(&self.data)
    }
}

// A049 - Loopback Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoopbackConfirm {
    pub mstatus: u8,
    pub duration: u8,
    pub length: u16,
}

impl MmeCodec for LoopbackConfirm {
    const NAME: &'static str = "loopback confirm";
    const MIN_LEN: usize = 4;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(LoopbackConfirm {
            mstatus: reader.u8()?,
            duration: reader.u8()?,
            length: reader.u16_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u8(self.duration)?;
        writer.put_u16_le(self.length)
    }
}

// A04D - Loopback Status Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoopbackStatusConfirm {
    pub mstatus: u8,
    pub state: u8,
}

impl MmeCodec for LoopbackStatusConfirm {
    const NAME: &'static str = "loopback status confirm";
    const MIN_LEN: usize = 2;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(LoopbackStatusConfirm {
            mstatus: reader.u8()?,
            state: reader.u8()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u8(self.state)
    }
}

// A050 - Set Encryption Key Request

/// Device receiving the new NMK.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyTarget {
    /// the local device, addressed by its MAC
    Local { destination: HpavMac },
    /// any remote device knowing this DAK password, key is broadcast
    Remote { dak_passphrase: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetKeyParams {
    pub nmk_passphrase: String,
    pub target: KeyTarget,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetEncryptionKeyRequest {
    pub peks: Peks,
    pub nmk: HpavKey,
    pub peks_payload: Peks,
    pub rdra: HpavMac,
    pub dak: HpavKey,
}

impl SetEncryptionKeyRequest {
    pub fn from_params(params: &SetKeyParams) -> Self {
        let nmk = derive_nmk(&params.nmk_passphrase);
        match &params.target {
            KeyTarget::Local { destination } => SetEncryptionKeyRequest {
                peks: Peks::KnownNmk,
                nmk,
                peks_payload: Peks::NoKey,
                rdra: *destination,
                dak: [0; HPAV_KEY_LEN],
            },
            KeyTarget::Remote { dak_passphrase } => SetEncryptionKeyRequest {
                peks: Peks::KnownNmk,
                nmk,
                peks_payload: Peks::DestinationDak,
                rdra: BROADCAST_ADDR,
                dak: derive_dak(dak_passphrase),
            },
        }
    }
}

impl MmeCodec for SetEncryptionKeyRequest {
    const NAME: &'static str = "set encryption key request";
    const MIN_LEN: usize = 40;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(SetEncryptionKeyRequest {
            peks: Peks::from(reader.u8()?),
            nmk: reader.array()?,
            peks_payload: Peks::from(reader.u8()?),
            rdra: reader.array()?,
            dak: reader.array()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.peks.into())?;
        writer.put_bytes(&self.nmk)?;
        writer.put_u8(self.peks_payload.into())?;
        writer.put_bytes(&self.rdra)?;
        writer.put_bytes(&self.dak)
    }
}

// A055 - Get Manufacturing String Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ManufStringConfirm {
    pub status: u8,
    pub text: String,
}

const MANUF_STRING_LEN: usize = 64;

impl MmeCodec for ManufStringConfirm {
    const NAME: &'static str = "manufacturing string confirm";
    const MIN_LEN: usize = 2 + MANUF_STRING_LEN;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let status = reader.u8()?;
        let length = (reader.u8()? as usize).min(MANUF_STRING_LEN);
        let raw = reader.bytes(MANUF_STRING_LEN)?;
        let mut text = ByteReader::new(&raw[..length], Self::NAME);
        Ok(ManufStringConfirm {
            status,
            text: text.text(length)?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.status)?;
        writer.put_u8(self.text.len().min(MANUF_STRING_LEN) as u8)?;
        writer.put_text(&self.text, MANUF_STRING_LEN)
    }
}

// A059 - Read Configuration Block Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SdramConfig {
    pub size: u32,
    pub conf_reg: u32,
    pub timing0: u32,
    pub timing1: u32,
    pub ctl_reg: u32,
    pub ref_reg: u32,
    pub clk_reg_val: u32,
}

const SDRAM_CONFIG_LEN: usize = 32;

impl SdramConfig {
    fn words(&self) -> [u32; 8] {
        [
            self.size,
            self.conf_reg,
            self.timing0,
            self.timing1,
            self.ctl_reg,
            self.ref_reg,
            self.clk_reg_val,
            0,
        ]
    }

    /// Intellon 32 bit checksum: complement of the XOR of all words.
    pub fn checksum(&self) -> u32 {
        !self.words().iter().fold(0u32, |sum, word| sum ^ word)
    }

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let config = SdramConfig {
            size: reader.u32_le()?,
            conf_reg: reader.u32_le()?,
            timing0: reader.u32_le()?,
            timing1: reader.u32_le()?,
            ctl_reg: reader.u32_le()?,
            ref_reg: reader.u32_le()?,
            clk_reg_val: reader.u32_le()?,
        };
        reader.skip(4)?;
        Ok(config)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        for word in self.words() {
            writer.put_u32_le(word)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub version: u32,
    pub img_rom_addr: u32,
    pub img_sdram_addr: u32,
    pub img_length: u32,
    pub img_checksum: u32,
    pub entry_point: u32,
    pub next_header: u32,
    pub hdr_checksum: u32,
}

const BLOCK_HEADER_LEN: usize = 44;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadConfigBlockConfirm {
    pub mstatus: u8,
    pub config_length: u8,
    pub header: BlockHeader,
    pub config: SdramConfig,
}

impl MmeCodec for ReadConfigBlockConfirm {
    const NAME: &'static str = "read config block confirm";
    const MIN_LEN: usize = 2 + BLOCK_HEADER_LEN + SDRAM_CONFIG_LEN;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = reader.u8()?;
        let config_length = reader.u8()?;
        let mut header = BlockHeader {
            version: reader.u32_le()?,
            img_rom_addr: reader.u32_le()?,
            img_sdram_addr: reader.u32_le()?,
            img_length: reader.u32_le()?,
            img_checksum: reader.u32_le()?,
            entry_point: reader.u32_le()?,
            ..BlockHeader::default()
        };
        reader.skip(12)?;
        header.next_header = reader.u32_le()?;
        header.hdr_checksum = reader.u32_le()?;
        Ok(ReadConfigBlockConfirm {
            mstatus,
            config_length,
            header,
            config: SdramConfig::decode(reader)?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u8(self.config_length)?;
        let header = &self.header;
        writer.put_u32_le(header.version)?;
        writer.put_u32_le(header.img_rom_addr)?;
        writer.put_u32_le(header.img_sdram_addr)?;
        writer.put_u32_le(header.img_length)?;
        writer.put_u32_le(header.img_checksum)?;
        writer.put_u32_le(header.entry_point)?;
        writer.put_zeros(12)?;
        writer.put_u32_le(header.next_header)?;
        writer.put_u32_le(header.hdr_checksum)?;
        self.config.encode(writer)
    }
}

// A05C - Set SDRAM Configuration Request

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetSdramConfigRequest {
    pub config: SdramConfig,
    pub checksum: u32,
}

impl SetSdramConfigRequest {
    pub fn new(config: SdramConfig) -> Self {
        let checksum = config.checksum();
        SetSdramConfigRequest { config, checksum }
    }
}

impl MmeCodec for SetSdramConfigRequest {
    const NAME: &'static str = "set SDRAM config request";
    const MIN_LEN: usize = SDRAM_CONFIG_LEN + 4;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(SetSdramConfigRequest {
            config: SdramConfig::decode(reader)?,
            checksum: reader.u32_le()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        self.config.encode(writer)?;
        writer.put_u32_le(self.checksum)
    }
}

// A062 - Embedded Host Action Required Indicate

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostActionIndicate {
    pub action: HostAction,
}

impl MmeCodec for HostActionIndicate {
    const NAME: &'static str = "host action indicate";
    const MIN_LEN: usize = 1;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(HostActionIndicate {
            action: HostAction::from(reader.u8()?),
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.action.into())
    }
}

// A068 - Get Device Attributes Request

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceAttrsRequest {
    pub cookie: u32,
    pub rtype: u8,
}

impl MmeCodec for DeviceAttrsRequest {
    const NAME: &'static str = "device attributes request";
    const MIN_LEN: usize = 5;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(DeviceAttrsRequest {
            cookie: reader.u32_le()?,
            rtype: reader.u8()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u32_le(self.cookie)?;
        writer.put_u8(self.rtype)
    }
}

// A069 - Get Device Attributes Confirm

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceAttrs {
    pub hardware: String,
    pub software: String,
    pub major: u32,
    pub minor: u32,
    pub subversion: u32,
    pub build_number: u32,
    pub build_date: String,
    pub release_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeviceAttrsConfirm {
    pub status: u16,
    pub cookie: u32,
    pub rtype: u8,
    pub size: u16,
    pub attrs: DeviceAttrs,
}

impl MmeCodec for DeviceAttrsConfirm {
    const NAME: &'static str = "device attributes confirm";
    const MIN_LEN: usize = 9 + 76;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let status = reader.u16_le()?;
        let cookie = reader.u32_le()?;
        let rtype = reader.u8()?;
        let size = reader.u16_le()?;
        let hardware = reader.text(16)?;
        let software = reader.text(16)?;
        let major = reader.u32_le()?;
        let minor = reader.u32_le()?;
        let subversion = reader.u32_le()?;
        let build_number = reader.u32_le()?;
        reader.skip(8)?;
        Ok(DeviceAttrsConfirm {
            status,
            cookie,
            rtype,
            size,
            attrs: DeviceAttrs {
                hardware,
                software,
                major,
                minor,
                subversion,
                build_number,
                build_date: reader.text(8)?,
                release_type: reader.text(12)?,
            },
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u16_le(self.status)?;
        writer.put_u32_le(self.cookie)?;
        writer.put_u8(self.rtype)?;
        writer.put_u16_le(self.size)?;
        let attrs = &self.attrs;
        writer.put_text(&attrs.hardware, 16)?;
        writer.put_text(&attrs.software, 16)?;
        writer.put_u32_le(attrs.major)?;
        writer.put_u32_le(attrs.minor)?;
        writer.put_u32_le(attrs.subversion)?;
        writer.put_u32_le(attrs.build_number)?;
        writer.put_zeros(8)?;
        writer.put_text(&attrs.build_date, 8)?;
        writer.put_text(&attrs.release_type, 12)
    }
}

impl fmt::Display for DeviceAttrsConfirm {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attrs = &self.attrs;
        let text = format!(
            "DeviceAttrs:{{ hw:'{}', sw:'{}', version:{}.{}.{}-{}, date:'{}', release:'{}' }}",
            attrs.hardware,
            attrs.software,
            attrs.major,
            attrs.minor,
            attrs.subversion,
            attrs.build_number,
            attrs.build_date,
            attrs.release_type
        );
        fmt.pad(&text)
    }
}

// A06C - Get Ethernet PHY Settings Request

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnetPhyRequest {
    pub mcontrol: u8,
    pub addcaps: u8,
}

impl MmeCodec for EnetPhyRequest {
    const NAME: &'static str = "ethernet PHY settings request";
    const MIN_LEN: usize = 5;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let request = EnetPhyRequest {
            mcontrol: reader.u8()?,
            addcaps: reader.u8()?,
        };
        reader.skip(3)?;
        Ok(request)
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mcontrol)?;
        writer.put_u8(self.addcaps)?;
        writer.put_zeros(3)
    }
}

// A06D - Get Ethernet PHY Settings Confirm

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnetPhyConfirm {
    pub status: u8,
    pub speed: EnetSpeed,
    pub duplex: u8,
}

impl MmeCodec for EnetPhyConfirm {
    const NAME: &'static str = "ethernet PHY settings confirm";
    const MIN_LEN: usize = 3;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(EnetPhyConfirm {
            status: reader.u8()?,
            speed: EnetSpeed::from(reader.u8()?),
            duplex: reader.u8()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.status)?;
        writer.put_u8(self.speed.into())?;
        writer.put_u8(self.duplex)
    }
}

// A070 - Tone Map Characteristics Request

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneMapRequest {
    pub macaddr: HpavMac,
    pub tmslot: u8,
}

impl MmeCodec for ToneMapRequest {
    const NAME: &'static str = "tone map request";
    const MIN_LEN: usize = 7;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        Ok(ToneMapRequest {
            macaddr: reader.array()?,
            tmslot: reader.u8()?,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_bytes(&self.macaddr)?;
        writer.put_u8(self.tmslot)
    }
}

// A071 - Tone Map Characteristics Confirm

/// One modulation per active carrier, two carriers per byte low nibble
/// first. Carriers are only reported on success.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ToneMapConfirm {
    pub mstatus: u8,
    pub tmslot: u8,
    pub num_tms: u8,
    pub carriers: Vec<Modulation>,
}

impl ToneMapConfirm {
    pub fn count(&self, modulation: Modulation) -> usize {
        self.carriers.iter().filter(|carrier| **carrier == modulation).count()
    }
}

impl MmeCodec for ToneMapConfirm {
    const NAME: &'static str = "tone map confirm";
    const MIN_LEN: usize = 5;

    fn decode(reader: &mut ByteReader) -> FrameResult<Self> {
        let mstatus = reader.u8()?;
        let tmslot = reader.u8()?;
        let num_tms = reader.u8()?;
        let num_carriers = reader.u16_le()? as usize;

        let mut carriers = Vec::new();
        if mstatus == 0 {
            let packed = reader.bytes(num_carriers.div_ceil(2))?;
            let mut bits = BitReader::new(packed);
            carriers.reserve(num_carriers);
            for _ in 0..num_carriers {
                carriers.push(Modulation::from(bits.take_u8(4)));
            }
        }
        Ok(ToneMapConfirm {
            mstatus,
            tmslot,
            num_tms,
            carriers,
        })
    }

    fn encode(&self, writer: &mut FrameWriter) -> FrameResult<()> {
        writer.put_u8(self.mstatus)?;
        writer.put_u8(self.tmslot)?;
        writer.put_u8(self.num_tms)?;
        put_len_u16(writer, self.carriers.len(), "tone map")?;
        let mut packed = vec![0u8; self.carriers.len().div_ceil(2)];
        {
            let mut bits = BitWriter::new(&mut packed);
            for carrier in &self.carriers {
                bits.put(4, u8::from(*carrier) as u64);
            }
        }
        writer.put_bytes(&packed)
    }
}
