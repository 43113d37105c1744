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
 */
use serde::{Deserialize, Serialize};

/// MMType category, selected by the top 3 bits of the 16 bit code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MmCategory {
    StaToCco,
    AnyToPco,
    CcoToCco,
    StaToSta,
    Manufacturer,
    Vendor,
    Reserved(u16),
}

impl MmCategory {
    pub const MASK: u16 = 0xE000;

    pub fn from_mmtype(mmtype: u16) -> Self {
        match mmtype & Self::MASK {
            0x0000 => MmCategory::StaToCco,
            0x2000 => MmCategory::AnyToPco,
            0x4000 => MmCategory::CcoToCco,
            0x6000 => MmCategory::StaToSta,
            0x8000 => MmCategory::Manufacturer,
            0xA000 => MmCategory::Vendor,
            other => MmCategory::Reserved(other),
        }
    }
}

/// MMType subtype, low 2 bits of the code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MmSubtype {
    Request,
    Confirm,
    Indicate,
    Response,
}

impl MmSubtype {
    pub const MASK: u16 = 0x0003;

    pub fn from_mmtype(mmtype: u16) -> Self {
        match mmtype & Self::MASK {
            0 => MmSubtype::Request,
            1 => MmSubtype::Confirm,
            2 => MmSubtype::Indicate,
            _ => MmSubtype::Response,
        }
    }
}

hpav_enum!(
    /// Key carried or requested by CM_SET_KEY / CM_GET_KEY
    KeyType {
        Dak = 0x00,
        Nmk = 0x01,
        Nek = 0x02,
        Tek = 0x03,
        HashKey = 0x04,
        NonceOnly = 0x05,
    }
);

impl KeyType {
    pub fn is_aes128(&self) -> bool {
        matches!(self, KeyType::Dak | KeyType::Nmk | KeyType::Nek | KeyType::Tek)
    }
}

hpav_enum!(
    /// Payload encryption key select
    Peks {
        DestinationDak = 0x00,
        KnownNmk = 0x01,
        Teks = 0x02,
        NoKey = 0x0F,
    }
);

hpav_enum!(
    AvlnStatus {
        UnassociatedLevel0 = 0x00,
        UnassociatedLevel1 = 0x01,
        UnassociatedLevel2 = 0x02,
        UnassociatedLevel3 = 0x03,
        UnassociatedNpco = 0x04,
        UnassociatedPco = 0x05,
        CcoAvln = 0x08,
    }
);

hpav_enum!(
    /// Protocol identifier of a key exchange
    ProtocolId {
        AuthRequestNew = 0x00,
        ProvisionStaNew = 0x01,
        ProvisionStaDak = 0x02,
        ProvisionStaUke = 0x03,
        HleProtocol = 0x04,
    }
);

hpav_enum!(
    StaRole {
        Sta = 0x00,
        Proxy = 0x01,
        Cco = 0x02,
    }
);

hpav_enum!(
    ModuleId {
        MacSoftLoader = 0x00,
        MacSoftware = 0x01,
        Pib = 0x02,
        AlternateFlash = 0x10,
    }
);

hpav_enum!(
    /// Status of module write operations
    ModuleStatus {
        Success = 0x00,
        InvalidModuleId = 0x10,
        InvalidChecksum = 0x14,
        BadHeaderChecksum = 0x18,
        InvalidLength = 0x1C,
        UnexpectedOffset = 0x20,
    }
);

hpav_enum!(
    StatsDirection {
        Tx = 0x00,
        Rx = 0x01,
        Both = 0x02,
    }
);

hpav_enum!(
    StatsStatus {
        Success = 0x00,
        InvalidControl = 0x01,
        InvalidDirection = 0x02,
        InvalidLinkId = 0x10,
        InvalidMac = 0x20,
    }
);

hpav_enum!(
    LinkId {
        CsmaCap0 = 0x00,
        CsmaCap1 = 0x01,
        CsmaCap2 = 0x02,
        CsmaCap3 = 0x03,
        CsmaSum = 0xF8,
        CsmaSumAny = 0xFC,
    }
);

hpav_enum!(
    SnifferControl {
        Disable = 0x00,
        Enable = 0x01,
        NoChange = 0x02,
    }
);

hpav_enum!(
    SnifferState {
        Disabled = 0x00,
        Enabled = 0x01,
    }
);

hpav_enum!(
    EncKeyStatus {
        Success = 0x00,
        InvalidEks = 0x10,
        InvalidPks = 0x11,
        UnknownKey = 0x12,
    }
);

hpav_enum!(
    HostAction {
        Loader = 0x00,
        FirmwareUpgradeReady = 0x01,
        PibUpgradeReady = 0x02,
        FirmwarePibUpgradeReady = 0x03,
        LoaderSdramReady = 0x04,
    }
);

hpav_enum!(
    EnetSpeed {
        Ethernet = 0x00,
        FastEthernet = 0x01,
        GigabitEthernet = 0x02,
    }
);

hpav_enum!(
    /// Carrier modulation as reported in tone map nibbles
    Modulation {
        NoCarrier = 0x0,
        Bpsk = 0x1,
        Qpsk = 0x2,
        Qam8 = 0x3,
        Qam16 = 0x4,
        Qam64 = 0x5,
        Qam256 = 0x6,
        Qam1024 = 0x7,
    }
);

hpav_enum!(
    MmeErrorReason {
        NotSupported = 0x00,
        InvalidFields = 0x01,
        UnsupportedFeature = 0x02,
    }
);

hpav_enum!(
    DeviceId {
        Int6000 = 0x01,
        Int6300 = 0x02,
        Int6400 = 0x03,
    }
);
