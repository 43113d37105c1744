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

// PHY level frame control and beacon enumerations (IEEE 1901 FFT)

hpav_enum!(
    DelimiterType {
        Beacon = 0,
        StartOfFrame = 1,
        SelectiveAck = 2,
        RtsCts = 3,
        Sound = 4,
        ReverseStartOfFrame = 5,
    }
);

hpav_enum!(
    BeaconType {
        Central = 0,
        Discover = 1,
        Proxy = 2,
    }
);

hpav_enum!(
    HybridMode {
        AvOnly = 0,
        SharedCsma = 1,
        FullHybrid = 2,
        FullHybridExtended = 3,
    }
);

hpav_enum!(
    NetworkMode {
        Uncoordinated = 0,
        Coordinated = 1,
        CsmaOnly = 2,
    }
);

hpav_enum!(
    CcoCapability {
        Level0 = 0,
        Level1 = 1,
        Level2 = 2,
    }
);
