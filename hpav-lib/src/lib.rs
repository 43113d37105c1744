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

#![doc(
    html_logo_url = "https://iot.bzh/images/defaults/company/512-479-max-transp.png",
    html_favicon_url = "https://iot.bzh/images/defaults/favicon.ico"
)]

#[path = "error.rs"]
mod error;

#[path = "config.rs"]
mod conf;

#[path = "layout.rs"]
mod layout;

#[path = "crypto.rs"]
mod crypto;

#[path = "delimiter.rs"]
mod delimiter;

#[path = "payload.rs"]
mod payload;

#[path = "messages.rs"]
mod msg;

#[path = "vendor.rs"]
mod vendor;

#[path = "hp10.rs"]
mod hp10;

#[path = "registry.rs"]
mod registry;

#[path = "codec.rs"]
mod codec;

#[path = "transport.rs"]
mod transport;

pub mod prelude {
    pub use crate::codec::*;
    pub use crate::conf::*;
    pub use crate::crypto::*;
    pub use crate::delimiter::*;
    pub use crate::error::*;
    pub use crate::hp10::*;
    pub use crate::layout::*;
    pub use crate::msg::*;
    pub use crate::payload::*;
    pub use crate::registry::*;
    pub use crate::transport::*;
    pub use crate::vendor::*;
    pub use hpavtypes::prelude::*;
}
