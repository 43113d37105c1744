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

use thiserror::Error;

/// Every failure the codec can report. Frames outside the HomePlug
/// ethertypes and known-but-undecoded messages are outcomes, not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("unknown MM type 0x{0:04X}")]
    UnknownType(u16),

    #[error("truncated input: {what} needs {need} bytes, got {got}")]
    TruncatedInput {
        what: &'static str,
        need: usize,
        got: usize,
    },

    #[error("cannot override MM type 0x{0:04X}: not registered")]
    OverrideOfUnregisteredType(u16),

    #[error("build of MM type 0x{mmtype:04X} failed: {reason}")]
    BuildFailed { mmtype: u16, reason: String },

    #[error("frame overflow: need {need} bytes, {avail} available")]
    Overflow { need: usize, avail: usize },

    #[error("invalid {what}: {info}")]
    InvalidParameter { what: &'static str, info: String },

    #[error("transport {uid}: {info}")]
    Transport { uid: &'static str, info: String },
}

pub type FrameResult<T> = Result<T, FrameError>;

impl FrameError {
    pub fn truncated(what: &'static str, need: usize, got: usize) -> Self {
        FrameError::TruncatedInput { what, need, got }
    }

    pub fn invalid(what: &'static str, info: impl Into<String>) -> Self {
        FrameError::InvalidParameter {
            what,
            info: info.into(),
        }
    }

    pub fn transport(uid: &'static str, info: impl Into<String>) -> Self {
        FrameError::Transport {
            uid,
            info: info.into(),
        }
    }

    // wrap any build side error so callers only see BuildFailed
    pub(crate) fn into_build_failure(self, mmtype: u16) -> Self {
        match self {
            FrameError::BuildFailed { .. } => self,
            other => FrameError::BuildFailed {
                mmtype,
                reason: other.to_string(),
            },
        }
    }
}
