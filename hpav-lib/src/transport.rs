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

//! Capture/injection seam. Real raw sockets stay with the embedding
//! application; the in-memory loopback serves tests and simulators.

use log::{debug, warn};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::prelude::*;

pub trait FrameTransport {
    fn iface(&self) -> &str;
    fn ifmac(&self) -> HpavMac;
    /// Returns the number of bytes put on the wire.
    fn send(&self, frame: &[u8]) -> FrameResult<usize>;
    /// None when nothing arrived before the timeout.
    fn receive(&self, timeout: Duration) -> FrameResult<Option<Vec<u8>>>;
    fn close(&self) -> FrameResult<()>;
}

struct LoopbackState {
    queue: VecDeque<Vec<u8>>,
    closed: bool,
}

/// Every frame sent is received back, padded like a raw socket write.
pub struct LoopbackTransport {
    iface: String,
    ifmac: HpavMac,
    state: Mutex<LoopbackState>,
    ready: Condvar,
}

impl LoopbackTransport {
    pub fn new(iface: &str, ifmac: HpavMac) -> Self {
        LoopbackTransport {
            iface: iface.to_string(),
            ifmac,
            state: Mutex::new(LoopbackState {
                queue: VecDeque::new(),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a frame as if received from the wire.
    pub fn inject(&self, frame: &[u8]) -> FrameResult<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(FrameError::transport("loopback-inject", "transport closed"));
        }
        state.queue.push_back(frame.to_vec());
        self.ready.notify_one();
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }
}

impl fmt::Display for LoopbackTransport {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!(
            "loopback:{{iface:{}, ifmac:{}, pending:{}}}",
            self.iface,
            fmt_mac(&self.ifmac),
            self.pending()
        );
        fmt.pad(&text)
    }
}

impl FrameTransport for LoopbackTransport {
    fn iface(&self) -> &str {
        &self.iface
    }

    fn ifmac(&self) -> HpavMac {
        self.ifmac
    }

    fn send(&self, frame: &[u8]) -> FrameResult<usize> {
        if frame.len() < ETHER_HDR_LEN {
            return Err(FrameError::transport(
                "loopback-send",
                format!("frame of {} bytes has no ethernet header", frame.len()),
            ));
        }
        if frame.len() > ETHER_MAX_LEN {
            return Err(FrameError::transport(
                "loopback-send",
                format!("frame of {} bytes > {}", frame.len(), ETHER_MAX_LEN),
            ));
        }
        // layer2 packet should be 60 byte minimum
        let mut wire = frame.to_vec();
        if wire.len() < ETHER_MIN_LEN {
            wire.resize(ETHER_MIN_LEN, 0);
        }
        let count = wire.len();
        self.inject(&wire)?;
        Ok(count)
    }

    fn receive(&self, timeout: Duration) -> FrameResult<Option<Vec<u8>>> {
        let state = self.lock();
        let (mut state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |state| state.queue.is_empty() && !state.closed)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.closed {
            return Err(FrameError::transport("loopback-receive", "transport closed"));
        }
        Ok(state.queue.pop_front())
    }

    fn close(&self) -> FrameResult<()> {
        let mut state = self.lock();
        state.closed = true;
        state.queue.clear();
        self.ready.notify_all();
        Ok(())
    }
}

/// Couples a transport with a codec and the link addressing.
pub struct FrameLink<T: FrameTransport> {
    transport: T,
    codec: FrameCodec,
    config: LinkConfig,
}

impl<T: FrameTransport> FrameLink<T> {
    pub fn new(transport: T, codec: FrameCodec, config: LinkConfig) -> Self {
        FrameLink {
            transport,
            codec,
            config,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    fn srcmac(&self) -> HpavMac {
        self.config.srcmac.unwrap_or_else(|| self.transport.ifmac())
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    pub fn send_request(&self, mmtype: u16, params: &MmParams) -> FrameResult<usize> {
        let srcmac = self.srcmac();
        let frame =
            self.codec
                .encode_frame(mmtype, self.config.dstmac.as_ref(), Some(&srcmac), params)?;
        debug!(
            "hpav-link:{} send mmtype:0x{:04X} len:{}",
            self.config.iface,
            mmtype,
            frame.len()
        );
        self.transport.send(&frame)
    }

    pub fn send_message(&self, payload: &MmPayload) -> FrameResult<usize> {
        let srcmac = self.srcmac();
        let frame = self
            .codec
            .encode_message(payload, self.config.dstmac.as_ref(), Some(&srcmac))?;
        debug!(
            "hpav-link:{} send {:?} len:{}",
            self.config.iface,
            payload.kind(),
            frame.len()
        );
        self.transport.send(&frame)
    }

    /// Waits up to the link timeout for one frame and decodes it.
    pub fn poll(&self) -> FrameResult<Option<DecodedFrame>> {
        self.poll_for(self.timeout())
    }

    fn poll_for(&self, timeout: Duration) -> FrameResult<Option<DecodedFrame>> {
        let frame = match self.transport.receive(timeout)? {
            None => return Ok(None),
            Some(frame) => frame,
        };
        match self.codec.decode_frame(&frame) {
            Ok(decoded) => {
                debug!("hpav-link:{} received {}", self.config.iface, decoded);
                Ok(Some(decoded))
            }
            Err(error) => {
                warn!(
                    "hpav-link:{} drop {} byte frame: {}",
                    self.config.iface,
                    frame.len(),
                    error
                );
                Err(error)
            }
        }
    }

    /// Sends a request then waits for the frame carrying `reply` (usually
    /// the matching confirm), skipping anything else until the timeout.
    pub fn request(
        &self,
        mmtype: u16,
        params: &MmParams,
        reply: u16,
    ) -> FrameResult<Option<DecodedFrame>> {
        self.send_request(mmtype, params)?;
        let deadline = Instant::now() + self.timeout();
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            match self.poll_for(deadline - now) {
                Ok(Some(decoded)) if decoded.mmtype() == Some(reply) => return Ok(Some(decoded)),
                Ok(Some(_)) => continue,
                Ok(None) => return Ok(None),
                // undecodable traffic does not end the wait
                Err(FrameError::Transport { uid, info }) => {
                    return Err(FrameError::Transport { uid, info })
                }
                Err(_) => continue,
            }
        }
    }

    pub fn close(&self) -> FrameResult<()> {
        self.transport.close()
    }
}
