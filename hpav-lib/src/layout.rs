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

//! Explicit little-endian readers and writers used by every wire record.
//! Nothing here overlays structs on raw memory: each field is extracted by
//! offset, shift and mask so the layout does not depend on the host.

use crate::prelude::*;

/// Bounds checked cursor over a received buffer.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8], what: &'static str) -> Self {
        ByteReader { buf, pos: 0, what }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn require(&self, count: usize) -> FrameResult<()> {
        if self.remaining() < count {
            Err(FrameError::truncated(
                self.what,
                self.pos + count,
                self.buf.len(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn bytes(&mut self, count: usize) -> FrameResult<&'a [u8]> {
        self.require(count)?;
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn skip(&mut self, count: usize) -> FrameResult<()> {
        self.bytes(count).map(|_| ())
    }

    pub fn array<const N: usize>(&mut self) -> FrameResult<[u8; N]> {
        let mut value = [0u8; N];
        value.copy_from_slice(self.bytes(N)?);
        Ok(value)
    }

    pub fn u8(&mut self) -> FrameResult<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16_le(&mut self) -> FrameResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32_le(&mut self) -> FrameResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn u64_le(&mut self) -> FrameResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    // fixed size text field, stops at first NUL
    pub fn text(&mut self, count: usize) -> FrameResult<String> {
        let raw = self.bytes(count)?;
        let end = raw.iter().position(|byte| *byte == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}

/// Cursor writing into a zero filled output frame.
pub struct FrameWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FrameWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        FrameWriter { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn reserve(&mut self, count: usize) -> FrameResult<&mut [u8]> {
        if self.remaining() < count {
            return Err(FrameError::Overflow {
                need: self.pos + count,
                avail: self.buf.len(),
            });
        }
        let start = self.pos;
        self.pos += count;
        Ok(&mut self.buf[start..start + count])
    }

    pub fn put_bytes(&mut self, data: &[u8]) -> FrameResult<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    pub fn put_zeros(&mut self, count: usize) -> FrameResult<()> {
        self.reserve(count)?.fill(0);
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> FrameResult<()> {
        self.put_bytes(&[value])
    }

    pub fn put_u16_le(&mut self, value: u16) -> FrameResult<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    pub fn put_u16_be(&mut self, value: u16) -> FrameResult<()> {
        self.put_bytes(&value.to_be_bytes())
    }

    pub fn put_u32_le(&mut self, value: u32) -> FrameResult<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    pub fn put_u64_le(&mut self, value: u64) -> FrameResult<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    // fixed size text field, NUL padded and cut when too long
    pub fn put_text(&mut self, text: &str, count: usize) -> FrameResult<()> {
        let slot = self.reserve(count)?;
        slot.fill(0);
        let raw = text.as_bytes();
        let len = raw.len().min(count);
        slot[..len].copy_from_slice(&raw[..len]);
        Ok(())
    }

    // rewrite a byte already emitted, used for length fields known after build
    pub fn patch_u8(&mut self, offset: usize, value: u8) -> FrameResult<()> {
        if offset >= self.pos {
            return Err(FrameError::Overflow {
                need: offset + 1,
                avail: self.pos,
            });
        }
        self.buf[offset] = value;
        Ok(())
    }
}

/// Sequential reader over a little-endian bit string: bit 0 is the least
/// significant bit of byte 0, and a field of N bits takes the next N bits
/// with its own bit 0 first.
pub struct BitReader<'a> {
    buf: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        BitReader { buf, bit: 0 }
    }

    pub fn at(buf: &'a [u8], bit: usize) -> Self {
        BitReader { buf, bit }
    }

    pub fn position(&self) -> usize {
        self.bit
    }

    /// Reads `width` (<= 64) bits. Callers check the buffer length once up
    /// front, bits past the end read as zero.
    pub fn take(&mut self, width: usize) -> u64 {
        let mut value: u64 = 0;
        for idx in 0..width {
            let bit = self.bit + idx;
            let set = self
                .buf
                .get(bit / 8)
                .map(|byte| (byte >> (bit % 8)) & 1)
                .unwrap_or(0);
            value |= (set as u64) << idx;
        }
        self.bit += width;
        value
    }

    pub fn take_u8(&mut self, width: usize) -> u8 {
        self.take(width) as u8
    }

    pub fn take_u16(&mut self, width: usize) -> u16 {
        self.take(width) as u16
    }

    pub fn flag(&mut self) -> bool {
        self.take(1) == 1
    }

    pub fn skip(&mut self, width: usize) {
        self.bit += width;
    }

    pub fn take_bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut value = [0u8; N];
        for byte in value.iter_mut() {
            *byte = self.take_u8(8);
        }
        value
    }
}

/// Mirror of [`BitReader`], packs fields into a zeroed buffer.
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    bit: usize,
}

impl<'a> BitWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        BitWriter { buf, bit: 0 }
    }

    pub fn position(&self) -> usize {
        self.bit
    }

    pub fn put(&mut self, width: usize, value: u64) {
        for idx in 0..width {
            let bit = self.bit + idx;
            if let Some(byte) = self.buf.get_mut(bit / 8) {
                let mask = 1u8 << (bit % 8);
                if (value >> idx) & 1 == 1 {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
            }
        }
        self.bit += width;
    }

    pub fn flag(&mut self, value: bool) {
        self.put(1, value as u64);
    }

    pub fn skip(&mut self, width: usize) {
        self.put(width, 0);
    }

    pub fn put_bytes(&mut self, data: &[u8]) {
        for byte in data {
            self.put(8, *byte as u64);
        }
    }
}
