// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{align_up, AllocationError, ArenaStorage, BufferView};
use serde::{Deserialize, Serialize};
use std::cell::Ref;
use std::ops::Range;
use std::rc::Rc;

/// What an arena's contents are used for. One [`Buffer`] exists per use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BufferUse {
    /// Host-only working data, never uploaded.
    CpuGeneric,
    /// Per-vertex attribute data.
    GpuVertexData,
    /// Per-instance and per-material data, uploaded by the binding strategy.
    GpuInstanceData,
    /// Frame-global data (camera, lights).
    UniformBlock,
}

impl BufferUse {
    /// Every use, in arena creation order.
    pub const ALL: [BufferUse; 4] = [
        BufferUse::CpuGeneric,
        BufferUse::GpuVertexData,
        BufferUse::GpuInstanceData,
        BufferUse::UniformBlock,
    ];

    /// Position of this use in [`BufferUse::ALL`].
    pub const fn index(self) -> usize {
        match self {
            BufferUse::CpuGeneric => 0,
            BufferUse::GpuVertexData => 1,
            BufferUse::GpuInstanceData => 2,
            BufferUse::UniformBlock => 3,
        }
    }
}

/// A fixed-capacity, never-reallocating byte arena.
///
/// Views are taken by bump allocation, each start padded to the buffer's
/// alignment. Taken bytes are never returned.
#[derive(Debug)]
pub struct Buffer {
    name: String,
    usage: BufferUse,
    byte_length: usize,
    alignment: usize,
    /// End of the highest taken range; bump allocation continues from here.
    watermark: usize,
    taken: Vec<Range<usize>>,
    storage: Rc<ArenaStorage>,
}

impl Buffer {
    /// Allocates a zero-filled arena of `byte_length` bytes.
    pub fn new(
        name: impl Into<String>,
        usage: BufferUse,
        byte_length: usize,
        alignment: usize,
    ) -> Result<Self, AllocationError> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(AllocationError::InvalidAlignment(alignment));
        }
        let name = name.into();
        log::debug!("Allocating {byte_length} byte arena '{name}' ({usage:?}, align {alignment})");
        Ok(Self {
            name,
            usage,
            byte_length,
            alignment,
            watermark: 0,
            taken: Vec::new(),
            storage: Rc::new(ArenaStorage::new(byte_length)),
        })
    }

    /// Takes the next `byte_length` bytes as a view.
    ///
    /// `byte_stride` is the default element stride of accessors taken from the
    /// view; zero means tightly packed.
    pub fn take_buffer_view(
        &mut self,
        name: impl Into<String>,
        byte_length: usize,
        byte_stride: usize,
    ) -> Result<BufferView, AllocationError> {
        if byte_length == 0 {
            return Err(AllocationError::ZeroSized);
        }
        let offset = align_up(self.watermark, self.alignment);
        let remaining = self.byte_length.saturating_sub(offset);
        if byte_length > remaining {
            return Err(AllocationError::BufferExhausted {
                buffer: self.name.clone(),
                requested: byte_length,
                remaining,
            });
        }
        Ok(self.commit(name.into(), offset, byte_length, byte_stride))
    }

    /// Takes `byte_length` bytes at an explicit, aligned `byte_offset`.
    pub fn take_buffer_view_with_byte_offset(
        &mut self,
        name: impl Into<String>,
        byte_offset: usize,
        byte_length: usize,
        byte_stride: usize,
    ) -> Result<BufferView, AllocationError> {
        if byte_length == 0 {
            return Err(AllocationError::ZeroSized);
        }
        if byte_offset % self.alignment != 0 {
            return Err(AllocationError::MisalignedOffset {
                offset: byte_offset,
                alignment: self.alignment,
            });
        }
        let end = byte_offset.saturating_add(byte_length);
        if end > self.byte_length {
            return Err(AllocationError::BufferExhausted {
                buffer: self.name.clone(),
                requested: byte_length,
                remaining: self.byte_length.saturating_sub(byte_offset),
            });
        }
        if self
            .taken
            .iter()
            .any(|r| r.start < end && byte_offset < r.end)
        {
            return Err(AllocationError::RangeOverlap {
                region: self.name.clone(),
                offset: byte_offset,
                length: byte_length,
            });
        }
        Ok(self.commit(name.into(), byte_offset, byte_length, byte_stride))
    }

    fn commit(
        &mut self,
        name: String,
        offset: usize,
        byte_length: usize,
        byte_stride: usize,
    ) -> BufferView {
        let end = offset + byte_length;
        self.taken.push(offset..end);
        self.watermark = self.watermark.max(end);
        log::trace!(
            "Buffer '{}': view '{name}' takes {offset}..{end}",
            self.name
        );
        BufferView::new(
            name,
            self.usage,
            Rc::clone(&self.storage),
            offset,
            byte_length,
            byte_stride,
        )
    }

    /// Name of the buffer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the buffer is used for.
    pub fn usage(&self) -> BufferUse {
        self.usage
    }

    /// Total capacity in bytes.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Alignment every view start is padded to.
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bytes consumed so far, padding included.
    pub fn taken_bytes(&self) -> usize {
        self.watermark
    }

    /// Bytes still available for bump allocation, ignoring future padding.
    pub fn remaining_bytes(&self) -> usize {
        self.byte_length - self.watermark
    }

    /// Number of views taken.
    pub fn view_count(&self) -> usize {
        self.taken.len()
    }

    /// Counter bumped by every accessor write into this buffer.
    pub fn write_version(&self) -> u64 {
        self.storage.write_version.get()
    }

    /// Borrows the whole arena for reading.
    ///
    /// # Panics
    /// Panics if called while an accessor write is in progress, which cannot
    /// happen on the single render thread.
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.storage.bytes.borrow(), |b| &b[..])
    }

    /// Copies the taken part of the arena, `0..taken_bytes()`.
    pub fn used_bytes(&self) -> Vec<u8> {
        self.bytes()[..self.watermark].to_vec()
    }
}
