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

use super::{AllocationError, Buffer, BufferUse, BufferView};
use crate::config::EngineLimits;

/// Owns one [`Buffer`] per [`BufferUse`], all sized from [`EngineLimits`] at
/// construction.
///
/// Created once per engine instance and passed by reference to every producer
/// that needs to take views.
#[derive(Debug)]
pub struct MemoryManager {
    /// Indexed by [`BufferUse::index`].
    buffers: Vec<Buffer>,
}

impl MemoryManager {
    /// Allocates every arena.
    pub fn new(limits: &EngineLimits) -> Result<Self, AllocationError> {
        let mut buffers = Vec::with_capacity(BufferUse::ALL.len());
        for usage in BufferUse::ALL {
            let (size, alignment) = match usage {
                BufferUse::CpuGeneric => (limits.cpu_generic_bytes, limits.vertex_alignment),
                BufferUse::GpuVertexData => (limits.gpu_vertex_bytes, limits.vertex_alignment),
                BufferUse::GpuInstanceData => (limits.gpu_instance_bytes, limits.gpu_alignment),
                BufferUse::UniformBlock => (limits.uniform_block_bytes, limits.gpu_alignment),
            };
            let name = format!("{usage:?}");
            buffers.push(Buffer::new(name, usage, size, alignment)?);
        }
        log::info!(
            "Memory arenas allocated: {}",
            buffers
                .iter()
                .map(|b| format!("{}={}B", b.name(), b.byte_length()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self { buffers })
    }

    /// The arena for `usage`.
    pub fn buffer(&self, usage: BufferUse) -> &Buffer {
        &self.buffers[usage.index()]
    }

    /// Mutable access to the arena for `usage`.
    pub fn buffer_mut(&mut self, usage: BufferUse) -> &mut Buffer {
        &mut self.buffers[usage.index()]
    }

    /// Takes a view from the arena for `usage`.
    pub fn take_buffer_view(
        &mut self,
        usage: BufferUse,
        name: impl Into<String>,
        byte_length: usize,
        byte_stride: usize,
    ) -> Result<BufferView, AllocationError> {
        self.buffer_mut(usage)
            .take_buffer_view(name, byte_length, byte_stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_arena_per_use() {
        let limits = EngineLimits::small();
        let memory = MemoryManager::new(&limits).unwrap();
        assert_eq!(
            memory.buffer(BufferUse::GpuInstanceData).byte_length(),
            limits.gpu_instance_bytes
        );
        assert_eq!(
            memory.buffer(BufferUse::UniformBlock).alignment(),
            limits.gpu_alignment
        );
    }

    #[test]
    fn test_take_view_by_use() {
        let mut memory = MemoryManager::new(&EngineLimits::small()).unwrap();
        let view = memory
            .take_buffer_view(BufferUse::GpuVertexData, "positions", 120, 12)
            .unwrap();
        assert_eq!(view.byte_length(), 120);
        assert_eq!(memory.buffer(BufferUse::GpuVertexData).taken_bytes(), 120);
    }

    #[test]
    fn test_bad_alignment_is_reported() {
        let limits = EngineLimits {
            gpu_alignment: 12,
            ..EngineLimits::small()
        };
        assert_eq!(
            MemoryManager::new(&limits).unwrap_err(),
            AllocationError::InvalidAlignment(12)
        );
    }
}
