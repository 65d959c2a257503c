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

use super::{align_up, Accessor, AccessorDescriptor, AllocationError, ArenaStorage, BufferUse};
use std::rc::Rc;

/// A named, byte-bounded region of exactly one [`Buffer`](super::Buffer).
///
/// Carved once from its buffer and never re-carved. Accessors are taken from
/// it by bump allocation, each start padded to its component size, or placed
/// at an explicit offset. Strided accessors sharing a stride may interleave as
/// long as their byte lanes stay disjoint.
#[derive(Debug)]
pub struct BufferView {
    name: String,
    usage: BufferUse,
    storage: Rc<ArenaStorage>,
    byte_offset_in_buffer: usize,
    byte_length: usize,
    byte_stride: usize,
    taken_bytes: usize,
    taken: Vec<TakenSpan>,
}

/// Bytes of the view one accessor touches.
#[derive(Debug, Clone, Copy)]
struct TakenSpan {
    start: usize,
    end: usize,
    stride: usize,
    element_size: usize,
}

impl TakenSpan {
    fn overlaps(&self, other: &TakenSpan) -> bool {
        if self.start >= other.end || other.start >= self.end {
            return false;
        }
        if self.stride != other.stride {
            return true;
        }
        // Same stride: elements repeat every `stride` bytes, so compare the
        // lane each one occupies inside a stride.
        let s = self.stride;
        let (a, b) = (self.start % s, other.start % s);
        (b + s - a) % s < self.element_size || (a + s - b) % s < other.element_size
    }
}

impl BufferView {
    pub(crate) fn new(
        name: String,
        usage: BufferUse,
        storage: Rc<ArenaStorage>,
        byte_offset_in_buffer: usize,
        byte_length: usize,
        byte_stride: usize,
    ) -> Self {
        Self {
            name,
            usage,
            storage,
            byte_offset_in_buffer,
            byte_length,
            byte_stride,
            taken_bytes: 0,
            taken: Vec::new(),
        }
    }

    /// Takes the next accessor described by `descriptor`.
    pub fn take_accessor(
        &mut self,
        descriptor: &AccessorDescriptor,
    ) -> Result<Accessor, AllocationError> {
        let offset = align_up(self.taken_bytes, descriptor.component.byte_size());
        self.place_accessor(descriptor, offset, false)
    }

    /// Takes an accessor at an explicit offset inside the view.
    ///
    /// The offset must be a multiple of the component size and the accessor
    /// must not touch bytes another accessor uses. An attribute interleaved
    /// into the lanes of another one with the same stride is accepted.
    pub fn take_accessor_with_byte_offset(
        &mut self,
        descriptor: &AccessorDescriptor,
        byte_offset_in_view: usize,
    ) -> Result<Accessor, AllocationError> {
        let alignment = descriptor.component.byte_size();
        if byte_offset_in_view % alignment != 0 {
            return Err(AllocationError::MisalignedOffset {
                offset: byte_offset_in_view,
                alignment,
            });
        }
        self.place_accessor(descriptor, byte_offset_in_view, true)
    }

    fn place_accessor(
        &mut self,
        descriptor: &AccessorDescriptor,
        offset: usize,
        explicit: bool,
    ) -> Result<Accessor, AllocationError> {
        if descriptor.count == 0 {
            return Err(AllocationError::ZeroSized);
        }
        let element_size = descriptor.element_byte_size();
        let stride = descriptor
            .byte_stride
            .unwrap_or(if self.byte_stride > 0 {
                self.byte_stride
            } else {
                element_size
            });
        if stride < element_size {
            return Err(AllocationError::InvalidStride {
                stride,
                element_size,
            });
        }
        // The last element needs its own bytes only, not a whole stride.
        let remaining = self.byte_length.saturating_sub(offset);
        let requested = stride
            .checked_mul(descriptor.count - 1)
            .and_then(|bytes| bytes.checked_add(element_size));
        let end = requested.and_then(|bytes| offset.checked_add(bytes));
        let (Some(requested), Some(end)) = (requested, end) else {
            return Err(AllocationError::ViewExhausted {
                view: self.name.clone(),
                requested: usize::MAX,
                remaining,
            });
        };
        if end > self.byte_length {
            return Err(AllocationError::ViewExhausted {
                view: self.name.clone(),
                requested,
                remaining,
            });
        }
        let span = TakenSpan {
            start: offset,
            end,
            stride,
            element_size,
        };
        if explicit && self.taken.iter().any(|taken| taken.overlaps(&span)) {
            return Err(AllocationError::RangeOverlap {
                region: self.name.clone(),
                offset,
                length: requested,
            });
        }
        self.taken.push(span);
        self.taken_bytes = self.taken_bytes.max(end);
        Ok(Accessor::new(
            descriptor,
            Rc::clone(&self.storage),
            self.name.clone(),
            self.byte_offset_in_buffer,
            self.byte_length,
            offset,
            stride,
        ))
    }

    /// Name of the view.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Use of the owning buffer.
    pub fn usage(&self) -> BufferUse {
        self.usage
    }

    /// Offset of the view's first byte in its buffer.
    pub fn byte_offset_in_buffer(&self) -> usize {
        self.byte_offset_in_buffer
    }

    /// Length of the view in bytes.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Default element stride, zero when tightly packed.
    pub fn byte_stride(&self) -> usize {
        self.byte_stride
    }

    /// Bytes consumed by accessors so far, padding included.
    pub fn taken_bytes(&self) -> usize {
        self.taken_bytes
    }

    /// Bytes still available, ignoring future padding.
    pub fn remaining_bytes(&self) -> usize {
        self.byte_length - self.taken_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::super::Buffer;
    use super::*;
    use strata_core::layout::{ComponentType, CompositionType};

    #[test]
    fn test_vec3_accessors_exhaust_view() {
        let mut buffer = Buffer::new("arena", BufferUse::CpuGeneric, 256, 4).unwrap();
        let mut view = buffer.take_buffer_view("view", 64, 0).unwrap();
        assert_eq!(view.byte_offset_in_buffer(), 0);

        let desc4 = AccessorDescriptor::new(CompositionType::Vec3, ComponentType::F32, 4);
        let first = view.take_accessor(&desc4).unwrap();
        assert_eq!(first.byte_length(), 48);
        assert_eq!(view.remaining_bytes(), 16);

        let desc2 = AccessorDescriptor::new(CompositionType::Vec3, ComponentType::F32, 2);
        let err = view.take_accessor(&desc2).unwrap_err();
        assert_eq!(
            err,
            AllocationError::ViewExhausted {
                view: "view".to_string(),
                requested: 24,
                remaining: 16,
            }
        );
        // The failed request consumed nothing.
        assert_eq!(view.taken_bytes(), 48);
    }

    #[test]
    fn test_accessor_containment() {
        let mut buffer = Buffer::new("arena", BufferUse::CpuGeneric, 512, 16).unwrap();
        buffer.take_buffer_view("pad", 20, 0).unwrap();
        let mut view = buffer.take_buffer_view("view", 200, 0).unwrap();
        let descriptors = [
            AccessorDescriptor::new(CompositionType::Scalar, ComponentType::U8, 3),
            AccessorDescriptor::new(CompositionType::Vec2, ComponentType::I16, 5),
            AccessorDescriptor::new(CompositionType::Mat3, ComponentType::F32, 1).vec4_columns(),
            AccessorDescriptor::new(CompositionType::Vec4, ComponentType::U16, 2).with_stride(12),
        ];
        for desc in &descriptors {
            let a = view.take_accessor(desc).unwrap();
            assert!(a.byte_offset_in_buffer() >= view.byte_offset_in_buffer());
            assert!(
                a.byte_offset_in_buffer() + a.byte_length()
                    <= view.byte_offset_in_buffer() + view.byte_length()
            );
            assert!(view.byte_offset_in_buffer() + view.byte_length() <= buffer.byte_length());
        }
    }

    #[test]
    fn test_accessor_start_padded_to_component_size() {
        let mut buffer = Buffer::new("arena", BufferUse::CpuGeneric, 64, 4).unwrap();
        let mut view = buffer.take_buffer_view("view", 64, 0).unwrap();
        let bytes = view
            .take_accessor(&AccessorDescriptor::new(
                CompositionType::Scalar,
                ComponentType::U8,
                3,
            ))
            .unwrap();
        let floats = view
            .take_accessor(&AccessorDescriptor::new(
                CompositionType::Scalar,
                ComponentType::F32,
                1,
            ))
            .unwrap();
        assert_eq!(bytes.byte_offset_in_view(), 0);
        assert_eq!(floats.byte_offset_in_view(), 4);
    }

    #[test]
    fn test_interleaved_position_and_normal() {
        let mut buffer = Buffer::new("arena", BufferUse::GpuVertexData, 128, 4).unwrap();
        let mut view = buffer.take_buffer_view("interleaved", 72, 24).unwrap();
        let vec3 = AccessorDescriptor::new(CompositionType::Vec3, ComponentType::F32, 3);
        let mut position = view.take_accessor_with_byte_offset(&vec3, 0).unwrap();
        let mut normal = view.take_accessor_with_byte_offset(&vec3, 12).unwrap();
        assert_eq!(position.byte_length(), 60);
        assert_eq!(normal.byte_offset_in_view() + normal.byte_length(), 72);
        assert_eq!(view.taken_bytes(), 72);

        for i in 0..3 {
            let f = i as f32;
            position.set_components(i, &[f, f + 0.5, -f]);
            normal.set_components(i, &[0.0, 1.0, f]);
        }
        for i in 0..3 {
            let f = i as f32;
            assert_eq!(position.get_components(i, Default::default()), vec![f, f + 0.5, -f]);
            assert_eq!(normal.get_components(i, Default::default()), vec![0.0, 1.0, f]);
        }
        let scalar = AccessorDescriptor::new(CompositionType::Scalar, ComponentType::F32, 1);
        assert!(matches!(
            view.take_accessor_with_byte_offset(&scalar, 16),
            Err(AllocationError::RangeOverlap { .. })
        ));
    }

    #[test]
    fn test_huge_count_is_an_allocation_error() {
        let mut buffer = Buffer::new("arena", BufferUse::CpuGeneric, 64, 4).unwrap();
        let mut view = buffer.take_buffer_view("view", 64, 0).unwrap();
        let huge = AccessorDescriptor::new(CompositionType::Vec4, ComponentType::F32, usize::MAX / 8);
        assert!(matches!(
            view.take_accessor(&huge),
            Err(AllocationError::ViewExhausted { .. })
        ));
        let far = AccessorDescriptor::new(CompositionType::Scalar, ComponentType::U8, 2);
        assert!(matches!(
            view.take_accessor_with_byte_offset(&far, usize::MAX),
            Err(AllocationError::ViewExhausted { .. })
        ));
        assert_eq!(view.taken_bytes(), 0);
    }

    #[test]
    fn test_view_default_stride_and_invalid_stride() {
        let mut buffer = Buffer::new("arena", BufferUse::GpuVertexData, 128, 4).unwrap();
        let mut view = buffer.take_buffer_view("interleaved", 128, 24).unwrap();
        let pos = view
            .take_accessor_with_byte_offset(
                &AccessorDescriptor::new(CompositionType::Vec3, ComponentType::F32, 2),
                0,
            )
            .unwrap();
        assert_eq!(pos.byte_stride(), 24);
        assert_eq!(pos.byte_length(), 36);
        let err = view
            .take_accessor(
                &AccessorDescriptor::new(CompositionType::Vec4, ComponentType::F32, 1)
                    .with_stride(8),
            )
            .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidStride { .. }));
        assert!(matches!(
            view.take_accessor_with_byte_offset(
                &AccessorDescriptor::new(CompositionType::Scalar, ComponentType::F32, 1),
                8
            ),
            Err(AllocationError::RangeOverlap { .. })
        ));
    }
}
