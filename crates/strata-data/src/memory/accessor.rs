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

//! Typed, strided views into a buffer view.

use super::{AllocationError, ArenaStorage};
use std::rc::Rc;
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::math::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Byte order used to interpret raw component bytes on read.
///
/// Writes are always little-endian; big-endian reads exist for data handed
/// over by importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Options for [`Accessor::get_components`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions<'a> {
    /// When set, the requested index is first looked up in this scalar
    /// accessor (e.g. reading vertex attributes through an index buffer).
    pub indices: Option<&'a Accessor>,
    /// Byte order of the stored components.
    pub endian: Endian,
}

/// Describes an accessor to take from a [`BufferView`](super::BufferView).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorDescriptor {
    /// Shape of each element.
    pub composition: CompositionType,
    /// Encoding of each component.
    pub component: ComponentType,
    /// Number of elements.
    pub count: usize,
    /// Integer components map to [0, 1] (unsigned) or [-1, 1] (signed).
    pub normalized: bool,
    /// Explicit element stride. Falls back to the view's stride, then to the
    /// element size.
    pub byte_stride: Option<usize>,
    /// Start every vector and matrix column on a four-component boundary, the
    /// layout shaders read per-instance data with.
    pub vec4_columns: bool,
}

impl AccessorDescriptor {
    /// A tightly packed, unnormalized accessor.
    pub fn new(composition: CompositionType, component: ComponentType, count: usize) -> Self {
        Self {
            composition,
            component,
            count,
            normalized: false,
            byte_stride: None,
            vec4_columns: false,
        }
    }

    /// Marks integer components as normalized.
    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    /// Sets an explicit element stride.
    pub fn with_stride(mut self, byte_stride: usize) -> Self {
        self.byte_stride = Some(byte_stride);
        self
    }

    /// Pads every column to four components.
    pub fn vec4_columns(mut self) -> Self {
        self.vec4_columns = true;
        self
    }

    /// Distance in bytes between consecutive columns of one element.
    pub fn column_byte_stride(&self) -> usize {
        let per_column = if self.vec4_columns {
            4
        } else {
            self.composition.column_length()
        };
        per_column * self.component.byte_size()
    }

    /// Bytes occupied by one element, padding included.
    pub fn element_byte_size(&self) -> usize {
        let columns = if self.composition.is_matrix() {
            self.composition.vec4_slots()
        } else {
            1
        };
        if self.vec4_columns {
            columns * self.column_byte_stride()
        } else {
            self.composition.component_count() * self.component.byte_size()
        }
    }
}

/// A pool of element slots with a free list, used for "take one" pooling of
/// per-component storage.
#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    capacity: usize,
    next: usize,
    free: Vec<usize>,
}

impl SlotPool {
    /// A pool handing out `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next: 0,
            free: Vec::new(),
        }
    }

    /// Takes a released slot if there is one, otherwise the next unused slot.
    pub fn take(&mut self) -> Option<usize> {
        if let Some(slot) = self.free.pop() {
            return Some(slot);
        }
        if self.next < self.capacity {
            self.next += 1;
            Some(self.next - 1)
        } else {
            None
        }
    }

    /// Returns a slot to the pool. Returns `false` if it was not in use.
    pub fn release(&mut self, slot: usize) -> bool {
        if slot >= self.next || self.free.contains(&slot) {
            return false;
        }
        self.free.push(slot);
        true
    }

    /// Number of slots currently in use.
    pub fn in_use(&self) -> usize {
        self.next - self.free.len()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A typed, strided view into exactly one buffer view.
///
/// Every mutating write bumps [`Accessor::version`] and the owning buffer's
/// write version. Reads and writes of in-range indices never fail; an
/// out-of-range index is a contract violation and panics, like slice indexing.
#[derive(Debug)]
pub struct Accessor {
    storage: Rc<ArenaStorage>,
    view_name: String,
    view_byte_offset: usize,
    view_byte_length: usize,
    byte_offset_in_view: usize,
    composition: CompositionType,
    component: ComponentType,
    count: usize,
    normalized: bool,
    byte_stride: usize,
    column_byte_stride: usize,
    element_byte_size: usize,
    version: u64,
    min_max: Option<(Vec<f32>, Vec<f32>)>,
    slots: SlotPool,
}

impl Accessor {
    pub(crate) fn new(
        descriptor: &AccessorDescriptor,
        storage: Rc<ArenaStorage>,
        view_name: String,
        view_byte_offset: usize,
        view_byte_length: usize,
        byte_offset_in_view: usize,
        byte_stride: usize,
    ) -> Self {
        Self {
            storage,
            view_name,
            view_byte_offset,
            view_byte_length,
            byte_offset_in_view,
            composition: descriptor.composition,
            component: descriptor.component,
            count: descriptor.count,
            normalized: descriptor.normalized,
            byte_stride,
            column_byte_stride: descriptor.column_byte_stride(),
            element_byte_size: descriptor.element_byte_size(),
            version: 0,
            min_max: None,
            slots: SlotPool::new(descriptor.count),
        }
    }

    // --- Layout ---

    /// Shape of each element.
    pub fn composition(&self) -> CompositionType {
        self.composition
    }

    /// Encoding of each component.
    pub fn component(&self) -> ComponentType {
        self.component
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether integer components are normalized.
    pub fn normalized(&self) -> bool {
        self.normalized
    }

    /// Distance in bytes between consecutive elements.
    pub fn byte_stride(&self) -> usize {
        self.byte_stride
    }

    /// Bytes occupied by one element, padding included.
    pub fn element_byte_size(&self) -> usize {
        self.element_byte_size
    }

    /// Bytes covered by the accessor, from the first byte of the first
    /// element to the last byte of the last one.
    pub fn byte_length(&self) -> usize {
        match self.count {
            0 => 0,
            n => self.byte_stride * (n - 1) + self.element_byte_size,
        }
    }

    /// Offset of the first element inside the owning view.
    pub fn byte_offset_in_view(&self) -> usize {
        self.byte_offset_in_view
    }

    /// Offset of the first element inside the owning buffer.
    pub fn byte_offset_in_buffer(&self) -> usize {
        self.view_byte_offset + self.byte_offset_in_view
    }

    /// Name of the owning view.
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// Offset of the owning view inside its buffer.
    pub fn view_byte_offset_in_buffer(&self) -> usize {
        self.view_byte_offset
    }

    /// Length of the owning view.
    pub fn view_byte_length(&self) -> usize {
        self.view_byte_length
    }

    /// Offset of the first element in vec4 (16-byte) units, if aligned.
    pub fn vec4_offset_in_buffer(&self) -> Option<usize> {
        let offset = self.byte_offset_in_buffer();
        (offset % 16 == 0).then_some(offset / 16)
    }

    /// Incremented on every mutating write.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Write version of the whole owning buffer.
    pub fn arena_write_version(&self) -> u64 {
        self.storage.write_version.get()
    }

    fn component_offset(&self, index: usize, component: usize) -> usize {
        let rows = self.composition.column_length();
        self.byte_offset_in_buffer()
            + index * self.byte_stride
            + (component / rows) * self.column_byte_stride
            + (component % rows) * self.component.byte_size()
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.count,
            "accessor index {index} out of range for '{}' (count {})",
            self.view_name,
            self.count
        );
    }

    // --- Generic access ---

    /// Writes one element from its components (column-major for matrices).
    ///
    /// # Panics
    /// Panics if `index` is out of range or `values` does not hold exactly one
    /// element.
    pub fn set_components(&mut self, index: usize, values: &[f32]) {
        self.check_index(index);
        self.write_element(index, values);
        self.mark_written();
    }

    fn write_element(&self, index: usize, values: &[f32]) {
        assert_eq!(
            values.len(),
            self.composition.component_count(),
            "expected one {} element",
            self.composition
        );
        let size = self.component.byte_size();
        let mut bytes = self.storage.bytes.borrow_mut();
        for (i, value) in values.iter().enumerate() {
            let at = self.component_offset(index, i);
            encode(
                &mut bytes[at..at + size],
                self.component,
                self.normalized,
                *value,
            );
        }
    }

    fn mark_written(&mut self) {
        self.version += 1;
        self.min_max = None;
        self.storage.bump_write_version();
    }

    /// Reads one element's components (column-major for matrices).
    ///
    /// # Panics
    /// Panics if the (possibly indirected) index is out of range.
    pub fn get_components(&self, index: usize, options: ReadOptions<'_>) -> Vec<f32> {
        let index = match options.indices {
            Some(indices) => indices.get_index(index),
            None => index,
        };
        self.check_index(index);
        let size = self.component.byte_size();
        let bytes = self.storage.bytes.borrow();
        (0..self.composition.component_count())
            .map(|i| {
                let at = self.component_offset(index, i);
                decode(&bytes[at..at + size], self.component, self.normalized, options.endian)
            })
            .collect()
    }

    /// Reads one element into `out` without allocating.
    ///
    /// # Panics
    /// Panics if `index` is out of range or `out` is shorter than one element.
    pub fn get_components_into(&self, index: usize, out: &mut [f32]) {
        self.check_index(index);
        let size = self.component.byte_size();
        let bytes = self.storage.bytes.borrow();
        for (i, slot) in out[..self.composition.component_count()]
            .iter_mut()
            .enumerate()
        {
            let at = self.component_offset(index, i);
            *slot = decode(&bytes[at..at + size], self.component, self.normalized, Endian::Little);
        }
    }

    // --- Typed access ---

    /// Writes a scalar element.
    pub fn set_scalar(&mut self, index: usize, value: f32) {
        self.set_components(index, &[value]);
    }

    /// Reads a scalar element.
    pub fn get_scalar(&self, index: usize) -> f32 {
        let mut out = [0.0];
        self.get_components_into(index, &mut out);
        out[0]
    }

    /// Writes an integer index without a round trip through `f32`.
    ///
    /// Values that do not fit the component type are clamped.
    pub fn set_index(&mut self, index: usize, value: u32) {
        self.check_index(index);
        let at = self.component_offset(index, 0);
        {
            let mut bytes = self.storage.bytes.borrow_mut();
            let out = &mut bytes[at..at + self.component.byte_size()];
            match self.component {
                ComponentType::I8 => out[0] = value.min(i8::MAX as u32) as u8,
                ComponentType::U8 => out[0] = value.min(u8::MAX as u32) as u8,
                ComponentType::I16 => {
                    out.copy_from_slice(&(value.min(i16::MAX as u32) as i16).to_le_bytes())
                }
                ComponentType::U16 => {
                    out.copy_from_slice(&(value.min(u16::MAX as u32) as u16).to_le_bytes())
                }
                ComponentType::I32 => {
                    out.copy_from_slice(&(value.min(i32::MAX as u32) as i32).to_le_bytes())
                }
                ComponentType::U32 => out.copy_from_slice(&value.to_le_bytes()),
                ComponentType::F32 => out.copy_from_slice(&(value as f32).to_le_bytes()),
            }
        }
        self.mark_written();
    }

    /// Reads the first component of an element as an index.
    ///
    /// Integer components are read as integers; negative values read as 0.
    pub fn get_index(&self, index: usize) -> usize {
        self.check_index(index);
        let at = self.component_offset(index, 0);
        let bytes = self.storage.bytes.borrow();
        let raw = &bytes[at..at + self.component.byte_size()];
        match self.component {
            ComponentType::I8 => (raw[0] as i8).max(0) as usize,
            ComponentType::U8 => raw[0] as usize,
            ComponentType::I16 => i16::from_le_bytes(read_array::<2>(raw)).max(0) as usize,
            ComponentType::U16 => u16::from_le_bytes(read_array::<2>(raw)) as usize,
            ComponentType::I32 => i32::from_le_bytes(read_array::<4>(raw)).max(0) as usize,
            ComponentType::U32 => u32::from_le_bytes(read_array::<4>(raw)) as usize,
            ComponentType::F32 => f32::from_le_bytes(read_array::<4>(raw)).max(0.0) as usize,
        }
    }

    /// Writes a vec2 element.
    pub fn set_vec2(&mut self, index: usize, value: Vec2) {
        self.set_components(index, &value.to_array());
    }

    /// Reads a vec2 element.
    pub fn get_vec2(&self, index: usize) -> Vec2 {
        let mut out = [0.0; 2];
        self.get_components_into(index, &mut out);
        Vec2::new(out[0], out[1])
    }

    /// Writes a vec3 element.
    pub fn set_vec3(&mut self, index: usize, value: Vec3) {
        self.set_components(index, &value.to_array());
    }

    /// Reads a vec3 element.
    pub fn get_vec3(&self, index: usize) -> Vec3 {
        let mut out = [0.0; 3];
        self.get_components_into(index, &mut out);
        Vec3::new(out[0], out[1], out[2])
    }

    /// Writes a vec4 element.
    pub fn set_vec4(&mut self, index: usize, value: Vec4) {
        self.set_components(index, &value.to_array());
    }

    /// Reads a vec4 element.
    pub fn get_vec4(&self, index: usize) -> Vec4 {
        let mut out = [0.0; 4];
        self.get_components_into(index, &mut out);
        Vec4::new(out[0], out[1], out[2], out[3])
    }

    /// Writes a mat3 element.
    pub fn set_mat3(&mut self, index: usize, value: &Mat3) {
        self.set_components(index, &value.to_cols_array());
    }

    /// Reads a mat3 element.
    pub fn get_mat3(&self, index: usize) -> Mat3 {
        let mut out = [0.0; 9];
        self.get_components_into(index, &mut out);
        Mat3::from_cols_slice(&out)
    }

    /// Writes a mat4 element.
    pub fn set_mat4(&mut self, index: usize, value: &Mat4) {
        self.set_components(index, &value.to_cols_array());
    }

    /// Reads a mat4 element.
    pub fn get_mat4(&self, index: usize) -> Mat4 {
        let mut out = [0.0; 16];
        self.get_components_into(index, &mut out);
        Mat4::from_cols_slice(&out)
    }

    // --- Pooling ---

    /// Takes a free element slot, reusing released ones first.
    pub fn take_one(&mut self) -> Option<usize> {
        self.slots.take()
    }

    /// Returns an element slot taken with [`Accessor::take_one`].
    pub fn release_one(&mut self, slot: usize) -> bool {
        self.slots.release(slot)
    }

    /// Number of pooled slots in use.
    pub fn slots_in_use(&self) -> usize {
        self.slots.in_use()
    }

    // --- Bulk operations ---

    /// Computes and caches the per-component minimum and maximum over all
    /// elements. The cache is dropped by the next write.
    pub fn calc_min_max(&mut self) -> (&[f32], &[f32]) {
        if self.min_max.is_none() {
            let n = self.composition.component_count();
            let mut min = vec![f32::INFINITY; n];
            let mut max = vec![f32::NEG_INFINITY; n];
            let mut element = vec![0.0; n];
            for index in 0..self.count {
                self.get_components_into(index, &mut element);
                for (i, v) in element.iter().enumerate() {
                    min[i] = min[i].min(*v);
                    max[i] = max[i].max(*v);
                }
            }
            self.min_max = Some((min, max));
        }
        match &self.min_max {
            Some((min, max)) => (min, max),
            None => (&[], &[]),
        }
    }

    /// Cached minimum, if [`Accessor::calc_min_max`] ran since the last write.
    pub fn min(&self) -> Option<&[f32]> {
        self.min_max.as_ref().map(|(min, _)| min.as_slice())
    }

    /// Cached maximum, if [`Accessor::calc_min_max`] ran since the last write.
    pub fn max(&self) -> Option<&[f32]> {
        self.min_max.as_ref().map(|(_, max)| max.as_slice())
    }

    /// Every element's components, flattened.
    pub fn as_f32_vec(&self) -> Vec<f32> {
        let n = self.composition.component_count();
        let mut out = vec![0.0; n * self.count];
        for (index, chunk) in out.chunks_exact_mut(n).enumerate() {
            self.get_components_into(index, chunk);
        }
        out
    }

    /// Copies every element of `source` into the same indices of `self`,
    /// converting between component encodings.
    pub fn copy_from(&mut self, source: &Accessor) -> Result<(), AllocationError> {
        if source.composition != self.composition {
            return Err(AllocationError::IncompatibleAccessor(format!(
                "cannot copy {} elements into {}",
                source.composition, self.composition
            )));
        }
        if source.count > self.count {
            return Err(AllocationError::IncompatibleAccessor(format!(
                "source holds {} elements, target only {}",
                source.count, self.count
            )));
        }
        // Read first: both accessors may share one arena.
        let values = source.as_f32_vec();
        let n = self.composition.component_count();
        for (index, chunk) in values.chunks_exact(n).enumerate() {
            self.write_element(index, chunk);
        }
        self.mark_written();
        Ok(())
    }

    /// Copies the raw bytes covered by the accessor.
    pub fn to_bytes(&self) -> Vec<u8> {
        let start = self.byte_offset_in_buffer();
        self.storage.bytes.borrow()[start..start + self.byte_length()].to_vec()
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn encode(bytes: &mut [u8], component: ComponentType, normalized: bool, value: f32) {
    let v = value as f64;
    let to_int = |lo: f64, hi: f64| -> f64 {
        if normalized {
            let floor = if lo < 0.0 { -1.0 } else { 0.0 };
            (v.clamp(floor, 1.0) * hi).round()
        } else {
            v.round().clamp(lo, hi)
        }
    };
    match component {
        ComponentType::I8 => bytes[0] = (to_int(i8::MIN as f64, i8::MAX as f64) as i8) as u8,
        ComponentType::U8 => bytes[0] = to_int(0.0, u8::MAX as f64) as u8,
        ComponentType::I16 => bytes[..2]
            .copy_from_slice(&(to_int(i16::MIN as f64, i16::MAX as f64) as i16).to_le_bytes()),
        ComponentType::U16 => {
            bytes[..2].copy_from_slice(&(to_int(0.0, u16::MAX as f64) as u16).to_le_bytes())
        }
        ComponentType::I32 => bytes[..4]
            .copy_from_slice(&(to_int(i32::MIN as f64, i32::MAX as f64) as i32).to_le_bytes()),
        ComponentType::U32 => {
            bytes[..4].copy_from_slice(&(to_int(0.0, u32::MAX as f64) as u32).to_le_bytes())
        }
        ComponentType::F32 => bytes[..4].copy_from_slice(&value.to_le_bytes()),
    }
}

fn decode(bytes: &[u8], component: ComponentType, normalized: bool, endian: Endian) -> f32 {
    macro_rules! read {
        ($ty:ty, $n:literal) => {{
            let raw = read_array::<$n>(bytes);
            match endian {
                Endian::Little => <$ty>::from_le_bytes(raw),
                Endian::Big => <$ty>::from_be_bytes(raw),
            }
        }};
    }
    let raw = match component {
        ComponentType::I8 => bytes[0] as i8 as f64,
        ComponentType::U8 => bytes[0] as f64,
        ComponentType::I16 => read!(i16, 2) as f64,
        ComponentType::U16 => read!(u16, 2) as f64,
        ComponentType::I32 => read!(i32, 4) as f64,
        ComponentType::U32 => read!(u32, 4) as f64,
        ComponentType::F32 => return read!(f32, 4),
    };
    if normalized {
        (raw / component.normalization_range()).max(-1.0) as f32
    } else {
        raw as f32
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Buffer, BufferUse, BufferView};
    use super::*;

    const COMPOSITIONS: [CompositionType; 7] = [
        CompositionType::Scalar,
        CompositionType::Vec2,
        CompositionType::Vec3,
        CompositionType::Vec4,
        CompositionType::Mat2,
        CompositionType::Mat3,
        CompositionType::Mat4,
    ];

    const COMPONENTS: [ComponentType; 7] = [
        ComponentType::I8,
        ComponentType::U8,
        ComponentType::I16,
        ComponentType::U16,
        ComponentType::I32,
        ComponentType::U32,
        ComponentType::F32,
    ];

    fn view(len: usize) -> (Buffer, BufferView) {
        let mut buffer = Buffer::new("arena", BufferUse::CpuGeneric, len, 16).unwrap();
        let view = buffer.take_buffer_view("view", len, 0).unwrap();
        (buffer, view)
    }

    /// Values every encoding stores without loss.
    fn sample(component: ComponentType, normalized: bool, i: usize) -> f32 {
        let k = (i % 5) as f32 + 1.0;
        let signed = component.is_signed_integer() || component == ComponentType::F32;
        let sign = if signed && i % 2 == 1 { -1.0 } else { 1.0 };
        match (component, normalized) {
            (ComponentType::F32, _) => sign * k * 0.375,
            (_, false) => sign * k,
            (_, true) => {
                let range = component.normalization_range();
                (sign as f64 * k as f64 / range) as f32
            }
        }
    }

    #[test]
    fn test_round_trip_every_layout() {
        for composition in COMPOSITIONS {
            for component in COMPONENTS {
                for normalized in [false, true] {
                    for vec4_columns in [false, true] {
                        let (_buffer, mut view) = view(1024);
                        let mut desc = AccessorDescriptor::new(composition, component, 3);
                        desc.normalized = normalized;
                        desc.vec4_columns = vec4_columns;
                        let mut accessor = view.take_accessor(&desc).unwrap();
                        let n = composition.component_count();
                        for index in 0..3 {
                            let values: Vec<f32> = (0..n)
                                .map(|i| sample(component, normalized, i + index))
                                .collect();
                            accessor.set_components(index, &values);
                            assert_eq!(
                                accessor.get_components(index, ReadOptions::default()),
                                values,
                                "{composition} {component} normalized={normalized} vec4={vec4_columns}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_typed_round_trip() {
        let (_buffer, mut view) = view(512);
        let mut m4 = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Mat4, ComponentType::F32, 2))
            .unwrap();
        let world = Mat4::from_translation(Vec3::new(1.0, -2.0, 3.5));
        m4.set_mat4(1, &world);
        assert_eq!(m4.get_mat4(1), world);

        let mut m3 = view
            .take_accessor(
                &AccessorDescriptor::new(CompositionType::Mat3, ComponentType::F32, 1).vec4_columns(),
            )
            .unwrap();
        assert_eq!(m3.element_byte_size(), 48);
        let normal = Mat3::from_cols(Vec3::X, Vec3::Z, Vec3::Y * 2.0);
        m3.set_mat3(0, &normal);
        assert_eq!(m3.get_mat3(0), normal);

        let mut v2 = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Vec2, ComponentType::F32, 1))
            .unwrap();
        v2.set_vec2(0, Vec2::new(0.25, -4.0));
        assert_eq!(v2.get_vec2(0), Vec2::new(0.25, -4.0));
    }

    #[test]
    fn test_vec4_columns_pad_matrix_columns() {
        let (buffer, mut view) = view(64);
        let mut m3 = view
            .take_accessor(
                &AccessorDescriptor::new(CompositionType::Mat3, ComponentType::F32, 1).vec4_columns(),
            )
            .unwrap();
        m3.set_mat3(0, &Mat3::IDENTITY);
        let floats: Vec<f32> = buffer.bytes()[..48]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(
            floats,
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_version_bumps_on_every_write() {
        let (buffer, mut view) = view(64);
        let mut a = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::F32, 4))
            .unwrap();
        assert_eq!(a.version(), 0);
        a.set_scalar(0, 1.0);
        a.set_scalar(0, 1.0);
        assert_eq!(a.version(), 2);
        assert_eq!(buffer.write_version(), 2);
        let _ = a.get_scalar(0);
        assert_eq!(a.version(), 2);
    }

    #[test]
    fn test_indexed_read() {
        let (_buffer, mut view) = view(128);
        let mut positions = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Vec3, ComponentType::F32, 3))
            .unwrap();
        let mut indices = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::U16, 2))
            .unwrap();
        positions.set_vec3(2, Vec3::new(7.0, 8.0, 9.0));
        indices.set_index(1, 2);
        let read = positions.get_components(
            1,
            ReadOptions {
                indices: Some(&indices),
                endian: Endian::Little,
            },
        );
        assert_eq!(read, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_large_u32_index_kept_exact() {
        let (_buffer, mut view) = view(16);
        let mut indices = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::U32, 2))
            .unwrap();
        indices.set_index(0, 16_777_217);
        indices.set_index(1, u32::MAX);
        assert_eq!(indices.get_index(0), 16_777_217);
        assert_eq!(indices.get_index(1), u32::MAX as usize);
        assert_eq!(indices.get_scalar(0), 16_777_216.0);
        assert_eq!(indices.version(), 2);
    }

    #[test]
    fn test_big_endian_read() {
        let (_buffer, mut view) = view(16);
        let mut a = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::U16, 1))
            .unwrap();
        a.set_scalar(0, 258.0);
        let big = a.get_components(
            0,
            ReadOptions {
                indices: None,
                endian: Endian::Big,
            },
        );
        assert_eq!(big, vec![513.0]);
    }

    #[test]
    fn test_normalized_encoding_clamps() {
        let (_buffer, mut view) = view(16);
        let mut a = view
            .take_accessor(
                &AccessorDescriptor::new(CompositionType::Vec2, ComponentType::U8, 1).normalized(),
            )
            .unwrap();
        a.set_vec2(0, Vec2::new(2.0, -1.0));
        assert_eq!(a.get_vec2(0), Vec2::new(1.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_index_panics() {
        let (_buffer, mut view) = view(16);
        let mut a = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::F32, 2))
            .unwrap();
        a.set_scalar(2, 1.0);
    }

    #[test]
    fn test_take_one_reuses_released_slots() {
        let (_buffer, mut view) = view(64);
        let mut a = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::F32, 2))
            .unwrap();
        assert_eq!(a.take_one(), Some(0));
        assert_eq!(a.take_one(), Some(1));
        assert_eq!(a.take_one(), None);
        assert!(a.release_one(0));
        assert!(!a.release_one(0));
        assert_eq!(a.take_one(), Some(0));
        assert_eq!(a.slots_in_use(), 2);
    }

    #[test]
    fn test_min_max_cache_invalidated_by_writes() {
        let (_buffer, mut view) = view(64);
        let mut a = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Vec2, ComponentType::F32, 3))
            .unwrap();
        a.set_vec2(0, Vec2::new(1.0, 5.0));
        a.set_vec2(1, Vec2::new(-2.0, 0.0));
        let (min, max) = a.calc_min_max();
        assert_eq!(min, &[-2.0, 0.0]);
        assert_eq!(max, &[1.0, 5.0]);
        a.set_vec2(2, Vec2::new(9.0, 9.0));
        assert!(a.min().is_none());
        assert_eq!(a.calc_min_max().1, &[9.0, 9.0]);
    }

    #[test]
    fn test_copy_from_converts_encoding() {
        let (_buffer, mut view) = view(128);
        let mut source = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Vec2, ComponentType::U16, 2))
            .unwrap();
        let mut target = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Vec2, ComponentType::F32, 4))
            .unwrap();
        source.set_vec2(1, Vec2::new(3.0, 4.0));
        target.copy_from(&source).unwrap();
        assert_eq!(target.get_vec2(1), Vec2::new(3.0, 4.0));
        assert_eq!(target.version(), 1);

        let scalar = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Scalar, ComponentType::F32, 1))
            .unwrap();
        assert!(target.copy_from(&scalar).is_err());
    }
}
