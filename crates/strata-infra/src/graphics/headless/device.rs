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

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use strata_core::renderer::{
    BufferDescriptor, BufferId, DeviceBufferUsage, DeviceCapabilities, DrawCall, GraphicsDevice,
    ProgramDescriptor, ProgramId, ResourceError, ShaderError, TextureDescriptor, TextureId,
    TextureRegion, UniformValue,
};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// A buffer was created.
    CreateBuffer {
        /// Assigned handle.
        buffer: BufferId,
        /// Debug label.
        label: String,
        /// Size in bytes.
        size: u64,
        /// Binding role.
        usage: DeviceBufferUsage,
    },
    /// Bytes were written to a buffer.
    WriteBuffer {
        /// Target buffer.
        buffer: BufferId,
        /// First byte written.
        offset: u64,
        /// Number of bytes written.
        len: usize,
    },
    /// A texture was created.
    CreateTexture {
        /// Assigned handle.
        texture: TextureId,
        /// Debug label.
        label: String,
    },
    /// Texels were written to a texture.
    WriteTexture {
        /// Target texture.
        texture: TextureId,
        /// Region written.
        region: TextureRegion,
    },
    /// A program compiled and linked.
    CreateProgram {
        /// Assigned handle.
        program: ProgramId,
        /// Debug label.
        label: String,
    },
    /// A uniform was written.
    SetUniform {
        /// Target program.
        program: ProgramId,
        /// Uniform name.
        name: String,
        /// Written value.
        value: UniformValue,
    },
    /// A draw was submitted.
    Draw(DrawCall),
}

#[derive(Debug)]
struct BufferEntry {
    usage: DeviceBufferUsage,
    data: Vec<u8>,
}

#[derive(Debug)]
struct TextureEntry {
    descriptor: TextureDescriptor,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct DeviceState {
    calls: Vec<DeviceCall>,
    buffers: HashMap<BufferId, BufferEntry>,
    textures: HashMap<TextureId, TextureEntry>,
    programs: HashMap<ProgramId, ProgramDescriptor>,
    uniforms: HashMap<(ProgramId, String), UniformValue>,
    failing_source: Option<String>,
}

/// A device that keeps resources in host memory and records every call.
#[derive(Debug)]
pub struct HeadlessDevice {
    capabilities: DeviceCapabilities,
    state: Mutex<DeviceState>,
    next_id: AtomicU64,
}

impl HeadlessDevice {
    /// A device reporting `capabilities`.
    pub fn new(capabilities: DeviceCapabilities) -> Self {
        log::debug!("HeadlessDevice: created as '{}'", capabilities.backend_name);
        Self {
            capabilities,
            state: Mutex::new(DeviceState::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// A GLSL ES 3.00 device with float textures and no storage buffers.
    pub fn glsl_es3() -> Self {
        Self::new(DeviceCapabilities::glsl_es3())
    }

    /// A WGSL device with storage buffers.
    pub fn wgsl() -> Self {
        Self::new(DeviceCapabilities::wgsl())
    }

    // --- Internal Helpers ---

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // --- Inspection ---

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    /// Returns and forgets the recorded calls.
    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.state().calls)
    }

    /// Every recorded draw, oldest first.
    pub fn draws(&self) -> Vec<DrawCall> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Draw(draw) => Some(draw.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current contents of a buffer.
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state().buffers.get(&buffer).map(|b| b.data.clone())
    }

    /// Current contents of a texture, rows top to bottom.
    pub fn texture_contents(&self, texture: TextureId) -> Option<Vec<u8>> {
        self.state().textures.get(&texture).map(|t| t.data.clone())
    }

    /// Contents of an RGBA32F texture as floats.
    pub fn texture_floats(&self, texture: TextureId) -> Option<Vec<f32>> {
        self.texture_contents(texture)
            .map(|bytes| bytemuck::pod_collect_to_vec(&bytes))
    }

    /// The descriptor a program was created from.
    pub fn program(&self, program: ProgramId) -> Option<ProgramDescriptor> {
        self.state().programs.get(&program).cloned()
    }

    /// Number of programs created.
    pub fn program_count(&self) -> usize {
        self.state().programs.len()
    }

    /// The last value written to `name` of `program`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state()
            .uniforms
            .get(&(program, name.to_string()))
            .cloned()
    }

    /// Makes every later program whose source contains `needle` fail to
    /// compile.
    pub fn fail_compilation_when(&self, needle: impl Into<String>) {
        self.state().failing_source = Some(needle.into());
    }
}

/// Error line in the shape GLSL and WGSL front ends report.
fn diagnostic(source: &str, needle: &str) -> String {
    let line = source
        .lines()
        .position(|l| l.contains(needle))
        .map_or(0, |i| i + 1);
    format!("ERROR: 0:{line}: '{needle}' : rejected by the headless compiler")
}

impl GraphicsDevice for HeadlessDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities.clone()
    }

    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        contents: &[u8],
    ) -> Result<BufferId, ResourceError> {
        if contents.len() as u64 > descriptor.size {
            return Err(ResourceError::OutOfBounds);
        }
        if descriptor.usage == DeviceBufferUsage::Storage {
            if !self.capabilities.supports_storage_buffers {
                return Err(ResourceError::BackendError(
                    "storage buffers are not supported".to_string(),
                ));
            }
            if descriptor.size > self.capabilities.max_storage_buffer_binding_size {
                return Err(ResourceError::LimitExceeded(format!(
                    "storage buffer '{}' of {} bytes",
                    descriptor.label, descriptor.size
                )));
            }
        }
        let mut data = contents.to_vec();
        data.resize(descriptor.size as usize, 0);

        let id = BufferId(self.generate_id());
        let mut state = self.state();
        state.buffers.insert(
            id,
            BufferEntry {
                usage: descriptor.usage,
                data,
            },
        );
        state.calls.push(DeviceCall::CreateBuffer {
            buffer: id,
            label: descriptor.label.clone(),
            size: descriptor.size,
            usage: descriptor.usage,
        });
        log::trace!("HeadlessDevice: created buffer '{}' ({id:?})", descriptor.label);
        Ok(id)
    }

    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut state = self.state();
        let entry = state
            .buffers
            .get_mut(&buffer)
            .ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > entry.data.len() {
            return Err(ResourceError::OutOfBounds);
        }
        entry.data[start..end].copy_from_slice(data);
        state.calls.push(DeviceCall::WriteBuffer {
            buffer,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::BackendError(format!(
                "texture '{}' has a zero extent",
                descriptor.label
            )));
        }
        let max = self.capabilities.max_texture_size;
        if descriptor.width > max || descriptor.height > max {
            return Err(ResourceError::LimitExceeded(format!(
                "texture '{}' is {}x{}, the device allows {max}",
                descriptor.label, descriptor.width, descriptor.height
            )));
        }
        let size = descriptor.width as usize
            * descriptor.height as usize
            * descriptor.format.bytes_per_texel();

        let id = TextureId(self.generate_id());
        let mut state = self.state();
        state.textures.insert(
            id,
            TextureEntry {
                descriptor: descriptor.clone(),
                data: vec![0; size],
            },
        );
        state.calls.push(DeviceCall::CreateTexture {
            texture: id,
            label: descriptor.label.clone(),
        });
        log::trace!("HeadlessDevice: created texture '{}' ({id:?})", descriptor.label);
        Ok(id)
    }

    fn write_texture(
        &self,
        texture: TextureId,
        region: TextureRegion,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        let entry = state
            .textures
            .get_mut(&texture)
            .ok_or(ResourceError::InvalidHandle)?;
        let desc = &entry.descriptor;
        if region.x + region.width > desc.width || region.y + region.height > desc.height {
            return Err(ResourceError::OutOfBounds);
        }
        let texel = desc.format.bytes_per_texel();
        let row_bytes = region.width as usize * texel;
        if data.len() != row_bytes * region.height as usize {
            return Err(ResourceError::OutOfBounds);
        }
        let stride = desc.width as usize * texel;
        for (row, chunk) in data.chunks_exact(row_bytes.max(1)).enumerate() {
            let start = (region.y as usize + row) * stride + region.x as usize * texel;
            entry.data[start..start + row_bytes].copy_from_slice(chunk);
        }
        state.calls.push(DeviceCall::WriteTexture { texture, region });
        Ok(())
    }

    fn create_program(&self, descriptor: &ProgramDescriptor) -> Result<ProgramId, ShaderError> {
        if descriptor.language != self.capabilities.shading_language {
            return Err(ShaderError::UnsupportedLanguage {
                label: descriptor.label.clone(),
            });
        }
        let mut state = self.state();
        if let Some(needle) = state.failing_source.as_deref() {
            for source in [&descriptor.vertex_source, &descriptor.pixel_source] {
                if source.contains(needle) {
                    log::debug!("HeadlessDevice: rejecting program '{}'", descriptor.label);
                    return Err(ShaderError::CompilationError {
                        label: descriptor.label.clone(),
                        details: diagnostic(source, needle),
                    });
                }
            }
        }
        if descriptor.vertex_source.trim().is_empty() || descriptor.pixel_source.trim().is_empty() {
            return Err(ShaderError::LinkError {
                label: descriptor.label.clone(),
                details: "a stage has no source".to_string(),
            });
        }
        let id = ProgramId(self.generate_id());
        state.programs.insert(id, descriptor.clone());
        state.calls.push(DeviceCall::CreateProgram {
            program: id,
            label: descriptor.label.clone(),
        });
        log::debug!("HeadlessDevice: created program '{}' ({id:?})", descriptor.label);
        Ok(id)
    }

    fn set_uniform(
        &self,
        program: ProgramId,
        name: &str,
        value: &UniformValue,
    ) -> Result<(), ResourceError> {
        let mut state = self.state();
        if !state.programs.contains_key(&program) {
            return Err(ResourceError::InvalidHandle);
        }
        state
            .uniforms
            .insert((program, name.to_string()), value.clone());
        state.calls.push(DeviceCall::SetUniform {
            program,
            name: name.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn draw(&self, call: &DrawCall) -> Result<(), ResourceError> {
        let mut state = self.state();
        if !state.programs.contains_key(&call.program) {
            return Err(ResourceError::InvalidHandle);
        }
        let buffers = call
            .vertex_buffers
            .iter()
            .map(|b| (b.buffer, DeviceBufferUsage::Vertex))
            .chain(call.index_buffer.iter().map(|b| (b.buffer, DeviceBufferUsage::Index)))
            .chain(call.buffers.iter().map(|b| (b.buffer, DeviceBufferUsage::Storage)));
        for (buffer, usage) in buffers {
            match state.buffers.get(&buffer) {
                Some(entry) if entry.usage == usage => {}
                Some(entry) => {
                    return Err(ResourceError::BackendError(format!(
                        "{buffer:?} bound as {usage:?} but created as {:?}",
                        entry.usage
                    )))
                }
                None => return Err(ResourceError::InvalidHandle),
            }
        }
        if call
            .textures
            .iter()
            .any(|t| !state.textures.contains_key(&t.texture))
        {
            return Err(ResourceError::InvalidHandle);
        }
        state.calls.push(DeviceCall::Draw(call.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::renderer::{PipelineState, ShaderLanguage, TextureFormat};

    fn program(device: &HeadlessDevice, source: &str) -> Result<ProgramId, ShaderError> {
        device.create_program(&ProgramDescriptor {
            label: "test".to_string(),
            language: ShaderLanguage::Glsl,
            vertex_source: source.to_string(),
            pixel_source: "void main() {}".to_string(),
        })
    }

    #[test]
    fn test_buffer_writes_are_bounds_checked() {
        let device = HeadlessDevice::glsl_es3();
        let buffer = device
            .create_buffer(
                &BufferDescriptor {
                    label: "vb".to_string(),
                    size: 8,
                    usage: DeviceBufferUsage::Vertex,
                },
                &[1, 2],
            )
            .unwrap();
        assert_eq!(device.buffer_contents(buffer).unwrap(), vec![1, 2, 0, 0, 0, 0, 0, 0]);
        device.write_buffer(buffer, 4, &[9, 9, 9, 9]).unwrap();
        assert_eq!(device.write_buffer(buffer, 6, &[0; 4]), Err(ResourceError::OutOfBounds));
        assert_eq!(
            device.write_buffer(BufferId(999), 0, &[0]),
            Err(ResourceError::InvalidHandle)
        );
    }

    #[test]
    fn test_storage_buffers_need_support() {
        let device = HeadlessDevice::glsl_es3();
        let result = device.create_buffer(
            &BufferDescriptor {
                label: "storage".to_string(),
                size: 16,
                usage: DeviceBufferUsage::Storage,
            },
            &[],
        );
        assert!(matches!(result, Err(ResourceError::BackendError(_))));
    }

    #[test]
    fn test_texture_region_write() {
        let device = HeadlessDevice::glsl_es3();
        let texture = device
            .create_texture(&TextureDescriptor {
                label: "data".to_string(),
                width: 2,
                height: 2,
                format: TextureFormat::Rgba32Float,
            })
            .unwrap();
        let row: Vec<u8> = bytemuck::cast_slice(&[1.0f32; 8]).to_vec();
        device
            .write_texture(texture, TextureRegion::rows(2, 1), &row)
            .unwrap();
        let floats = device.texture_floats(texture).unwrap();
        assert_eq!(&floats[..8], &[1.0; 8]);
        assert_eq!(&floats[8..], &[0.0; 8]);
        assert_eq!(
            device.write_texture(texture, TextureRegion::rows(2, 3), &[]),
            Err(ResourceError::OutOfBounds)
        );
    }

    #[test]
    fn test_program_language_and_forced_failures() {
        let device = HeadlessDevice::wgsl();
        assert!(matches!(
            program(&device, "void main() {}"),
            Err(ShaderError::UnsupportedLanguage { .. })
        ));

        let device = HeadlessDevice::glsl_es3();
        device.fail_compilation_when("broken");
        let err = program(&device, "#version 300 es\nbroken();").unwrap_err();
        assert_eq!(err.details(), "ERROR: 0:2: 'broken' : rejected by the headless compiler");
        assert!(program(&device, "void main() {}").is_ok());
        assert_eq!(device.program_count(), 1);
    }

    #[test]
    fn test_draw_validates_handles() {
        let device = HeadlessDevice::glsl_es3();
        let id = program(&device, "void main() {}").unwrap();
        let mut call = DrawCall {
            pass: "main".to_string(),
            program: id,
            vertex_buffers: Vec::new(),
            index_buffer: None,
            element_count: 3,
            instance_index: 0,
            material_slot: 0,
            textures: Vec::new(),
            buffers: Vec::new(),
            pipeline: PipelineState::default(),
        };
        device.draw(&call).unwrap();
        device.set_uniform(id, "u_Time", &UniformValue::Float(1.5)).unwrap();
        assert_eq!(device.uniform(id, "u_Time"), Some(UniformValue::Float(1.5)));

        call.program = ProgramId(999);
        assert_eq!(device.draw(&call), Err(ResourceError::InvalidHandle));
        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.take_calls().len(), 3);
        assert!(device.calls().is_empty());
    }
}
