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

//! The opaque device sink the data core delegates every GPU call to.

use super::api::{
    BufferDescriptor, BufferId, DrawCall, ProgramDescriptor, ProgramId, TextureDescriptor,
    TextureId, TextureRegion, UniformValue,
};
use super::capabilities::DeviceCapabilities;
use super::error::{ResourceError, ShaderError};

/// The backend-specific resource layer.
///
/// The core only supplies already-encoded byte ranges and shader source
/// strings; how they reach the GPU is up to the implementation. All methods
/// take `&self`, implementations keep their bookkeeping behind interior
/// mutability. The render loop is single-threaded, so no `Send`/`Sync` bound
/// is required.
pub trait GraphicsDevice {
    /// Returns the limits and features of this device.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Creates a buffer initialised with `contents` (zero-filled up to
    /// `descriptor.size` when shorter).
    fn create_buffer(
        &self,
        descriptor: &BufferDescriptor,
        contents: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Overwrites part of a buffer starting at `offset`.
    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8])
        -> Result<(), ResourceError>;

    /// Creates an uninitialised 2D texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Overwrites a region of a texture with tightly packed texels.
    fn write_texture(
        &self,
        texture: TextureId,
        region: TextureRegion,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Compiles and links a program from generated source.
    fn create_program(&self, descriptor: &ProgramDescriptor) -> Result<ProgramId, ShaderError>;

    /// Writes a named uniform of a program.
    fn set_uniform(
        &self,
        program: ProgramId,
        name: &str,
        value: &UniformValue,
    ) -> Result<(), ResourceError>;

    /// Submits one draw call.
    fn draw(&self, call: &DrawCall) -> Result<(), ResourceError>;
}
