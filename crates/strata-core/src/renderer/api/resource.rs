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

//! Device resource handles and creation descriptors.

use serde::{Deserialize, Serialize};

/// An opaque handle to a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// An opaque handle to a device texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// An opaque handle to a compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u64);

/// What a device buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceBufferUsage {
    /// Per-vertex attribute data.
    Vertex,
    /// Index data.
    Index,
    /// A read-only storage buffer.
    Storage,
    /// A uniform block.
    Uniform,
}

/// Describes a device buffer to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Debug label.
    pub label: String,
    /// Size in bytes.
    pub size: u64,
    /// Binding role.
    pub usage: DeviceBufferUsage,
}

/// Pixel formats the data core creates textures with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// Four 32-bit float channels, used to carry arbitrary numeric data.
    Rgba32Float,
    /// Four 8-bit normalized channels, used for color textures.
    Rgba8Unorm,
}

impl TextureFormat {
    /// Size in bytes of one texel.
    pub const fn bytes_per_texel(self) -> usize {
        match self {
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Rgba8Unorm => 4,
        }
    }
}

/// Describes a 2D texture to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Debug label.
    pub label: String,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel format.
    pub format: TextureFormat,
}

/// A rectangular region of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRegion {
    /// Left edge in texels.
    pub x: u32,
    /// Top edge in texels.
    pub y: u32,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

impl TextureRegion {
    /// A region covering the top `height` rows of a `width`-wide texture.
    pub const fn rows(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}
