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

//! Fixed-function pipeline state carried by materials.
//!
//! None of these values influence generated shader source, so changing them
//! never invalidates a compiled program.

use std::ops::BitOr;

/// Specifies how a material handles transparency.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// Fully opaque. Fragments are written without alpha testing or blending.
    #[default]
    Opaque,
    /// Fragments with an alpha below the cutoff are discarded.
    Mask(f32),
    /// Full alpha blending.
    Blend,
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source alpha component (`src.a`).
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    OneMinusSrcAlpha,
}

/// The operation used to combine source and destination colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    /// `source + destination`.
    Add,
    /// `source - destination`.
    Subtract,
    /// `destination - source`.
    ReverseSubtract,
    /// `min(source, destination)`.
    Min,
    /// `max(source, destination)`.
    Max,
}

/// A blend equation for either the color or the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Factor applied to the fragment output.
    pub src_factor: BlendFactor,
    /// Factor applied to the framebuffer value.
    pub dst_factor: BlendFactor,
    /// How the two weighted values are combined.
    pub operation: BlendOperation,
}

/// Separate blend equations for color and alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Blend equation for the RGB channels.
    pub color: BlendComponent,
    /// Blend equation for the alpha channel.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Classic "over" compositing with straight alpha.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
    };
}

/// A bitmask enabling writes to individual color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorWriteMask(u8);

impl ColorWriteMask {
    /// Red channel.
    pub const R: Self = Self(0b0001);
    /// Green channel.
    pub const G: Self = Self(0b0010);
    /// Blue channel.
    pub const B: Self = Self(0b0100);
    /// Alpha channel.
    pub const A: Self = Self(0b1000);
    /// All channels.
    pub const ALL: Self = Self(0b1111);
    /// No channel.
    pub const NONE: Self = Self(0);

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every channel in `other` is enabled in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for ColorWriteMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which face of a triangle to cull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

/// The fixed-function state a draw call is issued with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineState {
    /// Transparency handling.
    pub alpha_mode: AlphaMode,
    /// Blend equations, `None` to disable blending.
    pub blend: Option<BlendState>,
    /// Enabled color channels.
    pub color_write_mask: ColorWriteMask,
    /// Face culling.
    pub cull_mode: CullMode,
}
