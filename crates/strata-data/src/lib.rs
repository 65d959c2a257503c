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

//! # Strata Data
//!
//! The data layer of the GPU data core. Everything numeric that ends up on the
//! device lives in fixed-size arenas owned by a [`MemoryManager`], carved into
//! [`BufferView`]s and typed [`Accessor`]s once at startup. The repositories in
//! this crate are the producers that write into those arenas:
//!
//! - [`GlobalDataRepository`] for per-frame shared values (camera, lights).
//! - [`InstanceDataRepository`] for per-entity values (world matrices).
//! - [`MaterialRepository`] for per-material parameters.
//!
//! Nothing here talks to the device; binding strategies read the arenas and
//! upload them.

pub mod config;
pub mod error;
pub mod global_data;
pub mod instance_data;
pub mod layout;
pub mod material;
pub mod memory;
pub mod mesh;
pub mod semantics;

pub use config::EngineLimits;
pub use error::{ParameterError, RegistryError};
pub use global_data::GlobalDataRepository;
pub use instance_data::{InstanceDataRepository, InstanceSlot};
pub use layout::{DataLayout, DataScope, LayoutEntry};
pub use material::{
    Material, MaterialHandle, MaterialRepository, MaterialTypeDescriptor, ParameterValue,
    ProgramFactory, ProgramRequest, TextureState,
};
pub use memory::{
    Accessor, AccessorDescriptor, AllocationError, Buffer, BufferUse, BufferView, Endian,
    MemoryManager, ReadOptions,
};
pub use mesh::{Mesh, MeshComponent, MeshId, MeshRepository, Primitive, PrimitiveId, VertexAttribute};
pub use semantics::{SemanticsInfo, SemanticsRegistry};
