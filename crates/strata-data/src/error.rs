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

//! Error types of the data layer.

use crate::memory::AllocationError;
use std::fmt;
use strata_core::layout::ComponentType;

/// A parameter or global value could not be read or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// No semantic with this name is known to the target.
    UnknownSemantic(String),
    /// The value's shape does not match the semantic's declaration.
    ShapeMismatch {
        /// The semantic being written.
        semantic: String,
        /// Declared shape.
        expected: String,
        /// Supplied shape.
        found: String,
    },
    /// An element index past the semantic's count.
    IndexOutOfRange {
        /// The semantic being accessed.
        semantic: String,
        /// The requested index.
        index: usize,
        /// Number of elements.
        count: usize,
    },
    /// The handle refers to a destroyed material.
    StaleHandle,
    /// A solo semantic, set once per material type rather than per material.
    SharedParameter(String),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::UnknownSemantic(name) => write!(f, "Unknown semantic '{name}'"),
            ParameterError::ShapeMismatch {
                semantic,
                expected,
                found,
            } => write!(
                f,
                "Value for '{semantic}' has shape {found}, expected {expected}"
            ),
            ParameterError::IndexOutOfRange {
                semantic,
                index,
                count,
            } => write!(
                f,
                "Index {index} out of range for '{semantic}' (count {count})"
            ),
            ParameterError::StaleHandle => write!(f, "Material handle is stale"),
            ParameterError::SharedParameter(name) => {
                write!(f, "'{name}' is shared by the material type, not set per material")
            }
        }
    }
}

impl std::error::Error for ParameterError {}

/// A semantic, material type or material could not be registered.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A semantic with the same name but a different declaration exists.
    ConflictingSemantic(String),
    /// A referenced semantic was never registered.
    UnknownSemantic(String),
    /// A material type with this name already exists.
    DuplicateMaterialType(String),
    /// No material type with this name exists.
    UnknownMaterialType(String),
    /// Every instance slot of a material type is in use.
    CapacityExceeded {
        /// What ran out (material type or pool name).
        pool: String,
        /// Its capacity.
        capacity: usize,
    },
    /// The handle refers to a destroyed material.
    StaleHandle,
    /// The semantic's components are narrower than a 32-bit vec4 lane.
    UnsupportedComponent {
        /// The rejected semantic.
        semantic: String,
        /// Its component type.
        component: ComponentType,
    },
    /// A column does not start on a vec4 boundary of its arena.
    MisalignedColumn(String),
    /// Arena space could not be taken.
    Allocation(AllocationError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::ConflictingSemantic(name) => {
                write!(f, "Semantic '{name}' is already registered with a different layout")
            }
            RegistryError::UnknownSemantic(name) => write!(f, "Unknown semantic '{name}'"),
            RegistryError::DuplicateMaterialType(name) => {
                write!(f, "Material type '{name}' is already registered")
            }
            RegistryError::UnknownMaterialType(name) => {
                write!(f, "Unknown material type '{name}'")
            }
            RegistryError::CapacityExceeded { pool, capacity } => {
                write!(f, "All {capacity} slots of '{pool}' are in use")
            }
            RegistryError::StaleHandle => write!(f, "Material handle is stale"),
            RegistryError::UnsupportedComponent {
                semantic,
                component,
            } => write!(
                f,
                "Semantic '{semantic}' uses {component} components; arena columns need 32-bit components"
            ),
            RegistryError::MisalignedColumn(name) => {
                write!(f, "Column of '{name}' does not start on a 16-byte boundary")
            }
            RegistryError::Allocation(err) => write!(f, "Allocation failed: {err}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocationError> for RegistryError {
    fn from(err: AllocationError) -> Self {
        RegistryError::Allocation(err)
    }
}
