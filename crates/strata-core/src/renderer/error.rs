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

//! Defines the error types reported by a [`GraphicsDevice`](super::GraphicsDevice).

use std::fmt;

/// An error related to compiling or linking generated shader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The backend rejected the source.
    CompilationError {
        /// The label of the program being compiled.
        label: String,
        /// Diagnostic text from the backend compiler.
        details: String,
    },
    /// The stages compiled but could not be linked together.
    LinkError {
        /// The label of the program being linked.
        label: String,
        /// Diagnostic text from the backend linker.
        details: String,
    },
    /// The source is written in a language the device does not accept.
    UnsupportedLanguage {
        /// The label of the program.
        label: String,
    },
}

impl ShaderError {
    /// Backend diagnostic text, empty when there is none.
    pub fn details(&self) -> &str {
        match self {
            ShaderError::CompilationError { details, .. }
            | ShaderError::LinkError { details, .. } => details,
            ShaderError::UnsupportedLanguage { .. } => "",
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::LinkError { label, details } => {
                write!(f, "Shader program link failed for '{label}': {details}")
            }
            ShaderError::UnsupportedLanguage { label } => {
                write!(f, "Shader language not supported by device for '{label}'")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The handle does not refer to a live resource.
    InvalidHandle,
    /// A write or read fell outside the resource.
    OutOfBounds,
    /// The requested size exceeds a device limit.
    LimitExceeded(String),
    /// An error originating from the backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::LimitExceeded(msg) => write!(f, "Device limit exceeded: {msg}"),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}
