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

//! Allocation failures of the memory arena.

use std::fmt;

/// Why a view or accessor could not be taken.
///
/// Returned as a value, never raised, so that every capacity problem can be
/// detected at startup before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The buffer has fewer free bytes than requested.
    BufferExhausted {
        /// Name of the buffer.
        buffer: String,
        /// Bytes requested.
        requested: usize,
        /// Bytes left after alignment padding.
        remaining: usize,
    },
    /// The view has fewer free bytes than requested.
    ViewExhausted {
        /// Name of the view.
        view: String,
        /// Bytes requested.
        requested: usize,
        /// Bytes left after alignment padding.
        remaining: usize,
    },
    /// A buffer alignment that is zero or not a power of two.
    InvalidAlignment(usize),
    /// An explicit offset that is not a multiple of the required alignment.
    MisalignedOffset {
        /// The requested offset.
        offset: usize,
        /// The required alignment.
        alignment: usize,
    },
    /// An explicit range overlaps bytes that were already taken.
    RangeOverlap {
        /// Name of the buffer or view.
        region: String,
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        length: usize,
    },
    /// A stride smaller than one element.
    InvalidStride {
        /// The requested stride.
        stride: usize,
        /// The element size.
        element_size: usize,
    },
    /// A request for zero bytes or zero elements.
    ZeroSized,
    /// Two accessors that cannot exchange data.
    IncompatibleAccessor(String),
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::BufferExhausted {
                buffer,
                requested,
                remaining,
            } => write!(
                f,
                "Buffer '{buffer}' exhausted: requested {requested} bytes, {remaining} remaining"
            ),
            AllocationError::ViewExhausted {
                view,
                requested,
                remaining,
            } => write!(
                f,
                "Buffer view '{view}' exhausted: requested {requested} bytes, {remaining} remaining"
            ),
            AllocationError::InvalidAlignment(alignment) => {
                write!(f, "Invalid alignment {alignment}: must be a power of two")
            }
            AllocationError::MisalignedOffset { offset, alignment } => {
                write!(f, "Offset {offset} is not a multiple of {alignment}")
            }
            AllocationError::RangeOverlap {
                region,
                offset,
                length,
            } => write!(
                f,
                "Range {offset}..{} overlaps taken bytes in '{region}'",
                offset + length
            ),
            AllocationError::InvalidStride {
                stride,
                element_size,
            } => write!(
                f,
                "Stride {stride} is smaller than the element size {element_size}"
            ),
            AllocationError::ZeroSized => write!(f, "Cannot take a zero-sized region"),
            AllocationError::IncompatibleAccessor(msg) => {
                write!(f, "Incompatible accessor: {msg}")
            }
        }
    }
}

impl std::error::Error for AllocationError {}
