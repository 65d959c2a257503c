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

//! Fixed-capacity memory arenas.
//!
//! A [`Buffer`] owns one contiguous byte allocation made at startup. It is
//! carved into [`BufferView`]s by bump allocation, and each view is carved into
//! typed, strided [`Accessor`]s the same way. There is no free operation for
//! sub-regions: every capacity check happens when a view or accessor is taken,
//! so once a frame is running reads and writes can never fail or reallocate.
//!
//! Byte ranges always nest: an accessor's range lies inside its view's range,
//! which lies inside its buffer.

mod accessor;
mod buffer;
mod buffer_view;
mod error;
mod manager;

pub use accessor::{Accessor, AccessorDescriptor, Endian, ReadOptions, SlotPool};
pub use buffer::{Buffer, BufferUse};
pub use buffer_view::BufferView;
pub use error::AllocationError;
pub use manager::MemoryManager;

use std::cell::{Cell, RefCell};

/// The bytes behind one [`Buffer`], shared by every view and accessor carved
/// from it.
#[derive(Debug)]
pub(crate) struct ArenaStorage {
    bytes: RefCell<Box<[u8]>>,
    write_version: Cell<u64>,
}

impl ArenaStorage {
    pub(crate) fn new(byte_length: usize) -> Self {
        Self {
            bytes: RefCell::new(vec![0u8; byte_length].into_boxed_slice()),
            write_version: Cell::new(0),
        }
    }

    pub(crate) fn bump_write_version(&self) {
        self.write_version.set(self.write_version.get() + 1);
    }
}

/// Rounds `value` up to the next multiple of `alignment` (a power of two).
pub(crate) const fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}
