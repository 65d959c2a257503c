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

//! Contracts between the data core and the graphics backend.
//!
//! The core never talks to a graphics API directly. It hands already-encoded
//! byte ranges and shader source strings to a [`GraphicsDevice`], which the
//! backend implements.

pub mod api;
pub mod capabilities;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::capabilities::DeviceCapabilities;
pub use self::error::{ResourceError, ShaderError};
pub use self::traits::GraphicsDevice;
