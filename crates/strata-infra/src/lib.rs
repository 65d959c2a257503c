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

//! Concrete implementations of the [`GraphicsDevice`](strata_core::renderer::GraphicsDevice)
//! sink.
//!
//! The only backend shipped here is [`HeadlessDevice`], which keeps every
//! resource in host memory and records each call. It validates handles,
//! bounds and languages the way a real backend would, which makes it the
//! device of choice for tests, tools and offline shader generation.

#![warn(missing_docs)]

pub mod graphics;

pub use graphics::headless::{DeviceCall, HeadlessDevice};
