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

use super::{builtin, SemanticsInfo};
use crate::config::EngineLimits;
use crate::error::RegistryError;
use crate::layout::check_arena_component;
use ahash::AHashMap;

/// Index assigned to a semantic at registration. Array semantics own the
/// contiguous block `index..index + array_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticIndex(pub u32);

/// A registered semantic.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticsClass {
    /// The declaration.
    pub info: SemanticsInfo,
    /// First index of the semantic's block.
    pub index: SemanticIndex,
}

/// The catalog of every semantic known to one engine instance.
///
/// Constructed once at startup and passed by reference; there is no global
/// registry.
#[derive(Debug, Default, Clone)]
pub struct SemanticsRegistry {
    classes: Vec<SemanticsClass>,
    by_name: AHashMap<String, usize>,
    next_index: u32,
}

impl SemanticsRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in semantic, sized from `limits`.
    pub fn with_builtins(limits: &EngineLimits) -> Self {
        let mut registry = Self::new();
        for info in builtin::all(limits) {
            // Built-in names are unique, registration cannot conflict.
            let _ = registry.register(info);
        }
        registry
    }

    /// Registers a semantic and returns its index.
    ///
    /// Registering an identical layout twice returns the existing index;
    /// a conflicting layout under the same name is rejected, and so are
    /// 8- and 16-bit components, which arena columns cannot hold.
    pub fn register(&mut self, info: SemanticsInfo) -> Result<SemanticIndex, RegistryError> {
        check_arena_component(&info)?;
        if let Some(&slot) = self.by_name.get(&info.name) {
            let existing = &self.classes[slot];
            return if existing.info.same_layout(&info) {
                Ok(existing.index)
            } else {
                Err(RegistryError::ConflictingSemantic(info.name))
            };
        }
        let index = SemanticIndex(self.next_index);
        self.next_index += info.array_length as u32;
        log::trace!("Registered semantic '{}' at {}", info.name, index.0);
        self.by_name.insert(info.name.clone(), self.classes.len());
        self.classes.push(SemanticsClass { info, index });
        Ok(index)
    }

    /// Looks up a semantic by name.
    pub fn get(&self, name: &str) -> Option<&SemanticsClass> {
        self.by_name.get(name).map(|&slot| &self.classes[slot])
    }

    /// Looks up a semantic's declaration by name.
    pub fn info(&self, name: &str) -> Option<&SemanticsInfo> {
        self.get(name).map(|class| &class.info)
    }

    /// Looks up a semantic's declaration, failing with a registry error.
    pub fn require(&self, name: &str) -> Result<&SemanticsInfo, RegistryError> {
        self.info(name)
            .ok_or_else(|| RegistryError::UnknownSemantic(name.to_string()))
    }

    /// Number of registered semantics.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registered semantics in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SemanticsClass> {
        self.classes.iter()
    }
}
