//! Collision-free names for loaded sources.

use std::collections::HashSet;

use tracing::debug;

/// Hands out names of the form `<base>-<n>`.
///
/// Every name handed out stays reserved until [`UniqueNamer::release`], so
/// consecutive calls never return the same name even before the caller has
/// registered the first one anywhere.
#[derive(Debug, Default)]
pub struct UniqueNamer {
    reserved: HashSet<String>,
}

impl UniqueNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `<base>-<n>` (n from 0) that is neither reserved nor `taken`.
    ///
    /// `taken` should report names of loaded sources and live layers.
    pub fn unique_name<F>(&mut self, base: &str, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut index: usize = 0;
        loop {
            let candidate = format!("{}-{}", base, index);
            if !self.reserved.contains(&candidate) && !taken(&candidate) {
                debug!(name = %candidate, "Reserved unique name");
                self.reserved.insert(candidate.clone());
                return candidate;
            }
            index += 1;
        }
    }

    /// Reserve a name chosen elsewhere (e.g. restored from persisted state).
    pub fn reserve(&mut self, name: &str) -> bool {
        self.reserved.insert(name.to_string())
    }

    /// Make a name available again. Returns whether it was reserved.
    pub fn release(&mut self, name: &str) -> bool {
        self.reserved.remove(name)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }
}
