//! The fixed set of hosts being watched.

use std::collections::HashMap;

use hostwatch_common::Host;
use thiserror::Error as ThisError;

use crate::config::HostEntry;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Host name '{0}' is configured more than once")]
    DuplicateName(String),
    #[error("Host entry #{position} has an empty name")]
    EmptyName { position: usize },
    #[error("Host '{0}' has an empty address")]
    EmptyAddress(String),
    #[error("Unknown host '{0}'")]
    NotFound(String),
}

/// Ordered, immutable mapping from host name to address.
#[derive(Debug, Default)]
pub struct HostRegistry {
    hosts: Vec<Host>,
    by_name: HashMap<String, usize>,
}

impl HostRegistry {
    /// Builds the registry, keeping configuration order.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names, empty names and empty addresses.
    pub fn from_entries(entries: impl IntoIterator<Item = HostEntry>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for (position, entry) in entries.into_iter().enumerate() {
            let host = Host::from(entry);
            if host.name.trim().is_empty() {
                return Err(RegistryError::EmptyName {
                    position: position + 1,
                });
            }
            if host.address.trim().is_empty() {
                return Err(RegistryError::EmptyAddress(host.name));
            }
            if registry.by_name.contains_key(&host.name) {
                return Err(RegistryError::DuplicateName(host.name));
            }
            registry.by_name.insert(host.name.clone(), registry.hosts.len());
            registry.hosts.push(host);
        }
        Ok(registry)
    }

    /// All hosts in configuration order.
    #[must_use]
    pub fn list(&self) -> &[Host] {
        &self.hosts
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for names that are not configured.
    pub fn lookup(&self, name: &str) -> Result<&Host, RegistryError> {
        self.by_name
            .get(name)
            .and_then(|&index| self.hosts.get(index))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
