//! Circuit (Stromkreis) registry.

use serde::{Deserialize, Serialize};

/// Known circuit names plus the one new symbols are assigned to.
///
/// Names are free-form strings like "SB-1". The active circuit is always a
/// member of the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitRegistry {
    circuits: Vec<String>,
    active: String,
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self {
            circuits: vec!["SB-1".to_string()],
            active: "SB-1".to_string(),
        }
    }
}

impl CircuitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a circuit name and make it active.
    ///
    /// The name is trimmed first; an empty result is a no-op. Adding an
    /// already-known name just activates it. Returns whether the list grew.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        if self.circuits.iter().any(|c| c == name) {
            self.active = name.to_string();
            return false;
        }
        self.circuits.push(name.to_string());
        self.active = name.to_string();
        true
    }

    pub fn names(&self) -> &[String] {
        &self.circuits
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn contains(&self, name: &str) -> bool {
        self.circuits.iter().any(|c| c == name)
    }

    /// Make an already-registered circuit the active one.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.contains(name) {
            self.active = name.to_string();
            true
        } else {
            false
        }
    }

    /// Replace the whole registry, used when loading a project.
    ///
    /// An empty list falls back to the default. If the requested active name
    /// is not in the list, the first entry becomes active.
    pub fn restore(&mut self, circuits: Vec<String>, active: String) {
        if circuits.is_empty() {
            *self = Self::default();
            return;
        }
        self.active = if circuits.iter().any(|c| *c == active) {
            active
        } else {
            circuits[0].clone()
        };
        self.circuits = circuits;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let reg = CircuitRegistry::new();
        assert_eq!(reg.names(), &["SB-1".to_string()]);
        assert_eq!(reg.active(), "SB-1");
    }

    #[test]
    fn test_add_trims_and_activates() {
        let mut reg = CircuitRegistry::new();
        assert!(reg.add("  SB-2  "));
        assert_eq!(reg.active(), "SB-2");
        assert_eq!(reg.names().len(), 2);
    }

    #[test]
    fn test_add_empty_is_noop() {
        let mut reg = CircuitRegistry::new();
        assert!(!reg.add("   "));
        assert_eq!(reg.names().len(), 1);
        assert_eq!(reg.active(), "SB-1");
    }

    #[test]
    fn test_add_duplicate_activates_without_growing() {
        let mut reg = CircuitRegistry::new();
        reg.add("SB-2");
        reg.set_active("SB-1");
        assert!(!reg.add("SB-2"));
        assert_eq!(reg.names().len(), 2);
        assert_eq!(reg.active(), "SB-2");
    }

    #[test]
    fn test_set_active_rejects_unknown() {
        let mut reg = CircuitRegistry::new();
        assert!(!reg.set_active("SB-9"));
        assert_eq!(reg.active(), "SB-1");
    }

    #[test]
    fn test_restore() {
        let mut reg = CircuitRegistry::new();
        reg.restore(vec!["A".into(), "B".into()], "B".into());
        assert_eq!(reg.active(), "B");

        reg.restore(vec!["C".into()], "missing".into());
        assert_eq!(reg.active(), "C");

        reg.restore(vec![], "anything".into());
        assert_eq!(reg.active(), "SB-1");
    }
}
