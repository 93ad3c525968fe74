use super::{BusinessLaunchPattern, PatternPlugin, SoftwareDevelopmentPattern};
use crate::output::InitiativeType;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// In-memory map from initiative type to its pattern plugin
pub struct PatternRegistry {
    patterns: HashMap<InitiativeType, Arc<dyn PatternPlugin>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self {
            patterns: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(BusinessLaunchPattern));
        registry.register(Arc::new(SoftwareDevelopmentPattern));
        registry
    }

    /// Registers a plugin, replacing any plugin already registered for the same
    /// initiative type.
    pub fn register(&mut self, plugin: Arc<dyn PatternPlugin>) {
        let initiative_type = plugin.initiative_type();
        if let Some(previous) = self.patterns.insert(initiative_type, plugin) {
            warn!(
                initiative_type = %initiative_type,
                replaced = previous.name(),
                "Pattern plugin overwritten"
            );
        } else {
            debug!(initiative_type = %initiative_type, "Pattern plugin registered");
        }
    }

    pub fn get_pattern(&self, initiative_type: InitiativeType) -> Option<Arc<dyn PatternPlugin>> {
        self.patterns.get(&initiative_type).cloned()
    }

    /// All plugins, ordered by initiative type
    pub fn get_all_patterns(&self) -> Vec<Arc<dyn PatternPlugin>> {
        let mut all: Vec<_> = self.patterns.values().cloned().collect();
        all.sort_by_key(|p| p.initiative_type());
        all
    }

    pub fn has_pattern(&self, initiative_type: InitiativeType) -> bool {
        self.patterns.contains_key(&initiative_type)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
