//! Plugin families: dynamically selected argument groups.
//!
//! A family owns one candidate instance per discovered plugin. Every
//! candidate's arguments are declared up front (so they can be recognized),
//! but they are only legal once the plugin is active: selected by name via
//! the family's controlling argument, or listed as a family default.
//!
//! ```text
//! Unselected → Selected (--controller NAME) → Finalized (validator hook)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::args::container::{ArgumentContainer, Scope};
use crate::args::descriptor::{ArgSpec, Gate};
use crate::args::target::{ArgTarget, RenderedValue, TargetShape};
use crate::args::value::{Tag, ValueKind};
use crate::error::DefinitionError;

/// Constructor for one plugin type.
pub type PluginFactory<T> = Box<dyn Fn() -> Box<T>>;

/// Family-level validation hook.
///
/// Receives the user's selection (command-line order) and the family
/// defaults; returns the authoritative list of selected plugin names.
pub type SelectionValidator = Box<dyn Fn(&[String], &[String]) -> Result<Vec<String>, String>>;

/// Lookup of candidate plugin types, supplied by the caller.
pub trait PluginDiscovery {
    /// Type identifiers within `scope` that pass `filter`.
    fn discover(&self, scope: &str, filter: &dyn Fn(&str) -> bool) -> Vec<String>;
}

/// Simple name of a type identifier: the last `::`- or `.`-separated segment.
pub fn simple_name(type_id: &str) -> &str {
    let tail = type_id.rsplit("::").next().unwrap_or(type_id);
    tail.rsplit('.').next().unwrap_or(tail)
}

/// Explicit factory map keyed by fully-qualified type identifier.
pub struct PluginRegistry<T: ?Sized> {
    factories: BTreeMap<String, PluginFactory<T>>,
}

impl<T: ?Sized> PluginRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory; a later registration for the same identifier wins.
    pub fn register<F>(&mut self, type_id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<T> + 'static,
    {
        self.factories.insert(type_id.into(), Box::new(factory));
    }

    pub fn instantiate(&self, type_id: &str) -> Option<Box<T>> {
        self.factories.get(type_id).map(|factory| factory())
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl<T: ?Sized> Default for PluginRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> PluginDiscovery for PluginRegistry<T> {
    fn discover(&self, scope: &str, filter: &dyn Fn(&str) -> bool) -> Vec<String> {
        self.type_ids()
            .filter(|id| id.starts_with(scope) && filter(id))
            .map(String::from)
            .collect()
    }
}

/// Outcome of selecting a plugin by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Added,
    AlreadySelected,
}

/// Selection state of a family: the target of its controlling argument.
pub struct PluginSelection {
    spec: ArgSpec,
    candidates: Vec<String>,
    defaults: Vec<String>,
    selected: Vec<String>,
    seen: BTreeSet<String>,
    active: Vec<String>,
    finalized: bool,
    validator: Option<SelectionValidator>,
}

impl PluginSelection {
    fn new(spec: ArgSpec) -> Self {
        Self {
            spec,
            candidates: Vec::new(),
            defaults: Vec::new(),
            selected: Vec::new(),
            seen: BTreeSet::new(),
            active: Vec::new(),
            finalized: false,
            validator: None,
        }
    }

    pub fn spec(&self) -> &ArgSpec {
        &self.spec
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// Selected names: the validator's result once finalized, otherwise the
    /// user's selection so far.
    pub fn selected(&self) -> &[String] {
        if self.finalized {
            &self.active
        } else {
            &self.selected
        }
    }

    /// Select a plugin by simple name.
    pub fn select(&mut self, name: &str) -> Result<Selection, String> {
        if !self.candidates.iter().any(|c| c == name) {
            return Err(format!(
                "unknown plugin '{}'; available: {}",
                name,
                self.candidates.join(", ")
            ));
        }
        self.seen.insert(name.to_string());
        if self.selected.iter().any(|s| s == name) {
            return Ok(Selection::AlreadySelected);
        }
        tracing::debug!(family = %self.spec.long_name, plugin = %name, "Plugin selected");
        self.selected.push(name.to_string());
        Ok(Selection::Added)
    }

    /// Run the family validator and fix the authoritative selection.
    pub(crate) fn finalize(&mut self) -> Result<(), String> {
        let active = match &self.validator {
            Some(validate) => validate(&self.selected, &self.defaults)?,
            None => self.selected.clone(),
        };
        if let Some(unknown) = active.iter().find(|n| !self.candidates.contains(n)) {
            return Err(format!("validator selected unknown plugin '{}'", unknown));
        }
        self.active = active;
        self.finalized = true;
        Ok(())
    }

    /// Whether arguments gated on `plugin` are currently legal.
    pub fn is_active(&self, plugin: &str) -> bool {
        self.selected().iter().any(|s| s == plugin) || self.defaults.iter().any(|d| d == plugin)
    }

    /// Whether the user named `plugin` at any point during the parse.
    pub fn was_selected(&self, plugin: &str) -> bool {
        self.seen.contains(plugin)
    }
}

impl ArgTarget for PluginSelection {
    fn shape(&self) -> TargetShape {
        TargetShape::Collection
    }

    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn accepts_tags(&self) -> bool {
        false
    }

    fn has_value(&self) -> bool {
        !self.selected().is_empty()
    }

    fn len(&self) -> usize {
        self.selected().len()
    }

    fn push(&mut self, raw: &str, tag: Option<&Tag>) -> Result<(), String> {
        if tag.is_some() {
            return Err("plugin names cannot be tagged".to_string());
        }
        self.select(raw).map(|_| ())
    }

    fn clear(&mut self) -> Result<(), String> {
        self.selected.clear();
        Ok(())
    }

    fn rendered(&self) -> Vec<RenderedValue> {
        self.selected()
            .iter()
            .map(|name| RenderedValue {
                text: name.clone(),
                tag: None,
            })
            .collect()
    }

    fn numbers(&self) -> Vec<f64> {
        Vec::new()
    }
}

/// A family of substitutable plugins of type `T` (usually a trait object).
pub struct PluginFamily<T: ?Sized> {
    selection: PluginSelection,
    instances: Vec<(String, Box<T>)>,
    type_ids: Vec<String>,
}

impl<T: ?Sized> PluginFamily<T> {
    /// Create a family controlled by a repeatable argument.
    pub fn new(controller: ArgSpec) -> Self {
        Self {
            selection: PluginSelection::new(controller),
            instances: Vec::new(),
            type_ids: Vec::new(),
        }
    }

    pub fn family_name(&self) -> &str {
        &self.selection.spec.long_name
    }

    /// Add one candidate under the simple name of `type_id`.
    pub fn add_candidate(&mut self, type_id: &str, instance: Box<T>) -> Result<(), DefinitionError> {
        let name = simple_name(type_id);
        if let Some(position) = self.instances.iter().position(|(n, _)| n == name) {
            return Err(DefinitionError::DuplicatePlugin {
                family: self.family_name().to_string(),
                name: name.to_string(),
                first: self.type_ids[position].clone(),
                second: type_id.to_string(),
            });
        }
        self.selection.candidates.push(name.to_string());
        self.instances.push((name.to_string(), instance));
        self.type_ids.push(type_id.to_string());
        Ok(())
    }

    /// Populate candidates through a discovery service and a factory map.
    pub fn discover(
        &mut self,
        discovery: &dyn PluginDiscovery,
        registry: &PluginRegistry<T>,
        scope: &str,
        filter: &dyn Fn(&str) -> bool,
    ) -> Result<(), DefinitionError> {
        for type_id in discovery.discover(scope, filter) {
            let instance =
                registry
                    .instantiate(&type_id)
                    .ok_or_else(|| DefinitionError::MissingFactory {
                        family: self.family_name().to_string(),
                        type_id: type_id.clone(),
                    })?;
            self.add_candidate(&type_id, instance)?;
        }
        tracing::debug!(
            family = %self.family_name(),
            candidates = self.instances.len(),
            "Discovered plugins"
        );
        Ok(())
    }

    /// Discover using the registry itself as the discovery service.
    pub fn discover_registered(
        &mut self,
        registry: &PluginRegistry<T>,
        scope: &str,
        filter: &dyn Fn(&str) -> bool,
    ) -> Result<(), DefinitionError> {
        self.discover(registry, registry, scope, filter)
    }

    /// Pre-select plugins without marking them as user-selected.
    pub fn set_defaults<I, S>(&mut self, names: I) -> Result<(), DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut defaults = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !self.selection.candidates.contains(&name) {
                return Err(DefinitionError::UnknownPlugin {
                    family: self.family_name().to_string(),
                    name,
                });
            }
            defaults.push(name);
        }
        self.selection.defaults = defaults;
        Ok(())
    }

    pub fn set_validator<F>(&mut self, validator: F)
    where
        F: Fn(&[String], &[String]) -> Result<Vec<String>, String> + 'static,
    {
        self.selection.validator = Some(Box::new(validator));
    }

    pub fn selection(&self) -> &PluginSelection {
        &self.selection
    }

    pub fn candidate_names(&self) -> &[String] {
        &self.selection.candidates
    }

    /// Authoritative selection, in command-line order.
    pub fn selected_names(&self) -> &[String] {
        self.selection.selected()
    }

    pub fn default_names(&self) -> &[String] {
        &self.selection.defaults
    }

    pub fn instance(&self, name: &str) -> Option<&T> {
        self.instances
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| &**instance)
    }

    pub fn instance_mut(&mut self, name: &str) -> Option<&mut T> {
        self.instances
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| &mut **instance)
    }

    /// Selected instances in the authoritative order.
    pub fn selected_instances(&self) -> Vec<&T> {
        self.selected_names()
            .iter()
            .filter_map(|name| self.instance(name))
            .collect()
    }

    pub fn default_instances(&self) -> Vec<&T> {
        self.default_names()
            .iter()
            .filter_map(|name| self.instance(name))
            .collect()
    }
}

impl<T: ArgumentContainer + ?Sized> PluginFamily<T> {
    pub(crate) fn declare<'a>(&'a mut self, scope: &mut Scope<'a>) {
        let family = self.selection.spec.long_name.clone();
        scope.plugin_controller(&mut self.selection);
        for (name, instance) in self.instances.iter_mut() {
            let gate = Gate {
                family: family.clone(),
                plugin: name.clone(),
            };
            scope.enter_group(name.clone(), Some(gate));
            instance.declare(scope);
            scope.leave_group();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("org.tools.filters.LengthFilter"), "LengthFilter");
        assert_eq!(simple_name("filters::MappedFilter"), "MappedFilter");
        assert_eq!(simple_name("Plain"), "Plain");
    }

    fn selection() -> PluginSelection {
        let mut selection = PluginSelection::new(ArgSpec::new("read-filter"));
        selection.candidates = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        selection
    }

    #[test]
    fn test_select_unknown_lists_candidates() {
        let err = selection().select("Z").unwrap_err();
        assert!(err.contains("available: A, B, C"));
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut s = selection();
        assert_eq!(s.select("B"), Ok(Selection::Added));
        assert_eq!(s.select("B"), Ok(Selection::AlreadySelected));
        assert_eq!(s.selected(), ["B".to_string()]);
    }

    #[test]
    fn test_finalize_applies_validator() {
        let mut s = selection();
        s.validator = Some(Box::new(|selected: &[String], _: &[String]| {
            Ok(selected.iter().filter(|n| *n != "A").cloned().collect())
        }));
        s.select("A").unwrap();
        s.select("C").unwrap();
        s.finalize().unwrap();
        assert_eq!(s.selected(), ["C".to_string()]);
        assert!(s.was_selected("A"));
        assert!(!s.is_active("A"));
    }

    #[test]
    fn test_finalize_rejects_unknown_names_from_validator() {
        let mut s = selection();
        s.validator = Some(Box::new(|_: &[String], _: &[String]| {
            Ok(vec!["Q".to_string()])
        }));
        assert!(s.finalize().is_err());
    }

    #[test]
    fn test_clear_keeps_seen_history() {
        let mut s = selection();
        s.select("A").unwrap();
        s.clear().unwrap();
        assert!(s.selected().is_empty());
        assert!(s.was_selected("A"));
    }
}
