//! Argument containers and the graph built from them.
//!
//! A container declares its arguments by handing mutable references to its
//! own fields to a [`Scope`]. Nested containers and plugin families are
//! walked recursively, so one root yields the complete, flattened set of
//! descriptors together with the slots they bind into.

use std::collections::HashMap;

use crate::args::descriptor::{ArgSpec, ArgumentDescriptor, DescriptorSummary, Gate};
use crate::args::plugin::{PluginFamily, PluginSelection};
use crate::args::target::ArgTarget;
use crate::config::ParserConfig;
use crate::error::DefinitionError;

/// A type that contributes arguments to a command line.
pub trait ArgumentContainer {
    /// Name used for the command-line reconstruction and usage header.
    fn container_name(&self) -> &str;

    /// Register every argument, nested container and plugin family.
    fn declare<'a>(&'a mut self, scope: &mut Scope<'a>);
}

pub(crate) enum Slot<'a> {
    Value(&'a mut dyn ArgTarget),
    Plugins(&'a mut PluginSelection),
}

/// Collector handed to [`ArgumentContainer::declare`].
pub struct Scope<'a> {
    entries: Vec<(ArgumentDescriptor, Slot<'a>)>,
    groups: Vec<(String, Option<Gate>)>,
}

impl<'a> Scope<'a> {
    fn new(root: String) -> Self {
        Self {
            entries: Vec::new(),
            groups: vec![(root, None)],
        }
    }

    /// Declare one argument bound to `target`.
    pub fn argument<T: ArgTarget + 'a>(&mut self, spec: ArgSpec, target: &'a mut T) -> &mut Self {
        let descriptor = self.describe(spec, &*target);
        self.entries.push((descriptor, Slot::Value(target)));
        self
    }

    /// Include every argument of a nested container.
    pub fn nested<C: ArgumentContainer + ?Sized>(&mut self, container: &'a mut C) -> &mut Self {
        let gate = self.groups.last().and_then(|(_, gate)| gate.clone());
        self.enter_group(container.container_name().to_string(), gate);
        container.declare(self);
        self.leave_group();
        self
    }

    /// Include a plugin family: its controlling argument plus the gated
    /// arguments of every candidate.
    pub fn plugins<T: ArgumentContainer + ?Sized>(
        &mut self,
        family: &'a mut PluginFamily<T>,
    ) -> &mut Self {
        family.declare(self);
        self
    }

    pub(crate) fn plugin_controller(&mut self, selection: &'a mut PluginSelection) {
        let mut descriptor = self.describe(selection.spec().clone(), &*selection);
        descriptor.mark_plugin_controller();
        self.entries.push((descriptor, Slot::Plugins(selection)));
    }

    pub(crate) fn enter_group(&mut self, name: String, gate: Option<Gate>) {
        self.groups.push((name, gate));
    }

    pub(crate) fn leave_group(&mut self) {
        if self.groups.len() > 1 {
            self.groups.pop();
        }
    }

    fn describe(&self, spec: ArgSpec, target: &dyn ArgTarget) -> ArgumentDescriptor {
        let (group, gate) = self
            .groups
            .last()
            .cloned()
            .unwrap_or_else(|| (String::new(), None));
        let defaults = if target.has_value() {
            target.rendered()
        } else {
            Vec::new()
        };
        ArgumentDescriptor::new(
            spec,
            target.shape(),
            target.kind(),
            target.accepts_tags(),
            group,
            gate,
            defaults,
        )
    }
}

/// The flattened set of descriptors of one root container, with the slots
/// they bind into and per-parse state.
pub struct ArgumentGraph<'a> {
    container_name: String,
    descriptors: Vec<ArgumentDescriptor>,
    slots: Vec<Slot<'a>>,
    index: HashMap<String, usize>,
    positional: Option<usize>,
    mutex_links: Vec<Vec<usize>>,
    specified: Vec<bool>,
}

impl<'a> ArgumentGraph<'a> {
    /// Walk `root` and validate the resulting definitions.
    pub fn build<C: ArgumentContainer + ?Sized>(
        root: &'a mut C,
        config: &ParserConfig,
    ) -> Result<Self, DefinitionError> {
        let container_name = root.container_name().to_string();
        let mut scope = Scope::new(container_name.clone());
        root.declare(&mut scope);

        let (descriptors, slots): (Vec<_>, Vec<_>) = scope.entries.into_iter().unzip();
        let count = descriptors.len();
        let mut graph = Self {
            container_name,
            descriptors,
            slots,
            index: HashMap::new(),
            positional: None,
            mutex_links: vec![Vec::new(); count],
            specified: vec![false; count],
        };
        graph.check_definitions(config)?;

        tracing::debug!(
            container = %graph.container_name,
            arguments = count,
            positional = graph.positional.is_some(),
            "Built argument graph"
        );
        Ok(graph)
    }

    fn check_definitions(&mut self, config: &ParserConfig) -> Result<(), DefinitionError> {
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            let spec = descriptor.spec();
            let argument = descriptor.long_name().to_string();
            if argument.is_empty() {
                return Err(DefinitionError::EmptyName);
            }

            if descriptor.is_positional() {
                check_positional_roles(descriptor)?;
                if let Some(first) = self.positional {
                    return Err(DefinitionError::MultiplePositional {
                        first: self.descriptors[first].long_name().to_string(),
                        second: argument,
                    });
                }
                self.positional = Some(i);
            } else {
                for name in descriptor.names() {
                    check_name(name)?;
                    if name == config.arguments_file {
                        return Err(DefinitionError::ReservedName {
                            name: name.to_string(),
                        });
                    }
                    if let Some(&first) = self.index.get(name) {
                        return Err(DefinitionError::NameCollision {
                            name: name.to_string(),
                            first: self.descriptors[first].long_name().to_string(),
                            second: argument,
                        });
                    }
                    self.index.insert(name.to_string(), i);
                }
            }

            if spec.has_element_bounds() && !descriptor.is_collection() {
                return Err(DefinitionError::IncompatibleRoles {
                    argument,
                    reason: "element bounds apply only to collections".to_string(),
                });
            }
            if let (Some(min), Some(max)) = (spec.min_elements, spec.max_elements) {
                if min > max {
                    return Err(DefinitionError::ElementBounds { argument, min, max });
                }
            }
            if spec.single_use && descriptor.is_collection() {
                return Err(DefinitionError::IncompatibleRoles {
                    argument,
                    reason: "single-use applies only to scalar arguments".to_string(),
                });
            }
            if spec.has_value_bounds() && !descriptor.kind().is_numeric() {
                return Err(DefinitionError::NonNumericBounds { argument });
            }
            for (min, max) in [
                (spec.min_value, spec.max_value),
                (spec.min_recommended, spec.max_recommended),
            ] {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(DefinitionError::ValueBounds { argument, min, max });
                    }
                }
            }
            if !descriptor.is_optional() {
                let role = if spec.hidden {
                    Some("hidden")
                } else if spec.advanced {
                    Some("advanced")
                } else {
                    None
                };
                if let Some(role) = role {
                    return Err(DefinitionError::RequiredButConcealed { argument, role });
                }
            }
        }

        for (i, descriptor) in self.descriptors.iter().enumerate() {
            for member in descriptor.mutex() {
                let Some(&j) = self.index.get(member.as_str()) else {
                    return Err(DefinitionError::UnknownMutexMember {
                        argument: descriptor.long_name().to_string(),
                        member: member.clone(),
                    });
                };
                if j == i {
                    return Err(DefinitionError::IncompatibleRoles {
                        argument: descriptor.long_name().to_string(),
                        reason: "an argument cannot be mutually exclusive with itself".to_string(),
                    });
                }
                for (from, to) in [(i, j), (j, i)] {
                    if !self.mutex_links[from].contains(&to) {
                        self.mutex_links[from].push(to);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    /// Find a named descriptor by any of its names.
    pub fn descriptor(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.lookup(name).map(|i| &self.descriptors[i])
    }

    pub fn positional(&self) -> Option<&ArgumentDescriptor> {
        self.positional.map(|i| &self.descriptors[i])
    }

    pub fn summaries(&self) -> Vec<DescriptorSummary> {
        self.descriptors.iter().map(ArgumentDescriptor::summary).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn positional_index(&self) -> Option<usize> {
        self.positional
    }

    pub(crate) fn mutex_links(&self, i: usize) -> &[usize] {
        &self.mutex_links[i]
    }

    pub(crate) fn descriptor_mut(&mut self, i: usize) -> &mut ArgumentDescriptor {
        &mut self.descriptors[i]
    }

    pub(crate) fn target(&self, i: usize) -> &(dyn ArgTarget + 'a) {
        match &self.slots[i] {
            Slot::Value(target) => &**target,
            Slot::Plugins(selection) => &**selection as &(dyn ArgTarget + 'a),
        }
    }

    pub(crate) fn target_mut(&mut self, i: usize) -> &mut (dyn ArgTarget + 'a) {
        match &mut self.slots[i] {
            Slot::Value(target) => &mut **target,
            Slot::Plugins(selection) => &mut **selection as &mut (dyn ArgTarget + 'a),
        }
    }

    pub(crate) fn selection(&self, i: usize) -> Option<&PluginSelection> {
        match &self.slots[i] {
            Slot::Plugins(selection) => Some(&**selection),
            Slot::Value(_) => None,
        }
    }

    pub(crate) fn selection_mut(&mut self, i: usize) -> Option<&mut PluginSelection> {
        match &mut self.slots[i] {
            Slot::Plugins(selection) => Some(&mut **selection),
            Slot::Value(_) => None,
        }
    }

    /// Whether the plugin a gated descriptor depends on is active.
    pub(crate) fn gate_active(&self, gate: &Gate) -> bool {
        self.lookup(&gate.family)
            .and_then(|i| self.selection(i))
            .is_some_and(|selection| selection.is_active(&gate.plugin))
    }

    pub(crate) fn gate_was_selected(&self, gate: &Gate) -> bool {
        self.lookup(&gate.family)
            .and_then(|i| self.selection(i))
            .is_some_and(|selection| selection.was_selected(&gate.plugin))
    }

    /// Whether descriptor `i` is ungated or its plugin is active.
    pub(crate) fn is_enabled(&self, i: usize) -> bool {
        self.descriptors[i]
            .gate()
            .map_or(true, |gate| self.gate_active(gate))
    }

    pub(crate) fn mark_specified(&mut self, i: usize) -> bool {
        let first = !self.specified[i];
        self.specified[i] = true;
        first
    }

    /// Whether descriptor `i` received a value from the command line.
    pub(crate) fn is_specified(&self, i: usize) -> bool {
        self.specified[i]
    }

    /// Long names of every argument set from the command line.
    pub(crate) fn specified_names(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .zip(&self.specified)
            .filter(|(_, specified)| **specified)
            .map(|(descriptor, _)| descriptor.long_name().to_string())
            .collect()
    }
}

fn check_positional_roles(descriptor: &ArgumentDescriptor) -> Result<(), DefinitionError> {
    let reason = if !descriptor.synonyms().is_empty() {
        Some("positional arguments cannot have short names or aliases")
    } else if !descriptor.mutex().is_empty() {
        Some("positional arguments cannot be mutually exclusive")
    } else if descriptor.is_flag() {
        Some("a flag cannot be positional")
    } else if descriptor.gate().is_some() {
        Some("plugin arguments cannot be positional")
    } else if descriptor.is_plugin_controller() {
        Some("a plugin selector cannot be positional")
    } else if !descriptor.is_collection() {
        Some("the positional argument must be a collection")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DefinitionError::IncompatibleRoles {
            argument: descriptor.long_name().to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_name(name: &str) -> Result<(), DefinitionError> {
    let reason = if name.is_empty() {
        Some("names cannot be empty")
    } else if name.starts_with('-') {
        Some("names cannot start with '-'")
    } else if name.contains([':', '=', ',']) {
        Some("names cannot contain ':', '=' or ','")
    } else if name.chars().any(char::is_whitespace) {
        Some("names cannot contain whitespace")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DefinitionError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
