//! Post-bind validation.
//!
//! Runs after every occurrence has been bound and collects *all* problems
//! rather than stopping at the first:
//!
//! 1. plugin families are finalized (validator hooks run)
//! 2. gated arguments are checked against the active plugins
//! 3. required arguments and positional counts
//! 4. mutual exclusion
//! 5. collection sizes and numeric ranges

use std::collections::BTreeSet;

use crate::args::container::ArgumentGraph;
use crate::error::ArgError;

#[derive(Debug, Default)]
pub(crate) struct ValidationReport {
    pub errors: Vec<ArgError>,
    pub warnings: Vec<String>,
}

pub(crate) fn validate(graph: &mut ArgumentGraph<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();
    finalize_plugins(graph, &mut report);
    for i in 0..graph.len() {
        let has_value = graph.target(i).has_value();
        graph.descriptor_mut(i).resolve_optional(has_value);
    }
    check_gates(graph, &mut report);
    check_required(graph, &mut report);
    check_mutex(graph, &mut report);
    check_sizes(graph, &mut report);
    check_ranges(graph, &mut report);
    report
}

fn finalize_plugins(graph: &mut ArgumentGraph<'_>, report: &mut ValidationReport) {
    for i in 0..graph.len() {
        let argument = graph.descriptors()[i].long_name().to_string();
        let Some(selection) = graph.selection_mut(i) else {
            continue;
        };
        if let Err(reason) = selection.finalize() {
            report.errors.push(ArgError::BadValue {
                argument,
                value: selection.selected().join(","),
                reason,
            });
        }
    }
}

fn check_gates(graph: &ArgumentGraph<'_>, report: &mut ValidationReport) {
    for (i, descriptor) in graph.descriptors().iter().enumerate() {
        let Some(gate) = descriptor.gate() else {
            continue;
        };
        if !graph.is_specified(i) || graph.gate_active(gate) {
            continue;
        }
        let argument = descriptor.long_name().to_string();
        if graph.gate_was_selected(gate) {
            report.errors.push(ArgError::GateRemoved {
                argument,
                plugin: gate.plugin.clone(),
            });
        } else {
            report.errors.push(ArgError::DanglingDependent {
                argument,
                plugin: gate.plugin.clone(),
                family: gate.family.clone(),
            });
        }
    }
}

/// Explicitly specified and holding a value.
fn is_bound(graph: &ArgumentGraph<'_>, i: usize) -> bool {
    graph.is_specified(i) && graph.target(i).has_value()
}

fn check_required(graph: &ArgumentGraph<'_>, report: &mut ValidationReport) {
    for (i, descriptor) in graph.descriptors().iter().enumerate() {
        if descriptor.is_optional() || !graph.is_enabled(i) {
            continue;
        }
        if graph.mutex_links(i).iter().any(|&j| is_bound(graph, j)) {
            continue;
        }
        report.errors.push(ArgError::MissingArgument {
            argument: descriptor.long_name().to_string(),
        });
    }
}

fn check_mutex(graph: &ArgumentGraph<'_>, report: &mut ValidationReport) {
    let mut pairs = BTreeSet::new();
    for i in 0..graph.len() {
        if !is_bound(graph, i) {
            continue;
        }
        for &j in graph.mutex_links(i) {
            if is_bound(graph, j) {
                pairs.insert((i.min(j), i.max(j)));
            }
        }
    }
    for (a, b) in pairs {
        report.errors.push(ArgError::MutexViolation {
            first: graph.descriptors()[a].long_name().to_string(),
            second: graph.descriptors()[b].long_name().to_string(),
        });
    }
}

fn check_sizes(graph: &ArgumentGraph<'_>, report: &mut ValidationReport) {
    for (i, descriptor) in graph.descriptors().iter().enumerate() {
        if !descriptor.is_collection() || !graph.is_enabled(i) {
            continue;
        }
        let spec = descriptor.spec();
        let actual = graph.target(i).len();
        let argument = descriptor.long_name().to_string();

        if let Some(min) = spec.min_elements {
            // Empty collections are governed by required/optional alone.
            if actual > 0 && actual < min {
                report.errors.push(ArgError::TooFewValues {
                    argument: argument.clone(),
                    min,
                    actual,
                });
            }
        }
        if let Some(max) = spec.max_elements {
            if actual > max {
                let err = if descriptor.is_positional() {
                    ArgError::TooManyPositional { max, actual }
                } else {
                    ArgError::TooManyValues {
                        argument,
                        max,
                        actual,
                    }
                };
                report.errors.push(err);
            }
        }
    }
}

fn check_ranges(graph: &ArgumentGraph<'_>, report: &mut ValidationReport) {
    for (i, descriptor) in graph.descriptors().iter().enumerate() {
        if !graph.is_specified(i) || !graph.is_enabled(i) {
            continue;
        }
        let spec = descriptor.spec();
        let argument = descriptor.long_name();
        for value in graph.target(i).numbers() {
            if let Some(min) = spec.min_value.filter(|min| value < *min) {
                report.errors.push(ArgError::OutOfRange {
                    argument: argument.to_string(),
                    value,
                    reason: format!("must be at least {}", min),
                });
            } else if let Some(max) = spec.max_value.filter(|max| value > *max) {
                report.errors.push(ArgError::OutOfRange {
                    argument: argument.to_string(),
                    value,
                    reason: format!("must be at most {}", max),
                });
            } else if spec.min_recommended.is_some_and(|min| value < min)
                || spec.max_recommended.is_some_and(|max| value > max)
            {
                tracing::warn!(argument = %argument, value, "Value outside recommended range");
                report.warnings.push(format!(
                    "argument '--{}' value {} is outside the recommended range [{}, {}]",
                    argument,
                    value,
                    bound(spec.min_recommended),
                    bound(spec.max_recommended)
                ));
            }
        }
    }
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
