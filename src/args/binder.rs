//! Value binding: occurrences → typed targets.

use crate::args::container::ArgumentGraph;
use crate::args::plugin::Selection;
use crate::args::tokenizer::{BindValue, Occurrence};
use crate::config::{CollectionMode, ParserConfig};
use crate::error::ArgError;

/// Errors and advisory warnings produced while binding.
#[derive(Debug, Default)]
pub(crate) struct BindReport {
    pub errors: Vec<ArgError>,
    pub warnings: Vec<String>,
}

/// Apply every occurrence to its target, in command-line order.
///
/// In [`CollectionMode::Replace`] the first occurrence of a collection
/// discards its initial contents; in append mode new values extend them.
/// The null sentinel always empties a collection or nulls a scalar.
pub(crate) fn bind(
    graph: &mut ArgumentGraph<'_>,
    occurrences: Vec<Occurrence>,
    config: &ParserConfig,
) -> BindReport {
    let mut report = BindReport::default();
    let mut literal_counts = vec![0usize; graph.len()];

    for Occurrence { index, value } in occurrences {
        let descriptor = &graph.descriptors()[index];
        let argument = descriptor.long_name().to_string();
        let is_collection = descriptor.is_collection();
        let single_use = descriptor.spec().single_use;
        let deprecated = descriptor.is_deprecated();

        if graph.mark_specified(index) {
            if deprecated {
                report
                    .warnings
                    .push(format!("argument '--{}' is deprecated", argument));
                tracing::warn!(argument = %argument, "Deprecated argument used");
            }
            if is_collection && config.collection_mode == CollectionMode::Replace {
                if let Err(reason) = graph.target_mut(index).clear() {
                    report.errors.push(ArgError::Internal(reason));
                }
            }
        }

        match value {
            BindValue::Supplied => {}
            BindValue::Clear => {
                if let Err(reason) = graph.target_mut(index).clear() {
                    report.errors.push(ArgError::BadValue {
                        argument,
                        value: config.null_sentinel.clone().unwrap_or_default(),
                        reason,
                    });
                }
            }
            BindValue::Literal { raw, tag } => {
                if single_use && literal_counts[index] > 0 {
                    report.errors.push(ArgError::DuplicateUse { argument });
                    continue;
                }
                literal_counts[index] += 1;

                if let Some(selection) = graph.selection_mut(index) {
                    match selection.select(&raw) {
                        Ok(Selection::Added) => {}
                        Ok(Selection::AlreadySelected) => report.warnings.push(format!(
                            "plugin '{}' was selected more than once with '--{}'",
                            raw, argument
                        )),
                        Err(reason) => report.errors.push(ArgError::BadValue {
                            argument,
                            value: raw,
                            reason,
                        }),
                    }
                    continue;
                }

                if let Err(reason) = graph.target_mut(index).push(&raw, tag.as_ref()) {
                    report.errors.push(ArgError::BadValue {
                        argument,
                        value: raw,
                        reason,
                    });
                }
            }
        }
    }
    report
}
