//! Usage synopsis.

use crate::args::container::ArgumentGraph;
use crate::args::descriptor::ArgumentDescriptor;

/// `Usage: Tool --input <TEXT> [--count <INTEGER>] [--flag] [FILES <TEXT>...]`
///
/// Hidden arguments are left out; plugin arguments are shown as optional.
pub fn synopsis(graph: &ArgumentGraph<'_>) -> String {
    let mut parts = vec![format!("Usage: {}", graph.container_name())];
    for descriptor in graph.descriptors() {
        if descriptor.is_positional() || descriptor.is_hidden() {
            continue;
        }
        parts.push(item(descriptor));
    }
    if let Some(positional) = graph.positional() {
        parts.push(item(positional));
    }
    parts.join(" ")
}

fn item(descriptor: &ArgumentDescriptor) -> String {
    let mut text = if descriptor.is_positional() {
        format!("{} {}", descriptor.long_name(), descriptor.kind().placeholder())
    } else if descriptor.is_flag() {
        format!("--{}", descriptor.long_name())
    } else {
        format!("--{} {}", descriptor.long_name(), descriptor.kind().placeholder())
    };

    let optional = descriptor.is_optional() || descriptor.gate().is_some();
    match (descriptor.is_collection(), optional) {
        (true, true) if !descriptor.is_positional() => format!("[{}]...", text),
        (true, true) => format!("[{}...]", text),
        (true, false) => {
            text.push_str("...");
            text
        }
        (false, true) => format!("[{}]", text),
        (false, false) => text,
    }
}
