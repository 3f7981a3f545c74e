//! Plugin families: selection, gated arguments, defaults and validation hooks.

mod common;

use argbind::args::{ArgSpec, PluginDiscovery, PluginFamily};
use argbind::error::{ArgError, DefinitionError, ErrorKind};
use common::{args, filter_registry, parser, DuplicateFilter, FilterTool, LengthFilter, ReadFilter};

#[test]
fn discovery_is_scoped_and_sorted() {
    let tool = FilterTool::new(&[]);
    assert_eq!(
        tool.filters.candidate_names(),
        ["DuplicateFilter", "LengthFilter", "MappingQualityFilter"]
    );

    let registry = filter_registry();
    let found = registry.discover("org.reads", &|id| id.ends_with("LengthFilter"));
    assert_eq!(found, vec!["org.reads.filters.LengthFilter"]);
}

#[test]
fn selecting_a_plugin_enables_its_arguments() {
    let mut tool = FilterTool::new(&[]);
    let outcome = parser()
        .parse(
            &mut tool,
            &args(&["--read-filter", "LengthFilter", "--min-length", "50"]),
        )
        .unwrap();

    assert_eq!(tool.filters.selected_names(), ["LengthFilter"]);
    let selected: Vec<String> = tool
        .filters
        .selected_instances()
        .iter()
        .map(|f| f.describe())
        .collect();
    assert_eq!(selected, vec!["LengthFilter(min=Some(50))"]);
    assert_eq!(
        outcome.tokens,
        vec![
            "FilterTool",
            "--read-filter",
            "LengthFilter",
            "--min-length",
            "50"
        ]
    );
}

#[test]
fn selection_order_follows_the_command_line() {
    let mut tool = FilterTool::new(&[]);
    parser()
        .parse(
            &mut tool,
            &args(&["-RF", "MappingQualityFilter", "-RF", "DuplicateFilter"]),
        )
        .unwrap();
    assert_eq!(
        tool.filters.selected_names(),
        ["MappingQualityFilter", "DuplicateFilter"]
    );
}

#[test]
fn dependent_argument_without_selection_dangles() {
    let err = parser()
        .parse(&mut FilterTool::new(&[]), &args(&["--min-length", "50"]))
        .unwrap_err();
    assert_eq!(err.kinds(), vec![ErrorKind::DanglingDependentArgument]);
    assert!(matches!(
        &err.errors()[0],
        ArgError::DanglingDependent { argument, plugin, family }
            if argument == "min-length" && plugin == "LengthFilter" && family == "read-filter"
    ));
}

#[test]
fn default_plugins_enable_their_arguments() {
    let mut tool = FilterTool::new(&["MappingQualityFilter"]);
    let outcome = parser()
        .parse(&mut tool, &args(&["--min-mapping-quality", "30"]))
        .unwrap();

    assert!(tool.filters.selected_names().is_empty());
    assert_eq!(tool.filters.default_names(), ["MappingQualityFilter"]);
    let defaults: Vec<String> = tool
        .filters
        .default_instances()
        .iter()
        .map(|f| f.describe())
        .collect();
    assert_eq!(defaults, vec!["MappingQualityFilter(min=30)"]);
    assert_eq!(
        outcome.tokens,
        vec!["FilterTool", "--min-mapping-quality", "30"]
    );
}

#[test]
fn unknown_plugin_lists_available_names() {
    let err = parser()
        .parse(&mut FilterTool::new(&[]), &args(&["--read-filter", "Nope"]))
        .unwrap_err();
    assert_eq!(err.kinds(), vec![ErrorKind::BadArgumentValue]);
    let message = err.errors()[0].to_string();
    assert!(message.contains("DuplicateFilter, LengthFilter, MappingQualityFilter"));
}

#[test]
fn selecting_twice_is_idempotent_with_warning() {
    let mut tool = FilterTool::new(&[]);
    let outcome = parser()
        .parse(
            &mut tool,
            &args(&["-RF", "DuplicateFilter", "-RF", "DuplicateFilter"]),
        )
        .unwrap();
    assert_eq!(tool.filters.selected_names(), ["DuplicateFilter"]);
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn validator_can_prune_the_selection() {
    let mut tool = FilterTool::new(&[]);
    tool.filters.set_validator(|selected, _defaults| {
        Ok(selected
            .iter()
            .filter(|name| name.as_str() != "LengthFilter")
            .cloned()
            .collect())
    });

    let err = parser()
        .parse(
            &mut tool,
            &args(&[
                "-RF",
                "LengthFilter",
                "-RF",
                "DuplicateFilter",
                "--min-length",
                "5",
            ]),
        )
        .unwrap_err();
    assert!(matches!(
        &err.errors()[0],
        ArgError::GateRemoved { argument, plugin }
            if argument == "min-length" && plugin == "LengthFilter"
    ));
    assert_eq!(err.kinds(), vec![ErrorKind::MissingArgument]);
}

#[test]
fn validator_result_is_authoritative() {
    let mut tool = FilterTool::new(&["DuplicateFilter"]);
    tool.filters.set_validator(|selected, defaults| {
        let mut all = defaults.to_vec();
        all.extend(selected.iter().cloned());
        Ok(all)
    });
    parser()
        .parse(&mut tool, &args(&["-RF", "LengthFilter"]))
        .unwrap();
    assert_eq!(
        tool.filters.selected_names(),
        ["DuplicateFilter", "LengthFilter"]
    );
}

#[test]
fn validator_failure_is_a_bad_value() {
    let mut tool = FilterTool::new(&[]);
    tool.filters
        .set_validator(|_, _| Err("filters cannot be combined".to_string()));
    let err = parser()
        .parse(&mut tool, &args(&["-RF", "LengthFilter"]))
        .unwrap_err();
    assert_eq!(err.kinds(), vec![ErrorKind::BadArgumentValue]);
}

#[test]
fn duplicate_simple_names_are_rejected() {
    let mut family: PluginFamily<dyn ReadFilter> = PluginFamily::new(ArgSpec::new("filter"));
    family
        .add_candidate("a.LengthFilter", Box::new(LengthFilter::default()))
        .unwrap();
    let err = family
        .add_candidate("b::LengthFilter", Box::new(LengthFilter::default()))
        .unwrap_err();
    assert_eq!(
        err,
        DefinitionError::DuplicatePlugin {
            family: "filter".to_string(),
            name: "LengthFilter".to_string(),
            first: "a.LengthFilter".to_string(),
            second: "b::LengthFilter".to_string(),
        }
    );
}

#[test]
fn unknown_default_is_rejected() {
    let mut family: PluginFamily<dyn ReadFilter> = PluginFamily::new(ArgSpec::new("filter"));
    family
        .add_candidate("x.DuplicateFilter", Box::new(DuplicateFilter))
        .unwrap();
    assert!(matches!(
        family.set_defaults(["Missing"]),
        Err(DefinitionError::UnknownPlugin { .. })
    ));
}

#[test]
fn describe_marks_gated_arguments() {
    let summaries = parser().describe(&mut FilterTool::new(&[])).unwrap();
    let gated = summaries
        .iter()
        .find(|s| s.long_name == "min-length")
        .unwrap();
    let gate = gated.gate.as_ref().unwrap();
    assert_eq!(gate.family, "read-filter");
    assert_eq!(gate.plugin, "LengthFilter");
    assert_eq!(gated.group, "LengthFilter");
}
