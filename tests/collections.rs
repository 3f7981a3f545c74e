//! Collection binding: merge modes, the null sentinel, list files and sizes.

mod common;

use argbind::error::{ArgError, ErrorKind};
use common::{append_parser, args, parser, write_file, SortTool};
use tempfile::TempDir;

fn with_input(tokens: &[&str]) -> Vec<String> {
    let mut all = args(&["--input", "a.bam"]);
    all.extend(args(tokens));
    all
}

// =============================================================================
// MERGE MODES
// =============================================================================

#[test]
fn replace_mode_discards_defaults() {
    let mut tool = SortTool::default();
    parser()
        .parse(&mut tool, &with_input(&["--LIST", "v1"]))
        .unwrap();
    assert_eq!(tool.list, vec!["v1"]);
}

#[test]
fn append_mode_extends_defaults() {
    let mut tool = SortTool::default();
    append_parser()
        .parse(&mut tool, &with_input(&["--LIST", "v1"]))
        .unwrap();
    assert_eq!(tool.list, vec!["foo", "bar", "v1"]);
}

#[test]
fn untouched_collection_keeps_defaults() {
    for parser in [parser(), append_parser()] {
        let mut tool = SortTool::default();
        parser.parse(&mut tool, &with_input(&[])).unwrap();
        assert_eq!(tool.list, vec!["foo", "bar"]);
    }
}

#[test]
fn null_clears_then_values_bind_in_both_modes() {
    for parser in [parser(), append_parser()] {
        let mut tool = SortTool::default();
        parser
            .parse(
                &mut tool,
                &with_input(&["--LIST", "null", "--LIST", "v1", "--LIST", "v2"]),
            )
            .unwrap();
        assert_eq!(tool.list, vec!["v1", "v2"]);
    }
}

#[test]
fn null_in_the_middle_discards_earlier_values() {
    let mut tool = SortTool::default();
    parser()
        .parse(
            &mut tool,
            &with_input(&["--LIST", "baz", "--LIST", "null", "--LIST", "frob"]),
        )
        .unwrap();
    assert_eq!(tool.list, vec!["frob"]);
}

#[test]
fn null_alone_empties_the_collection() {
    let mut tool = SortTool::default();
    let outcome = append_parser()
        .parse(&mut tool, &with_input(&["--LIST", "null"]))
        .unwrap();
    assert!(tool.list.is_empty());
    assert!(outcome
        .tokens
        .windows(2)
        .any(|w| w == ["--LIST", "null"]));
}

#[test]
fn nullable_scalar_is_cleared() {
    let mut tool = SortTool {
        output: Some("preset.bam".to_string()),
        ..SortTool::default()
    };
    parser()
        .parse(&mut tool, &with_input(&["--output", "null"]))
        .unwrap();
    assert!(tool.output.is_none());
}

// =============================================================================
// LIST FILES
// =============================================================================

#[test]
fn list_file_expands_to_one_value_per_line() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "values.list", "alpha\n\n  beta  \n#gamma\n");

    let mut tool = SortTool::default();
    parser()
        .parse(&mut tool, &with_input(&["--LIST", &path]))
        .unwrap();
    assert_eq!(tool.list, vec!["alpha", "beta", "#gamma"]);
}

#[test]
fn empty_list_file_still_replaces_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.list", "\n");

    let mut tool = SortTool::default();
    let outcome = parser()
        .parse(&mut tool, &with_input(&["--LIST", &path]))
        .unwrap();
    assert!(tool.list.is_empty());
    assert!(outcome
        .tokens
        .windows(2)
        .any(|w| w == ["--LIST", "null"]));

    let mut tool = SortTool::default();
    append_parser()
        .parse(&mut tool, &with_input(&["--LIST", &path]))
        .unwrap();
    assert_eq!(tool.list, vec!["foo", "bar"]);
}

#[test]
fn list_file_expansion_applies_to_positional_values() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "inputs.args", "one.bam\ntwo.bam\n");

    let mut tool = SortTool::default();
    parser()
        .parse(&mut tool, &with_input(&[&path, "three.bam"]))
        .unwrap();
    assert_eq!(tool.files, vec!["one.bam", "two.bam", "three.bam"]);
}

#[test]
fn list_file_expansion_can_be_suppressed() {
    let mut tool = SortTool::default();
    parser()
        .parse(&mut tool, &with_input(&["--intervals", "targets.list"]))
        .unwrap();
    assert_eq!(tool.intervals, vec!["targets.list"]);
}

#[test]
fn scalar_values_are_never_expanded() {
    let mut tool = SortTool::default();
    parser()
        .parse(&mut tool, &with_input(&["--output", "result.list"]))
        .unwrap();
    assert_eq!(tool.output.as_deref(), Some("result.list"));
}

#[test]
fn unreadable_list_file_aborts() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.list");

    let mut tool = SortTool::default();
    let err = parser()
        .parse(
            &mut tool,
            &with_input(&["--LIST", &missing.to_string_lossy()]),
        )
        .unwrap_err();
    assert_eq!(err.kinds(), vec![ErrorKind::ArgumentFile]);
    assert_eq!(tool.list, vec!["foo", "bar"]);
}

// =============================================================================
// ELEMENT COUNTS
// =============================================================================

#[test]
fn too_many_values_for_named_collection() {
    let err = parser()
        .parse(
            &mut SortTool::default(),
            &with_input(&["--sample", "a", "--sample", "b", "--sample", "c", "--sample", "d"]),
        )
        .unwrap_err();
    assert!(matches!(
        &err.errors()[0],
        ArgError::TooManyValues { argument, max: 3, actual: 4 } if argument == "sample"
    ));
}

#[test]
fn too_few_values_for_named_collection() {
    let err = parser()
        .parse(&mut SortTool::default(), &with_input(&["--sample", "a"]))
        .unwrap_err();
    assert!(matches!(
        &err.errors()[0],
        ArgError::TooFewValues { min: 2, actual: 1, .. }
    ));
}

#[test]
fn element_counts_within_bounds() {
    let mut tool = SortTool::default();
    parser()
        .parse(&mut tool, &with_input(&["--sample", "a", "--sample", "b"]))
        .unwrap();
    assert_eq!(tool.samples, vec!["a", "b"]);
}
