//! Replays the pagination change set: the large loader-query rewrite plus
//! the variant-title filter additions.

use crate::fixtures::{load_change_set, mock_document};
use patchwright::config::matches_requirement;
use patchwright::run;

#[test]
fn test_loader_query_is_rewritten_for_pagination() {
    let config = load_change_set("pagination.toml");
    let specs = config.to_specs();
    let output = run(mock_document(&config), &specs);

    assert_eq!(output.report.applied(), specs.len());

    // The single-page query is gone, the cursor loop is in.
    assert!(!output.final_text.contains("products(first: $first) {"));
    assert!(output
        .final_text
        .contains("products(first: $first, after: $after) {"));
    assert!(output.final_text.contains("pageInfo {"));
    assert!(output.final_text.contains("let hasNextPage = true"));
    assert!(output.final_text.contains("const products = allProducts;"));
}

#[test]
fn test_variant_title_filter_is_added_once() {
    let config = load_change_set("pagination.toml");
    let output = run(mock_document(&config), &config.to_specs());

    let occurrences = output
        .final_text
        .matches(r#"{ value: "variantTitle", label: "Variant Title", type: "text" },"#)
        .count();
    assert_eq!(occurrences, 1);

    assert!(output.final_text.contains(r#"case "variantTitle":"#));
}

#[test]
fn test_second_run_changes_nothing() {
    let config = load_change_set("pagination.toml");
    let specs = config.to_specs();

    let first = run(mock_document(&config), &specs);
    let second = run(first.final_text.clone(), &specs);

    assert_eq!(second.report.already_present(), specs.len());
    assert_eq!(second.final_text, first.final_text);
}

#[test]
fn test_version_range_gates_old_apps() {
    let config = load_change_set("pagination.toml");
    let range = config.meta.version_range.as_deref();

    assert!(matches_requirement("1.2.3", range).unwrap());
    assert!(!matches_requirement("0.9.0", range).unwrap());
}
