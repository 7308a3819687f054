//! Replays the weight/product-template change set against a mock bulk-edit
//! route document, through the pure runner and through a full session.

use crate::fixtures::{load_change_set, mock_document, mock_document_without};
use patchwright::{run, Document, FsTextStore, PatchSession};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_fresh_document_applies_every_change() {
    let config = load_change_set("weight-template.toml");
    let specs = config.to_specs();
    let doc = mock_document(&config);

    let output = run(doc, &specs);

    assert_eq!(output.report.applied(), specs.len());
    assert_eq!(output.report.missing(), 0);
    assert!(!output.report.drifted());

    // Every guard marker must now be present — that is what makes the next
    // run recognize the changes.
    for spec in &specs {
        assert!(
            output.final_text.contains(&spec.guard),
            "guard for '{}' missing from patched document",
            spec.id
        );
    }
}

#[test]
fn test_patched_fields_land_in_expected_places() {
    let config = load_change_set("weight-template.toml");
    let output = run(mock_document(&config), &config.to_specs());

    assert!(output.final_text.contains("templateSuffix\n            featuredMedia {"));
    assert!(output
        .final_text
        .contains("weight\n                  weightUnit"));
    assert!(output
        .final_text
        .contains(r#"else if (change.field === "weight") v.weight = parseFloat(change.newValue);"#));
    assert!(output
        .final_text
        .contains("productVariants { id price compareAtPrice sku barcode weight weightUnit }"));
    assert!(output
        .final_text
        .contains("product { id title vendor productType status tags templateSuffix }"));
}

#[test]
fn test_second_run_is_byte_identical() {
    let config = load_change_set("weight-template.toml");
    let specs = config.to_specs();

    let first = run(mock_document(&config), &specs);
    let second = run(first.final_text.clone(), &specs);

    assert_eq!(second.report.applied(), 0);
    assert_eq!(second.report.already_present(), specs.len());
    assert_eq!(
        Document::new(second.final_text.as_str()).fingerprint(),
        Document::new(first.final_text.as_str()).fingerprint()
    );
}

#[test]
fn test_session_applies_and_rerun_is_noop() {
    let config = load_change_set("weight-template.toml");
    let specs = config.to_specs();

    let project = TempDir::new().unwrap();
    let target = config.target_path(project.path());
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, mock_document(&config)).unwrap();

    let session = PatchSession::new(FsTextStore);

    let report = session.run(&target, &specs).unwrap();
    assert_eq!(report.applied(), specs.len());

    let patched = fs::read_to_string(&target).unwrap();

    let rerun = session.run(&target, &specs).unwrap();
    assert_eq!(rerun.applied(), 0);
    assert_eq!(rerun.already_present(), specs.len());
    assert_eq!(fs::read_to_string(&target).unwrap(), patched);
}

#[test]
fn test_missing_anchor_only_affects_its_own_change() {
    let config = load_change_set("weight-template.toml");
    let specs = config.to_specs();
    let doc = mock_document_without(&config, "product-return-template");

    let output = run(doc, &specs);

    assert_eq!(output.report.missing(), 1);
    assert_eq!(output.report.applied(), specs.len() - 1);

    for outcome in output.report.outcomes() {
        if outcome.id == "product-return-template" {
            assert!(outcome.is_anchor_not_found());
        } else {
            assert!(outcome.is_applied(), "'{}' should have applied", outcome.id);
        }
    }
}
