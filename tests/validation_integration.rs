//! Integration tests for the validation pipeline.
//!
//! These run against the miniature vendor tree under testdata/magento using
//! the in-process walk backend, so no search tools need to be installed.

use std::path::PathBuf;

use claimcheck::config::{SearchConfig, ValidationConfig};
use claimcheck::{
    Claim, ClaimCategory, ClaimSet, Confidence, Extractor, Runner, SearchChain, SearchHit,
    SourceRoot, ValidationReport, ValidationStatus, Validator,
};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn validator() -> Validator {
    let root = SourceRoot::from_config(&testdata_path().join("magento"), &ValidationConfig::default())
        .expect("fixture tree should resolve");
    let chain = SearchChain::from_config(&SearchConfig::default(), &["walk".to_string()])
        .expect("walk backend should build");
    Validator::new(root, chain)
}

fn fixture_report() -> ValidationReport {
    let doc = testdata_path().join("docs/customer_architecture.html");
    let set = Extractor::default().extract_file(&doc).unwrap();
    Runner::new(&validator()).jobs(4).run(&set).unwrap()
}

#[test]
fn test_source_root_resolves_vendor_dir() {
    let validator = validator();
    assert!(validator.root().modules().ends_with("vendor/magento"));
}

#[test]
fn test_class_at_expected_path_is_high() {
    let result = validator().validate(&Claim::new(
        ClaimCategory::Class,
        "Magento\\CatalogInventory\\Model\\StockManagement",
    ));
    assert_eq!(result.status, ValidationStatus::Found);
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(
        result.evidence,
        vec![SearchHit::new("module-catalog-inventory/Model/StockManagement.php", 4)]
    );
}

#[test]
fn test_missing_class_names_expected_path() {
    let result = validator().validate(&Claim::new(ClaimCategory::Class, "Magento\\Foo\\Bar\\Baz"));
    assert!(!result.is_found());
    assert_eq!(result.confidence, Confidence::High);
    assert!(result.notes.contains("module-foo/Bar/Baz.php"));
}

#[test]
fn test_interface_uses_class_marker() {
    // Interface files declare `interface X`, which the class marker does not match.
    let result = validator().validate(&Claim::new(
        ClaimCategory::Interface,
        "Magento\\Customer\\Api\\CustomerRepositoryInterface",
    ));
    assert!(!result.is_found());
    assert_eq!(result.confidence, Confidence::High);
    assert!(result.notes.contains("does not declare class CustomerRepositoryInterface"));
}

#[test]
fn test_method_search() {
    let result = validator().validate(&Claim::new(ClaimCategory::Method, "save"));
    assert!(result.is_found());
    assert_eq!(result.confidence, Confidence::Medium);
    assert_eq!(
        result.evidence,
        vec![
            SearchHit::new("module-customer/Api/CustomerRepositoryInterface.php", 10),
            SearchHit::new("module-customer/Model/ResourceModel/CustomerRepository.php", 9),
        ]
    );
}

#[test]
fn test_event_in_markup_then_source() {
    let validator = validator();

    let declared = validator.validate(&Claim::new(ClaimCategory::Event, "customer_save_after"));
    assert_eq!(
        declared.evidence,
        vec![SearchHit::new("module-customer/etc/events.xml", 3)]
    );

    let dispatched = validator.validate(&Claim::new(ClaimCategory::Event, "customer_login"));
    assert_eq!(dispatched.confidence, Confidence::High);
    assert_eq!(
        dispatched.evidence,
        vec![SearchHit::new("module-customer/Model/AccountManagement.php", 9)]
    );
}

#[test]
fn test_acl_and_table() {
    let validator = validator();

    let acl = validator.validate(&Claim::new(ClaimCategory::AclResource, "Magento_Customer::manage"));
    assert!(acl.is_found());
    assert_eq!(acl.evidence, vec![SearchHit::new("module-customer/etc/acl.xml", 7)]);

    let table = validator.validate(&Claim::new(ClaimCategory::Table, "customer_entity"));
    assert!(table.is_found());
    assert_eq!(table.confidence, Confidence::High);

    let missing = validator.validate(&Claim::new(ClaimCategory::Table, "quote_item"));
    assert!(!missing.is_found());
    assert_eq!(missing.confidence, Confidence::Medium);
}

#[test]
fn test_full_report_counts() {
    let report = fixture_report();
    let summary = &report.summary;

    assert_eq!(summary.total_claims, 17);
    assert_eq!(summary.validated, 14);
    assert_eq!(summary.found, 12);
    assert_eq!(summary.not_found, 2);
    assert_eq!(summary.not_validated, 3);

    let histogram = &summary.confidence_distribution;
    assert_eq!(histogram.high, 12);
    assert_eq!(histogram.medium, 2);
    assert_eq!(histogram.low, 3);
    assert_eq!(histogram.high + histogram.medium + histogram.low, summary.total_claims);
}

#[test]
fn test_report_breakdown_adds_up() {
    let report = fixture_report();

    for (category, breakdown) in &report.results_by_type {
        assert_eq!(
            breakdown.found + breakdown.not_found + breakdown.not_validated,
            breakdown.total,
            "{}",
            category
        );
        assert_eq!(breakdown.results.len(), breakdown.total);
        if category.is_validated() {
            assert_eq!(breakdown.not_validated, 0, "{}", category);
        } else {
            assert_eq!(breakdown.not_validated, breakdown.total, "{}", category);
        }
    }

    let classes = report.category(ClaimCategory::Class).unwrap();
    assert_eq!(classes.found, 3);
    assert_eq!(classes.not_found, 1);
}

#[test]
fn test_results_follow_claim_order() {
    let report = fixture_report();
    for breakdown in report.results_by_type.values() {
        let claims: Vec<_> = breakdown.results.iter().map(|r| r.claim.clone()).collect();
        let mut sorted = claims.clone();
        sorted.sort();
        assert_eq!(claims, sorted);
    }
}

#[test]
fn test_each_claim_has_one_result() {
    let set = ClaimSet::from_claims(
        "manual.html",
        "2026-10-18T00:00:00Z",
        vec![
            Claim::new(ClaimCategory::Method, "save"),
            Claim::new(ClaimCategory::Method, "save"),
            Claim::new(ClaimCategory::FilePath, "etc/acl.xml"),
        ],
    );
    let report = Runner::new(&validator()).jobs(1).run(&set).unwrap();
    assert_eq!(report.summary.total_claims, 2);
    assert_eq!(report.summary.found, 1);
    assert_eq!(report.summary.not_validated, 1);
}

#[test]
fn test_unresolvable_source_root() {
    let temp = tempfile::TempDir::new().unwrap();
    let err = SourceRoot::from_config(temp.path(), &ValidationConfig::default()).unwrap_err();
    assert!(err.to_string().contains("vendor/magento"));
}
