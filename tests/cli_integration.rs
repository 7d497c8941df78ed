//! End-to-end tests for the extract and validate commands.

use std::fs;
use std::path::{Path, PathBuf};

use claimcheck::cli::{
    self, ExtractArgs, GlobalArgs, ValidateArgs, EXIT_ERROR, EXIT_FAILED, EXIT_SUCCESS,
};
use claimcheck::{ClaimDocument, ValidationReport};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Quiet global options with a config that only uses the walk backend.
fn global(dir: &Path) -> GlobalArgs {
    let config = dir.join("claimcheck.yaml");
    fs::write(
        &config,
        "search:\n  backends: [walk]\n  timeout_secs: 30\n",
    )
    .unwrap();
    GlobalArgs {
        verbose: 0,
        quiet: true,
        config: Some(config),
    }
}

fn validate_args(claims: PathBuf) -> ValidateArgs {
    ValidateArgs {
        claims,
        source_root: Some(testdata_path().join("magento")),
        output: None,
        format: "yaml".to_string(),
        jobs: Some(2),
        backends: Vec::new(),
        strict: false,
    }
}

/// Copy the fixture page into a scratch dir and extract it there.
fn extract_into(temp: &TempDir) -> PathBuf {
    let doc = temp.path().join("customer_architecture.html");
    fs::copy(testdata_path().join("docs/customer_architecture.html"), &doc).unwrap();

    let args = ExtractArgs {
        document: doc,
        output: None,
    };
    assert_eq!(cli::run_extract(&args, &global(temp.path())).unwrap(), EXIT_SUCCESS);
    temp.path().join("customer_architecture_claims.yaml")
}

#[test]
fn test_extract_writes_default_output() {
    let temp = TempDir::new().unwrap();
    let claims = extract_into(&temp);

    let document = ClaimDocument::read_file(&claims).unwrap();
    assert!(document.source_document.ends_with("customer_architecture.html"));
    assert!(!document.validation_status.validated);
    assert_eq!(document.into_claim_set().len(), 17);
}

#[test]
fn test_extract_missing_document() {
    let temp = TempDir::new().unwrap();
    let args = ExtractArgs {
        document: temp.path().join("missing.html"),
        output: None,
    };
    assert_eq!(cli::run_extract(&args, &global(temp.path())).unwrap(), EXIT_ERROR);
}

#[test]
fn test_validate_writes_yaml_report() {
    let temp = TempDir::new().unwrap();
    let claims = extract_into(&temp);

    let args = validate_args(claims);
    assert_eq!(cli::run_validate(&args, &global(temp.path())).unwrap(), EXIT_SUCCESS);

    let output = temp.path().join("customer_architecture_claims_validation.yaml");
    let report: ValidationReport =
        serde_yaml::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(report.summary.total_claims, 17);
    assert_eq!(report.summary.found, 12);
}

#[test]
fn test_validate_json_and_strict() {
    let temp = TempDir::new().unwrap();
    let claims = extract_into(&temp);
    let output = temp.path().join("report.json");

    let mut args = validate_args(claims);
    args.format = "json".to_string();
    args.output = Some(output.clone());
    args.strict = true;

    // Magento\Foo\Bar\Baz is not in the tree
    assert_eq!(cli::run_validate(&args, &global(temp.path())).unwrap(), EXIT_FAILED);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(value["summary"]["not_found"], 2);
    assert_eq!(value["results_by_type"]["config_paths"]["not_validated"], 2);
}

#[test]
fn test_validate_rejects_bad_inputs() {
    let temp = TempDir::new().unwrap();
    let claims = extract_into(&temp);
    let global = global(temp.path());

    let mut args = validate_args(claims.clone());
    args.format = "sarif".to_string();
    assert_eq!(cli::run_validate(&args, &global).unwrap(), EXIT_ERROR);

    let mut args = validate_args(claims.clone());
    args.source_root = Some(temp.path().to_path_buf());
    assert_eq!(cli::run_validate(&args, &global).unwrap(), EXIT_ERROR);

    let mut args = validate_args(claims);
    args.backends = vec!["ag".to_string()];
    assert_eq!(cli::run_validate(&args, &global).unwrap(), EXIT_ERROR);

    let args = validate_args(temp.path().join("missing_claims.yaml"));
    assert_eq!(cli::run_validate(&args, &global).unwrap(), EXIT_ERROR);
}

#[test]
fn test_invalid_config_is_an_error() {
    let temp = TempDir::new().unwrap();
    let claims = extract_into(&temp);

    let config = temp.path().join("bad.yaml");
    fs::write(&config, "search:\n  timeout_secs: 0\n").unwrap();
    let global = GlobalArgs {
        verbose: 0,
        quiet: true,
        config: Some(config),
    };
    assert_eq!(cli::run_validate(&validate_args(claims), &global).unwrap(), EXIT_ERROR);
}
