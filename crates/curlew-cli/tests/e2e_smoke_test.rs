use std::{fs, path::PathBuf};

use tempfile::tempdir;

use curlew::CurlewError;
use curlew_cli::{Args, run};

/// Collects all .hbs files from a directory
fn collect_hbs_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("hbs")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo templates live at the workspace root, not in the crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        config: None,
        log_level: "off".to_string(),
        raw: false,
        ignore_standalone: false,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_hbs_files(demos_dir());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename = format!("{}.txt", demo_path.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        match run(&args_for(demo_path, output_path.clone())) {
            Ok(()) => {
                let printed = fs::read_to_string(&output_path).expect("Output was not written");
                assert!(!printed.is_empty(), "{} printed nothing", demo_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_hbs_files(demos_dir().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.txt",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args_for(demo_path, output_path)) {
            Err(CurlewError::Parse { err, .. }) => {
                assert!(!err.diagnostics().is_empty());
            }
            Err(other) => panic!("{} failed with a non-parse error: {other}", demo_path.display()),
            Ok(()) => unexpectedly_succeeded.push(demo_path.clone()),
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!("{} error demo(s) succeeded unexpectedly", unexpectedly_succeeded.len());
    }
}

#[test]
fn e2e_raw_mode_keeps_whitespace() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("block.hbs");
    fs::write(&input, "{{#if x}}\nyes\n{{/if}}").unwrap();

    let normalized = temp_dir.path().join("normalized.txt");
    run(&args_for(&input, normalized.clone())).expect("Failed to run");
    assert!(fs::read_to_string(&normalized).unwrap().contains("CONTENT[ 'yes\n' ]"));

    let raw = temp_dir.path().join("raw.txt");
    let mut args = args_for(&input, raw.clone());
    args.raw = true;
    run(&args).expect("Failed to run");
    assert!(fs::read_to_string(&raw).unwrap().contains("CONTENT[ '\nyes\n' ]"));
}

#[test]
fn e2e_missing_input_is_io_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("absent.hbs");

    let err = run(&args_for(&input, temp_dir.path().join("out.txt"))).unwrap_err();
    assert!(matches!(err, CurlewError::Io(_)));
}
