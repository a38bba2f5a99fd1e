use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use atlas_cli::{Args, run};

/// Collects all .toml map documents from a directory
fn collect_map_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

/// Sample maps live at the workspace root, not inside the crate
fn maps_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("maps")
}

fn args_for(input: &Path, output: PathBuf) -> Args {
    Args {
        input: input.to_path_buf(),
        output,
        config: None,
        dry_run: false,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_maps() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let maps = collect_map_files(maps_dir());

    assert!(!maps.is_empty(), "No sample maps found in maps/");

    let mut failed = Vec::new();

    for map_path in &maps {
        let output_path = temp_dir.path().join(format!(
            "{}.layout.toml",
            map_path.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args_for(map_path, output_path.clone())) {
            Ok(summary) => {
                assert!(summary.placed() > 0, "{}", map_path.display());
                let report = fs::read_to_string(&output_path).expect("report was written");
                assert!(report.contains("[[regions]]"), "{}", map_path.display());
            }
            Err(e) => failed.push((map_path.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nSample maps that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} sample map(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_maps() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let maps = collect_map_files(maps_dir().join("errors"));

    assert!(!maps.is_empty(), "No error maps found in maps/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for map_path in &maps {
        let output_path = temp_dir.path().join(format!(
            "error_{}.layout.toml",
            map_path.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args_for(map_path, output_path)).is_ok() {
            unexpectedly_succeeded.push(map_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError maps that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error map(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_explicit_config_changes_region_size() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[layout]\nregion_size = 60.0\ncolumns = 2\n").unwrap();
    let output_path = temp_dir.path().join("layout.toml");

    let mut args = args_for(&maps_dir().join("automatic.toml"), output_path.clone());
    args.config = Some(config_path);
    run(&args).expect("layout with explicit config");

    let report = fs::read_to_string(&output_path).unwrap();
    assert!(report.contains("max_x = 60.0"));
}

#[test]
fn e2e_missing_input_is_io_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let args = args_for(
        &temp_dir.path().join("absent.toml"),
        temp_dir.path().join("out.toml"),
    );

    let err = run(&args).unwrap_err();
    assert!(matches!(err, atlas::AtlasError::Io(_)));
}

#[test]
fn e2e_dry_run_writes_nothing() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("layout.toml");

    let mut args = args_for(&maps_dir().join("manual.toml"), output_path.clone());
    args.dry_run = true;
    let report = run(&args).expect("dry run");

    assert!(report.placed() > 0);
    assert!(!output_path.exists());
}
