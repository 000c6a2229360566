//! CLI integration tests for amalgam
//!
//! These tests build a small libuvcxx-shaped project in a temp directory
//! and drive the binary end to end.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the amalgam binary
fn amalgam_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("amalgam"))
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn guarded(name: &str, content: &str) -> String {
    format!(
        "//\n// Created by test.\n//\n\n#ifndef {name}\n#define {name}\n\n{content}\n\n#endif //{name}\n"
    )
}

/// Create a temporary project with a few dependent headers
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    amalgam_cmd().arg("init").arg(dir.path()).assert().success();
    let root = dir.path();

    write(root, "LICENSE", "MIT License\n\nCopyright (c) 2024 Levalup\n");
    write(
        root,
        "include/uvcxx/utils/standard.h",
        &guarded(
            "LIBUVCXX_STANDARD_H",
            "#include <cstddef>\n#include <stdio.h>\n\n#define UVCXX_STD 17",
        ),
    );
    write(
        root,
        "include/uvcxx/cxx/version.h",
        &guarded(
            "LIBUVCXX_VERSION_H",
            "#include <uv.h>\n\n#define UVCXX_SATISFY_VERSION(major, minor, patch) \\\n    (UV_VERSION_HEX >= ((major << 16) | (minor << 8) | patch))",
        ),
    );
    write(
        root,
        "include/uvcxx/cxx/except.h",
        &guarded(
            "LIBUVCXX_EXCEPT_H",
            "#include <stdexcept>\n#include <stdio.h>\n\n#include \"../utils/standard.h\"\n\n\
             namespace uvcxx {\n    class exception : public std::runtime_error {};\n}",
        ),
    );
    write(
        root,
        "include/uvcxx/inner/base.h",
        &guarded(
            "LIBUVCXX_BASE_H",
            "#include <uv.h>\n\n#include \"uvcxx/cxx/except.h\"\n#include \"uvcxx/cxx/version.h\"\n\n\
             #if UVCXX_SATISFY_VERSION(1, 45, 0)\n#include <stdio.h>\n#endif\n\n\
             #ifdef _WIN32\n#include <windows.h>\n#endif\n\n\
             namespace uv {\n    class base_t {};\n}",
        ),
    );
    write(
        root,
        "include/uvcxx/loop.h",
        &guarded(
            "LIBUVCXX_LOOP_H",
            "#include \"inner/base.h\"\n\nnamespace uv {\n    class loop_t : public base_t {};\n}",
        ),
    );
    write(
        root,
        "include/uvcxx.h",
        &guarded("LIBUVCXX_H", "#include \"uvcxx/loop.h\""),
    );

    dir
}

fn single_header(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("include/uvcxx-single.h")).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    amalgam_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized amalgam project"));

    assert!(dir.path().join("amalgam.toml").is_file());
}

#[test]
fn test_commands_require_project() {
    let dir = TempDir::new().unwrap();

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in an amalgam project"));
}

// =============================================================================
// Merge Tests
// =============================================================================

#[test]
fn test_merge_writes_single_header() {
    let dir = setup_project();

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .success()
        .stdout(predicate::str::contains("has been written to"));

    let text = single_header(&dir);
    assert!(text.starts_with("/**\n * MIT License\n *\n * Copyright (c) 2024 Levalup\n */\n"));
    assert_eq!(text.matches("#ifndef UVCXX_H").count(), 1);
    assert!(text.ends_with("#endif // UVCXX_H\n"));
    assert!(!text.contains("LIBUVCXX_BASE_H"));
}

#[test]
fn test_merge_is_idempotent() {
    let dir = setup_project();

    amalgam_cmd().current_dir(dir.path()).arg("merge").assert().success();
    let first = single_header(&dir);

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .success()
        .stdout(predicate::str::contains("is already up-to-date"));

    assert_eq!(single_header(&dir), first);
}

#[test]
fn test_merge_orders_bodies_by_includes() {
    let dir = setup_project();
    amalgam_cmd().current_dir(dir.path()).arg("merge").assert().success();
    let text = single_header(&dir);

    let pos = |header: &str| text.find(&format!("// #include \"{}\"", header)).unwrap();

    assert!(pos("uvcxx/utils/standard.h") < pos("uvcxx/cxx/except.h"));
    assert!(pos("uvcxx/cxx/except.h") < pos("uvcxx/inner/base.h"));
    assert!(pos("uvcxx/inner/base.h") < pos("uvcxx/loop.h"));

    // Version header body comes right after the system includes
    assert!(text.find("#include <uv.h>").unwrap() < pos("uvcxx/cxx/version.h"));
    assert!(pos("uvcxx/cxx/version.h") < pos("uvcxx/utils/standard.h"));

    // uvcxx.h is not under the discovered directories
    assert!(!text.contains("// #include \"uvcxx.h\""));
}

#[test]
fn test_merge_deduplicates_includes() {
    let dir = setup_project();
    amalgam_cmd().current_dir(dir.path()).arg("merge").assert().success();
    let text = single_header(&dir);

    assert_eq!(text.matches("#include <stdio.h>").count(), 1);
    assert_eq!(text.matches("#include <uv.h>").count(), 1);
    assert!(text.find("#include <cstddef>").unwrap() < text.find("#include <stdexcept>").unwrap());

    // The version-gated group only held a duplicate include
    assert!(!text.contains("#if UVCXX_SATISFY_VERSION(1, 45, 0)"));
    assert!(text.contains("#ifdef _WIN32\n#include <windows.h>\n#endif\n"));
}

#[test]
fn test_merge_explicit_output() {
    let dir = setup_project();
    let out = dir.path().join("build").join("merged.h");

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .arg(&out)
        .assert()
        .success();

    assert!(out.is_file());
    assert!(!dir.path().join("include/uvcxx-single.h").exists());
}

#[test]
fn test_merge_json_output() {
    let dir = setup_project();

    let output = amalgam_cmd()
        .current_dir(dir.path())
        .args(["merge", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["written"], true);
    assert_eq!(json["headers"], 5);
}

#[test]
fn test_unresolvable_include_aborts_without_output() {
    let dir = setup_project();
    write(
        dir.path(),
        "include/uvcxx/inner/broken.h",
        &guarded("LIBUVCXX_BROKEN_H", "#include \"nowhere.h\"\n\nint broken();"),
    );

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Can not resolve include \"nowhere.h\""));

    assert!(!dir.path().join("include/uvcxx-single.h").exists());
}

#[test]
fn test_include_cycle_aborts() {
    let dir = setup_project();
    write(
        dir.path(),
        "include/uvcxx/inner/ping.h",
        &guarded("LIBUVCXX_PING_H", "#include \"pong.h\"\n\nint ping();"),
    );
    write(
        dir.path(),
        "include/uvcxx/inner/pong.h",
        &guarded("LIBUVCXX_PONG_H", "#include \"ping.h\"\n\nint pong();"),
    );

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Include cycle detected"));

    assert!(!dir.path().join("include/uvcxx-single.h").exists());
}

#[test]
fn test_malformed_guard_aborts() {
    let dir = setup_project();
    write(
        dir.path(),
        "include/uvcxx/inner/pragma.h",
        "#pragma once\n\nint pragma();\n",
    );

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed include guard"));
}

#[test]
fn test_failed_merge_keeps_previous_output() {
    let dir = setup_project();
    amalgam_cmd().current_dir(dir.path()).arg("merge").assert().success();
    let before = single_header(&dir);

    write(
        dir.path(),
        "include/uvcxx/inner/broken.h",
        &guarded("LIBUVCXX_BROKEN_H", "#include \"nowhere.h\"\n\nint broken();"),
    );
    amalgam_cmd().current_dir(dir.path()).arg("merge").assert().failure();

    assert_eq!(single_header(&dir), before);
}

// =============================================================================
// Order Tests
// =============================================================================

#[test]
fn test_order_lists_headers() {
    let dir = setup_project();

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("order")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. uvcxx/utils/standard.h"))
        .stdout(predicate::str::contains("includes: uvcxx/cxx/except.h, uvcxx/cxx/version.h"))
        .stdout(predicate::str::contains("5 header(s), 4 include edge(s)"));
}

#[test]
fn test_order_json() {
    let dir = setup_project();

    let output = amalgam_cmd()
        .current_dir(dir.path())
        .args(["order", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["header"], "uvcxx/utils/standard.h");
    assert_eq!(items[4]["header"], "uvcxx/loop.h");
    assert_eq!(items[4]["includes"][0], "uvcxx/inner/base.h");
}

// =============================================================================
// Coverage Tests
// =============================================================================

#[test]
fn test_coverage_report() {
    let dir = setup_project();
    write(
        dir.path(),
        "include/uvcxx/loop.h",
        &guarded(
            "LIBUVCXX_LOOP_H",
            "namespace uv {\n    inline int run(uv_loop_t *l) { return uv_run(l, UV_RUN_DEFAULT); }\n}",
        ),
    );
    write(
        dir.path(),
        "scripts/libuv_api.json",
        r#"{
    "sections": [
        {"name": "Event loop", "functions": ["uv_run", "uv_loop_close"]},
        {"name": "Version-checking macros and functions", "functions": ["uv_run"]}
    ]
}"#,
    );

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("coverage")
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO] Section \"Event loop\" ... [50%]"))
        .stdout(predicate::str::contains("[WARN] Miss:   - uv_loop_close"))
        .stdout(predicate::str::contains(
            "[INFO] Section \"Version-checking macros and functions\" ... [OK]",
        ))
        .stdout(predicate::str::contains("[INFO] Total API coverage [66%] - [2/3]"));
}

#[test]
fn test_coverage_requires_cache() {
    let dir = setup_project();

    amalgam_cmd()
        .current_dir(dir.path())
        .arg("coverage")
        .assert()
        .failure()
        .stderr(predicate::str::contains("API catalog cache not found"));
}
