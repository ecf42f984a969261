// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

mod helpers;

use helpers::{demo_manifest, run, write_manifest};
use launch_manifest::{AmbientEnv, LoadOptions, ManifestSource, Platform, load, load_file};

// ===========================================================================
// Group 1: check
// ===========================================================================

#[test]
fn test_check_demo_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_manifest();
    let out = run(
        &["check", demo.to_str().unwrap(), "--platform", "linux"],
        &[],
        dir.path(),
    );
    assert!(out.success(), "check should succeed");
    assert!(
        out.stdout.contains("daemon-dns: ./bin/main.exe"),
        "stdout: {}",
        out.stdout
    );
    assert!(out.stdout.contains("exec_mode=fork, instances=1, watch=false, env=2"));
    assert!(out.stdout.contains("1 app(s) ok"));
}

#[test]
fn test_check_uses_env_manifest_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        dir.path(),
        "apps.yaml",
        "apps:\n  - {name: from-env, script: /usr/bin/true}\n",
    );
    let out = run(
        &["check"],
        &[("LAUNCH_MANIFEST_PATH", path.to_str().unwrap())],
        dir.path(),
    );
    assert!(out.success());
    assert!(out.stdout.contains("from-env: /usr/bin/true"), "{}", out.stdout);
}

#[test]
fn test_check_default_manifest_in_cwd() {
    let dir = tempfile::tempdir().unwrap();
    write_manifest(
        dir.path(),
        "ecosystem.yaml",
        "apps:\n  - {name: cwd-app, script: ./run}\n",
    );
    let out = run(&["check"], &[], dir.path());
    assert!(out.success());
    assert!(out.stdout.contains("cwd-app: ./run"), "{}", out.stdout);
}

#[test]
fn test_check_missing_script_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), "bad.yaml", "apps:\n  - name: x\n");
    let out = run(&["check", path.to_str().unwrap()], &[], dir.path());
    assert!(!out.success(), "missing script must fail");
    assert!(out.stderr.contains("apps[0]"), "stderr: {}", out.stderr);
    assert!(out.stderr.contains("`script`"), "stderr: {}", out.stderr);
    assert!(out.stderr.contains("bad.yaml"), "stderr: {}", out.stderr);
}

#[test]
fn test_check_missing_apps_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), "empty.yaml", "{}\n");
    let out = run(&["check", path.to_str().unwrap()], &[], dir.path());
    assert!(!out.success());
    assert!(
        out.stderr.contains("missing required key `apps`"),
        "stderr: {}",
        out.stderr
    );
}

#[test]
fn test_check_empty_apps_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), "none.yaml", "apps: []\n");
    let out = run(&["check", path.to_str().unwrap()], &[], dir.path());
    assert!(out.success());
    assert!(out.stdout.contains("0 app(s) ok"));
}

#[test]
fn test_check_nonexistent_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&["check", "/nonexistent/ecosystem.yaml"], &[], dir.path());
    assert!(!out.success());
    assert!(out.stderr.contains("failed to read manifest"), "stderr: {}", out.stderr);
}

#[test]
fn test_check_rejects_bad_override_for_other_platform() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        dir.path(),
        "ecosystem.yaml",
        "apps:\n  - name: daemon-dns\n    script: ./bin/main.exe\n    platforms:\n      windows: {script: ''}\n",
    );
    let out = run(
        &["check", path.to_str().unwrap(), "--platform", "linux"],
        &[],
        dir.path(),
    );
    assert!(!out.success(), "stdout: {}", out.stdout);
    assert!(
        out.stderr.contains("platforms.windows.script"),
        "stderr: {}",
        out.stderr
    );
}

// ===========================================================================
// Group 2: script verification
// ===========================================================================

#[test]
fn test_verify_scripts_missing_binary() {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_manifest();
    let out = run(
        &[
            "check",
            demo.to_str().unwrap(),
            "--platform",
            "linux",
            "--verify-scripts",
        ],
        &[],
        dir.path(),
    );
    assert!(!out.success());
    assert!(out.stderr.contains("script not found"), "stderr: {}", out.stderr);
    assert!(out.stderr.contains("[daemon-dns]"), "stderr: {}", out.stderr);
}

#[test]
fn test_verify_scripts_resolves_against_manifest_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("bin")).unwrap();
    std::fs::write(dir.path().join("bin").join("main.exe"), b"").unwrap();
    let path = write_manifest(
        dir.path(),
        "ecosystem.yaml",
        "apps:\n  - {name: daemon-dns, script: ./bin/main.exe}\n",
    );

    // Run from elsewhere so only the manifest directory can satisfy the check.
    let elsewhere = tempfile::tempdir().unwrap();
    let out = run(
        &["check", path.to_str().unwrap(), "--verify-scripts"],
        &[],
        elsewhere.path(),
    );
    assert!(out.success(), "stderr: {}", out.stderr);
}

// ===========================================================================
// Group 3: render
// ===========================================================================

#[test]
fn test_render_windows_forwards_ambient_file() {
    let dir = tempfile::tempdir().unwrap();
    let ambient = write_manifest(
        dir.path(),
        "ambient.env",
        "Path=C:\\Windows\\system32\nPSModulePath=C:\\Modules\nSystemRoot=C:\\Windows\nUSERNAME=svc\n",
    );
    let demo = demo_manifest();
    let out = run(
        &[
            "render",
            demo.to_str().unwrap(),
            "--platform",
            "windows",
            "--ambient-file",
            ambient.to_str().unwrap(),
        ],
        &[],
        dir.path(),
    );
    assert!(out.success(), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("script: ./main.exe"), "{}", out.stdout);
    assert!(out.stdout.contains("PSModulePath"), "{}", out.stdout);
    assert!(out.stdout.contains("SystemRoot"), "{}", out.stdout);
    assert!(!out.stdout.contains("USERNAME"), "{}", out.stdout);

    // The rendered form reloads to the same apps on any platform.
    let rendered = write_manifest(dir.path(), "rendered.yaml", &out.stdout);
    let reloaded = load_file(&rendered, &LoadOptions::default()).unwrap();
    let expected = load(
        &ManifestSource::read(&demo).unwrap(),
        &LoadOptions::new(
            Platform::Windows,
            AmbientEnv::from_env_file(&ambient).unwrap(),
        ),
    )
    .unwrap();
    assert_eq!(reloaded.apps(), expected.as_slice());
}

#[test]
fn test_render_json() {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_manifest();
    let out = run(
        &[
            "render",
            demo.to_str().unwrap(),
            "--platform",
            "linux",
            "--format",
            "json",
        ],
        &[],
        dir.path(),
    );
    assert!(out.success(), "stderr: {}", out.stderr);
    let doc: serde_json::Value = serde_json::from_str(&out.stdout).unwrap();
    let app = &doc["apps"][0];
    assert_eq!(app["name"], "daemon-dns");
    assert_eq!(app["script"], "./bin/main.exe");
    assert_eq!(app["instances"], 1);
    assert_eq!(app["exec_mode"], "fork");
    assert_eq!(app["env"]["PORT"], "3000");
}

#[test]
fn test_render_directory_later_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let apps_d = dir.path().join("apps.d");
    std::fs::create_dir(&apps_d).unwrap();
    write_manifest(
        &apps_d,
        "10-base.yaml",
        "apps:\n  - {name: daemon-dns, script: ./bin/main.exe}\n",
    );
    write_manifest(
        &apps_d,
        "20-revision.yaml",
        "apps:\n  - {name: daemon-dns, script: ./main.exe}\n",
    );

    let out = run(&["render", apps_d.to_str().unwrap()], &[], dir.path());
    assert!(out.success(), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("script: ./main.exe"), "{}", out.stdout);
    assert_eq!(out.stdout.matches("name: daemon-dns").count(), 1);
}

#[test]
fn test_render_rejects_unknown_platform() {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_manifest();
    let out = run(
        &["render", demo.to_str().unwrap(), "--platform", "plan9"],
        &[],
        dir.path(),
    );
    assert!(!out.success());
    assert!(out.stderr.contains("unknown platform"), "stderr: {}", out.stderr);
}
