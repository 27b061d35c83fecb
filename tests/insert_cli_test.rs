//! Tests for `bunker insert` and `bunker show`.

mod support;
use support::*;

#[test]
fn test_insert_single_line() {
    let t = Test::init();
    assert_success(&t.insert("some/secret", "moar"));

    assert_stdout_eq(&t.show("some/secret"), "moar");
    assert_stdout_eq(&t.show_raw("some/secret"), "moar");
}

#[test]
fn test_insert_multi_line() {
    let t = Test::init();
    assert_success(&t.insert("some/newsecret", "and\nmoar"));

    assert_stdout_eq(&t.show("some/newsecret"), "and\nmoar");
    assert_stdout_eq(&t.show_raw("some/newsecret"), "and\nmoar");
}

#[test]
fn test_insert_refuses_overwrite() {
    let t = Test::with_secrets(&[("some/other", "nope")]);

    let output = t.insert("some/other", "again");
    assert_failure(&output);
    assert_stderr_contains(&output, "not overwriting your current secret");
    assert_stderr_contains(&output, "pass --force to overwrite");

    assert_stdout_eq(&t.show("some/other"), "nope");
}

#[test]
fn test_yes_does_not_imply_force() {
    let t = Test::with_secrets(&[("some/other", "nope")]);

    let output = t.run_with_stdin(&["--yes", "insert", "some/other"], "again");
    assert_failure(&output);
    assert_stdout_eq(&t.show("some/other"), "nope");
}

#[test]
fn test_force_overwrites_and_warns_on_empty() {
    let t = Test::with_secrets(&[("some/other", "nope")]);

    let output = t.insert_force("some/other", "");
    assert_success(&output);
    assert_stderr_contains(&output, "Warning: Password is empty or all whitespace");

    let output = t.insert_force("some/other", "final");
    assert_success(&output);
    assert!(!stderr(&output).contains("Warning"));
    assert_stdout_eq(&t.show("some/other"), "final");
}

#[test]
fn test_inline_key_insert() {
    let t = Test::with_secrets(&[("some/other", "final")]);

    assert_success(&t.run(&["insert", "some/other", "test:inline"]));
    assert_stdout_eq(&t.show_key("some/other", "test"), "inline");
    assert_stdout_eq(&t.show("some/other"), "final\ntest: inline");

    // The key exists now; changing it needs --force.
    let output = t.run(&["insert", "some/other", "test:inline2"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not overwriting your current secret");
    assert_stdout_eq(&t.show_key("some/other", "Test"), "inline");

    assert_success(&t.run(&["insert", "-f", "some/other", "test:inline2"]));
    assert_stdout_eq(&t.show_key("some/other", "Test"), "inline2");
    assert_stdout_eq(&t.show("some/other"), "final\ntest: inline2");
}

#[test]
fn test_key_insert_from_stdin_via_path_suffix() {
    let t = Test::with_secrets(&[("web/github", "hunter2\n")]);

    assert_success(&t.run_with_stdin(&["insert", "web/github#user"], "alice\n"));
    assert_stdout_eq(&t.show_raw("web/github"), "hunter2\nuser: alice\n");
    assert_stdout_eq(&t.show("web/github#user"), "alice");
}

#[test]
fn test_key_insert_rejects_multi_line_value() {
    let t = Test::with_secrets(&[("web/github", "hunter2")]);

    let output = t.run_with_stdin(&["insert", "web/github", "user"], "alice\nbob");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid key 'user'");
}

#[test]
fn test_json_content_survives() {
    let t = Test::init();
    assert_roundtrip(&t, "some/json", JSON_SECRET);
}

#[test]
fn test_multikey_content_survives() {
    let t = Test::init();
    assert_roundtrip(&t, "some/multikey", MULTIKEY_SECRET);

    // Duplicate keys resolve to the first occurrence.
    assert_stdout_eq(&t.show_key("some/multikey", "user"), "a user");
}

#[test]
fn test_yaml_octal_is_coerced_only_when_parsed() {
    let t = Test::with_secrets(&[("some/yamloctal", YAML_OCTAL_SECRET)]);

    assert_stdout_eq(&t.show("some/yamloctal"), "yamltest\n---\nuser: 83");
    assert_stdout_eq(&t.show_raw("some/yamloctal"), YAML_OCTAL_SECRET);
    assert_stdout_eq(&t.show_key("some/yamloctal", "user"), "83");
    assert_stdout_eq(&t.run(&["show", "-n", "some/yamloctal", "user"]), "0123");
}

#[test]
fn test_yaml_colon_line_is_not_a_key() {
    let t = Test::with_secrets(&[("some/kvwithspace", KV_WITH_SPACE_SECRET)]);

    assert_stdout_eq(&t.show("some/kvwithspace"), KV_WITH_SPACE_SECRET);
    assert_stdout_eq(&t.show_key("some/kvwithspace", "url"), "test.com/");

    let output = t.show_key("some/kvwithspace", "user");
    assert_failure(&output);
    assert_stderr_contains(&output, "key not found: user");
}

#[test]
fn test_show_missing_secret() {
    let t = Test::init();
    let output = t.show("nope");
    assert_failure(&output);
    assert_stderr_contains(&output, "secret not found: nope");
}

#[test]
fn test_insert_without_init_fails() {
    let t = Test::new();
    let output = t.insert("a", "b");
    assert_failure(&output);
    assert_stderr_contains(&output, "not initialized");
    assert_stderr_contains(&output, "run: bunker init");
}

#[test]
fn test_rm_and_ls() {
    let t = Test::with_secrets(&[("b/two", "2"), ("a/one", "1"), ("c", "3")]);

    assert_stdout_eq(&t.ls(), "a/one\nb/two\nc\n");

    assert_success(&t.rm("b/two"));
    assert_stdout_eq(&t.ls(), "a/one\nc\n");
    assert!(!t.store_dir("root").join("b").exists());

    let json: serde_json::Value = serde_json::from_str(&stdout(&t.ls_json())).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["secrets"][0], "a/one");

    assert_failure(&t.rm("b/two"));
}

#[test]
fn test_hidden_paths_are_rejected() {
    let t = Test::init();
    for path in [".hidden", "dir/.env"] {
        let output = t.insert(path, "pw");
        assert_failure(&output);
        assert_stderr_contains(&output, "segments cannot start with '.'");
    }
    let json: serde_json::Value = serde_json::from_str(&stdout(&t.ls_json())).unwrap();
    assert_eq!(json["count"], 0);
}

#[cfg(unix)]
#[test]
fn test_ls_ignores_symlinked_directories() {
    let t = Test::with_secrets(&[("a/b", "pw")]);
    std::os::unix::fs::symlink("..", t.store_dir("root").join("a").join("loop")).unwrap();

    assert_stdout_eq(&t.ls(), "a/b\n");
    assert_success(&t.run(&["reencrypt"]));
}
