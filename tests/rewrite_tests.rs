//! Integration tests for the config rewrite engine.

use std::fs;
use std::path::PathBuf;

use envseal::crypto::{is_encrypted, Cipher, CryptoParams, FieldCodec};
use envseal::errors::ErrorKind;
use envseal::rewrite::RewriteEngine;
use tempfile::TempDir;

fn engine() -> RewriteEngine {
    let params = CryptoParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
        ..CryptoParams::default()
    };
    RewriteEngine::new(FieldCodec::new(Cipher::new(params).unwrap(), 4))
}

/// Helper: write `contents` to a config file inside a fresh temp dir.
fn config_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("app.env");
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

fn lookups(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Worked example
// ---------------------------------------------------------------------------

#[tokio::test]
async fn encrypts_only_the_targeted_line() {
    let (_dir, path) = config_file("# comment\nUSER=alice\nPASS=secret123");
    let engine = engine();

    let report = engine
        .encrypt_file(&path, Some(&lookups(&["PASS"])), "k1")
        .await
        .unwrap();
    assert_eq!(report.newly_encrypted(), 1);
    assert_eq!(report.encrypted, vec!["PASS"]);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "# comment");
    assert_eq!(lines[1], "USER=alice");

    let value = lines[2].strip_prefix("PASS=").expect("PASS line keeps its key");
    assert!(value.starts_with(r#"{"salt":""#));
    assert!(is_encrypted(value));
    assert_eq!(engine.codec().cipher().decrypt(value, "k1").unwrap(), "secret123");
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let (_dir, path) = config_file("# comment\nUSER=alice\nPASS=secret123\n");
    let engine = engine();
    let targets = lookups(&["PASS"]);

    engine.encrypt_file(&path, Some(&targets), "k1").await.unwrap();
    let after_first = fs::read(&path).unwrap();

    let report = engine.encrypt_file(&path, Some(&targets), "k1").await.unwrap();
    assert_eq!(report.newly_encrypted(), 0);
    assert!(report.is_unchanged());
    assert_eq!(report.already_encrypted, vec!["PASS"]);
    assert_eq!(fs::read(&path).unwrap(), after_first);
}

#[tokio::test]
async fn idempotent_when_encrypting_everything() {
    let (_dir, path) = config_file("A=1\nB=2\nC=3\n");
    let engine = engine();

    let first = engine.encrypt_file(&path, None, "k").await.unwrap();
    assert_eq!(first.newly_encrypted(), 3);
    let after_first = fs::read(&path).unwrap();

    let second = engine.encrypt_file(&path, None, "k").await.unwrap();
    assert_eq!(second.newly_encrypted(), 0);
    assert_eq!(second.targeted(), 3);
    assert_eq!(fs::read(&path).unwrap(), after_first);
}

// ---------------------------------------------------------------------------
// Format preservation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn untouched_lines_keep_content_and_order() {
    let original = "\
# database
DB_HOST=localhost
DB_PASS=hunter2

not an entry
EMPTY=
  # indented comment
API_TOKEN=tok=en==
TRAILING=keep me
";
    let (_dir, path) = config_file(original);

    engine()
        .encrypt_file(&path, Some(&lookups(&["DB_PASS", "API_TOKEN"])), "k")
        .await
        .unwrap();

    let before: Vec<&str> = original.split('\n').collect();
    let text = fs::read_to_string(&path).unwrap();
    let after: Vec<&str> = text.split('\n').collect();

    assert_eq!(before.len(), after.len());
    for (i, (b, a)) in before.iter().zip(&after).enumerate() {
        if b.starts_with("DB_PASS=") || b.starts_with("API_TOKEN=") {
            assert_ne!(b, a, "line {i} should be encrypted");
            assert!(is_encrypted(a.split_once('=').unwrap().1));
        } else {
            assert_eq!(b, a, "line {i} must be untouched");
        }
    }
}

#[tokio::test]
async fn value_lookup_selects_entry() {
    let (_dir, path) = config_file("USER=alice\nPASS=secret123\n");

    let report = engine()
        .encrypt_file(&path, Some(&lookups(&["secret123"])), "k")
        .await
        .unwrap();
    assert_eq!(report.encrypted, vec!["PASS"]);
}

#[tokio::test]
async fn unresolved_lookup_is_reported_and_run_continues() {
    let (_dir, path) = config_file("USER=alice\nPASS=secret123\n");

    let report = engine()
        .encrypt_file(&path, Some(&lookups(&["NOPE", "PASS"])), "k")
        .await
        .unwrap();
    assert_eq!(report.unresolved, vec!["NOPE"]);
    assert_eq!(report.encrypted, vec!["PASS"]);
}

#[tokio::test]
async fn mixed_file_only_encrypts_plaintext() {
    let engine = engine();
    let pre = engine.codec().cipher().encrypt("old", "k").unwrap().to_json().unwrap();
    let (_dir, path) = config_file(&format!("OLD={pre}\nNEW=fresh\n"));

    let report = engine.encrypt_file(&path, None, "k").await.unwrap();
    assert_eq!(report.encrypted, vec!["NEW"]);
    assert_eq!(report.already_encrypted, vec!["OLD"]);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(&format!("OLD={pre}\n")));
}

// ---------------------------------------------------------------------------
// Decrypt pass
// ---------------------------------------------------------------------------

#[tokio::test]
async fn decrypt_file_reveals_without_modifying() {
    let (_dir, path) = config_file("USER=alice\nPASS=secret123\n");
    let engine = engine();
    engine
        .encrypt_file(&path, Some(&lookups(&["PASS"])), "k1")
        .await
        .unwrap();
    let encrypted_text = fs::read(&path).unwrap();

    let report = engine.decrypt_file(&path, None, "k1").await.unwrap();
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].key, "USER");
    assert_eq!(report.entries[0].value, "alice");
    assert!(!report.entries[0].was_encrypted);
    assert_eq!(report.entries[1].key, "PASS");
    assert_eq!(report.entries[1].value, "secret123");
    assert!(report.entries[1].was_encrypted);

    assert_eq!(fs::read(&path).unwrap(), encrypted_text);
}

#[tokio::test]
async fn decrypt_file_with_wrong_secret_fails() {
    let (_dir, path) = config_file("PASS=secret123\n");
    let engine = engine();
    engine.encrypt_file(&path, None, "right").await.unwrap();

    let err = engine.decrypt_file(&path, None, "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    assert!(err.to_string().contains("PASS"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_file_fails_with_file_access() {
    let dir = TempDir::new().unwrap();
    let err = engine()
        .encrypt_file(&dir.path().join("missing.env"), None, "k")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileAccess);
}

#[test]
fn params_below_argon2_floor_are_rejected_up_front() {
    // Argon2 needs 8 KiB per lane, so 8 KiB cannot serve two lanes.
    let params = CryptoParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 2,
        ..CryptoParams::default()
    };
    let err = Cipher::new(params).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ---------------------------------------------------------------------------
// Duplicate keys and mixed line endings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_keys_are_all_encrypted() {
    let (_dir, path) = config_file("PASS=one\nPASS=two\n");
    let engine = engine();

    let report = engine.encrypt_file(&path, None, "k").await.unwrap();
    assert_eq!(report.encrypted, vec!["PASS", "PASS"]);

    let text = fs::read_to_string(&path).unwrap();
    let values: Vec<&str> = text
        .lines()
        .map(|l| l.strip_prefix("PASS=").expect("key kept"))
        .collect();
    assert_eq!(values.len(), 2);
    let cipher = engine.codec().cipher();
    assert_eq!(cipher.decrypt(values[0], "k").unwrap(), "one");
    assert_eq!(cipher.decrypt(values[1], "k").unwrap(), "two");

    let revealed = engine.decrypt_file(&path, None, "k").await.unwrap();
    let plain: Vec<&str> = revealed.entries.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(plain, ["one", "two"]);
}

#[tokio::test]
async fn value_lookup_rewrites_its_own_line() {
    let (_dir, path) = config_file("PASS=one\nPASS=two\n");
    let engine = engine();

    let report = engine
        .encrypt_file(&path, Some(&lookups(&["two"])), "k")
        .await
        .unwrap();
    assert_eq!(report.newly_encrypted(), 1);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "PASS=one");
    let second = lines[1].strip_prefix("PASS=").unwrap();
    assert_eq!(engine.codec().cipher().decrypt(second, "k").unwrap(), "two");
}

#[tokio::test]
async fn mixed_line_endings_do_not_leak_into_values() {
    let (_dir, path) = config_file("A=1\nB=2\r\nC=3\n");
    let engine = engine();

    engine
        .encrypt_file(&path, Some(&lookups(&["B"])), "k")
        .await
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("A=1\nB={"));
    assert!(text.ends_with("}\r\nC=3\n"));

    let revealed = engine
        .decrypt_file(&path, Some(&lookups(&["B"])), "k")
        .await
        .unwrap();
    assert_eq!(revealed.entries[0].value, "2");
}
