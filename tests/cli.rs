use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("aesnest"));
    cmd.env_remove("AESNEST_KEYSTORE")
        .env_remove("AESNEST_PASSPHRASE")
        .env_remove("RUST_LOG");
    cmd
}

fn keygen(base: &Path, size: &str) {
    bin()
        .arg("keygen")
        .arg("--size")
        .arg(size)
        .arg(base)
        .assert()
        .success()
        .stdout(predicate::str::contains("key store written"));
}

fn derive(salt: &str) -> String {
    let out = bin()
        .env("AESNEST_PASSPHRASE", "correct horse")
        .arg("derive")
        .arg("--salt")
        .arg(salt)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).unwrap().trim().to_string()
}

#[test]
fn keygen_writes_three_line_keystore() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("test");

    keygen(&base, "192");

    let text = fs::read_to_string(dir.path().join("test.keystore")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].split_whitespace().count(), 24);
    assert_eq!(lines[1], "192");
    assert_eq!(lines[2].split_whitespace().count(), 16);
}

#[test]
fn keygen_rejects_invalid_size() {
    let dir = tempdir().unwrap();

    bin()
        .arg("keygen")
        .arg("--size")
        .arg("64")
        .arg(dir.path().join("bad"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid AES key size"));

    assert!(!dir.path().join("bad.keystore").exists());
}

#[test]
fn encrypt_and_decrypt_file_roundtrip() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("k");
    keygen(&base, "256");
    let keystore = dir.path().join("k.keystore");

    let file = dir.path().join("secret.txt");
    fs::write(&file, "top secret contents").unwrap();

    bin()
        .arg("--keystore")
        .arg(&keystore)
        .arg("encrypt")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("secret.txt.enc"));

    fs::remove_file(&file).unwrap();

    bin()
        .env("AESNEST_KEYSTORE", &keystore)
        .arg("decrypt")
        .arg(dir.path().join("secret.txt.enc"))
        .assert()
        .success()
        .stdout(predicate::str::contains("decrypted to"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "top secret contents");
}

#[test]
fn decrypt_with_other_key_fails() {
    let dir = tempdir().unwrap();
    keygen(&dir.path().join("a"), "128");
    keygen(&dir.path().join("b"), "128");

    let file = dir.path().join("data.bin");
    fs::write(&file, [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]).unwrap();

    bin()
        .arg("--keystore")
        .arg(dir.path().join("a.keystore"))
        .arg("encrypt")
        .arg(&file)
        .assert()
        .success();

    // a wrong key either fails the padding check or yields different bytes
    let result = bin()
        .arg("--keystore")
        .arg(dir.path().join("b.keystore"))
        .arg("decrypt")
        .arg(dir.path().join("data.bin.enc"))
        .assert();

    if result.get_output().status.success() {
        assert_ne!(
            fs::read(&file).unwrap(),
            vec![0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]
        );
    } else {
        result.stderr(predicate::str::contains("failed to decrypt"));
    }
}

#[test]
fn encrypt_missing_file_fails() {
    let dir = tempdir().unwrap();
    keygen(&dir.path().join("k"), "256");

    bin()
        .arg("--keystore")
        .arg(dir.path().join("k.keystore"))
        .arg("encrypt")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn missing_keystore_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("x.txt");
    fs::write(&file, "x").unwrap();

    bin()
        .arg("--keystore")
        .arg(dir.path().join("nope.keystore"))
        .arg("encrypt")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open key store"));
}

#[test]
fn corrupt_keystore_reports_error_log() {
    let dir = tempdir().unwrap();
    let keystore = dir.path().join("bad.keystore");
    fs::write(&keystore, "1 2 3 \n256\n").unwrap();
    let file = dir.path().join("x.txt");
    fs::write(&file, "x").unwrap();

    bin()
        .arg("--keystore")
        .arg(&keystore)
        .arg("encrypt")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error log"));

    let logs = fs::read_dir(dir.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with("error log(")
        })
        .count();
    assert_eq!(logs, 1);
}

#[test]
fn hash_prints_uppercase_hex() {
    bin()
        .arg("hash")
        .arg("abc")
        .assert()
        .success()
        .stdout("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD\n");

    bin()
        .arg("hash")
        .arg("--function")
        .arg("md5")
        .arg("abc")
        .assert()
        .success()
        .stdout("900150983CD24FB0D6963F7D28E17F72\n");
}

#[test]
fn hash_rejects_unknown_function_and_blank_input() {
    bin()
        .arg("hash")
        .arg("-f")
        .arg("whirlpool")
        .arg("abc")
        .assert()
        .failure();

    bin()
        .arg("hash")
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn derive_is_deterministic_and_salt_sensitive() {
    let a = derive("01020304");
    let b = derive("01020304");
    let c = derive("01020305");

    assert_eq!(a.len(), 64);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn derive_reads_passphrase_from_stdin() {
    let from_env = derive("0a0b");

    bin()
        .arg("derive")
        .arg("--salt")
        .arg("0a0b")
        .write_stdin("correct horse\n")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{from_env}\n")));
}

#[test]
fn derive_with_argon2() {
    bin()
        .env("AESNEST_PASSPHRASE", "pw")
        .arg("derive")
        .arg("--salt")
        .arg("00112233445566778899aabbccddeeff")
        .arg("--argon2")
        .arg("--argon-mem")
        .arg("1024")
        .arg("--argon-time")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::is_match("^[0-9A-F]{64}\n$").unwrap());
}

#[test]
fn derive_rejects_bad_salt() {
    bin()
        .env("AESNEST_PASSPHRASE", "pw")
        .arg("derive")
        .arg("--salt")
        .arg("zz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("salt must be hex"));
}

#[test]
fn random_with_seed_repeats() {
    let run = || {
        bin()
            .arg("random")
            .arg("--min")
            .arg("10")
            .arg("--max")
            .arg("20")
            .arg("--seed")
            .arg("42")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    let a = run();
    assert_eq!(a, run());

    let n: i32 = String::from_utf8(a).unwrap().trim().parse().unwrap();
    assert!((10..20).contains(&n));
}

#[test]
fn info_shows_key_size() {
    let dir = tempdir().unwrap();
    keygen(&dir.path().join("info"), "128");

    bin()
        .arg("--keystore")
        .arg(dir.path().join("info.keystore"))
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("info.keystore"))
        .stdout(predicate::str::contains("128 bits"));
}
