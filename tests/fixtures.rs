#![allow(dead_code)]
use std::path::PathBuf;

use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

pub const MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
pub const SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
pub const SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}

pub fn short_record() -> String {
    format!("1024:33188:0:0:{MD5}:{SHA1}")
}

pub fn extended_record() -> String {
    format!("2048:33261:1000:100:{MD5}:{SHA1}:alice:users:1520000000:393219")
}

pub fn extended_record_with_sha256() -> String {
    format!("{}:{SHA256}", extended_record())
}

pub fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .canonicalize()
        .unwrap()
}

pub fn messages_sample() -> PathBuf {
    samples_dir().join("messages.log")
}

pub fn malformed_sample() -> PathBuf {
    samples_dir().join("malformed.log")
}
