//! Notebook trust: the Jupyter signature check.
//!
//! Jupyter signs a notebook with an HMAC-SHA256 over every key and value of the document, keys visited in sorted
//! order, with `metadata.signature` left out. A notebook is trusted when that digest is recorded in Jupyter's
//! signature store (`nbsignatures.db`), or in the document itself as `metadata.signature = "sha256:<hex>"`.
//!
//! ## Notes
//!
//! - The secret (`notebook_secret`) and the store live in the Jupyter data directory (`$JUPYTER_DATA_DIR`, else
//!   `<platform data dir>/jupyter`).
//! - The store is opened read-only; Jupyter's `last_seen` bookkeeping is left to Jupyter.
//! - A missing secret, an unreadable store or an unknown digest means untrusted. Trust is informational and never
//!   affects execution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use hmac::{Hmac, Mac};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use sha2::Sha256;

/// Environment variable that overrides the Jupyter data directory.
pub const JUPYTER_DATA_DIR_ENV: &str = "JUPYTER_DATA_DIR";

const SECRET_FILE: &str = "notebook_secret";
const SIGNATURE_DB_FILE: &str = "nbsignatures.db";
const SIGNATURE_SCHEME: &str = "sha256";
const SIGNATURE_LOOKUP: &str = "SELECT 1 FROM nbsignatures WHERE algorithm = ?1 AND signature = ?2";

type HmacSha256 = Hmac<Sha256>;

/// Decide whether a notebook document is trusted.
pub trait Notary {
    fn check_signature(&self, raw: &serde_json::Value) -> bool;
}

/// HMAC-SHA256 notary compatible with Jupyter's.
#[derive(Debug, Clone, Default)]
pub struct HmacNotary {
    secret: Option<Vec<u8>>,
    /// Jupyter's signature database, when one is known.
    store: Option<PathBuf>,
}

impl HmacNotary {
    /// A notary with a fixed secret and no signature store.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Some(secret.into()),
            store: None,
        }
    }

    /// Also accept digests recorded in the signature database at `path`.
    pub fn with_signature_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.store = Some(path.into());
        self
    }

    /// A notary using the local Jupyter secret and signature store. Without a readable secret every notebook is
    /// untrusted.
    pub fn from_environment() -> Self {
        let Some(dir) = jupyter_data_dir() else {
            tracing::debug!("no Jupyter data directory, notebooks will be untrusted");
            return Self::default();
        };
        let path = dir.join(SECRET_FILE);
        match fs::read(&path) {
            Ok(secret) => Self::with_secret(secret).with_signature_store(dir.join(SIGNATURE_DB_FILE)),
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "no notebook secret, notebooks will be untrusted");
                Self::default()
            }
        }
    }

    /// Hex HMAC digest of `raw`, the form Jupyter's signature store records, or `None` without a secret.
    pub fn compute_digest(&self, raw: &serde_json::Value) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_deref()?).ok()?;
        let mut message = Vec::new();
        signed_bytes(raw, &mut message, true);
        mac.update(&message);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Signature of `raw` as stored in `metadata.signature`, or `None` without a secret.
    pub fn compute_signature(&self, raw: &serde_json::Value) -> Option<String> {
        self.compute_digest(raw).map(|digest| format!("{SIGNATURE_SCHEME}:{digest}"))
    }

    fn is_stored(&self, digest: &str) -> bool {
        let Some(path) = self.store.as_deref().filter(|path| path.is_file()) else {
            return false;
        };
        let lookup = || -> rusqlite::Result<bool> {
            let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
            let row = connection
                .query_row(SIGNATURE_LOOKUP, params![SIGNATURE_SCHEME, digest], |_| Ok(()))
                .optional()?;
            Ok(row.is_some())
        };
        lookup().unwrap_or_else(|error| {
            tracing::debug!(path = %path.display(), %error, "signature store unreadable");
            false
        })
    }
}

impl Notary for HmacNotary {
    fn check_signature(&self, raw: &serde_json::Value) -> bool {
        let Some(digest) = self.compute_digest(raw) else {
            return false;
        };
        let recorded = raw
            .get("metadata")
            .and_then(|metadata| metadata.get("signature"))
            .and_then(serde_json::Value::as_str);
        if recorded == Some(format!("{SIGNATURE_SCHEME}:{digest}").as_str()) {
            return true;
        }
        self.is_stored(&digest)
    }
}

/// `notebook_secret` in the Jupyter data directory.
pub fn secret_path() -> Option<PathBuf> {
    jupyter_data_dir().map(|dir| dir.join(SECRET_FILE))
}

fn jupyter_data_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os(JUPYTER_DATA_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    directories::BaseDirs::new().map(|dirs| Path::new(dirs.data_dir()).join("jupyter"))
}

/// Append the signed byte stream of `value`: object keys in sorted order each followed by their value, array
/// elements in order, strings as UTF-8 and other scalars as their Python `str()`.
fn signed_bytes(value: &serde_json::Value, out: &mut Vec<u8>, top_level: bool) {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                out.extend_from_slice(key.as_bytes());
                let child = &map[key.as_str()];
                if top_level && key == "metadata" {
                    signed_metadata(child, out);
                } else {
                    signed_bytes(child, out, false);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                signed_bytes(item, out, false);
            }
        }
        serde_json::Value::String(text) => out.extend_from_slice(text.as_bytes()),
        serde_json::Value::Null => out.extend_from_slice(b"None"),
        serde_json::Value::Bool(true) => out.extend_from_slice(b"True"),
        serde_json::Value::Bool(false) => out.extend_from_slice(b"False"),
        serde_json::Value::Number(number) => {
            let text = match number.as_f64() {
                Some(x) if number.is_f64() => testmynb_core::py_float_repr(x),
                _ => number.to_string(),
            };
            out.extend_from_slice(text.as_bytes());
        }
    }
}

/// Top-level metadata without its `signature` entry.
fn signed_metadata(metadata: &serde_json::Value, out: &mut Vec<u8>) {
    match metadata {
        serde_json::Value::Object(map) => {
            let mut stripped = map.clone();
            stripped.remove("signature");
            signed_bytes(&serde_json::Value::Object(stripped), out, false);
        }
        other => signed_bytes(other, out, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Digest of a bare JSON string, whose signed bytes are the string itself.
    fn digest(key: &[u8], message: &str) -> String {
        HmacNotary::with_secret(key)
            .compute_digest(&json!(message))
            .unwrap()
    }

    #[test]
    fn test_hmac_matches_rfc_4231_case_2() {
        assert_eq!(
            digest(b"Jefe", "what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_long_keys_are_hashed_first() {
        assert_eq!(
            digest(&[0xaau8; 131], "Test Using Larger Than Block-Size Key - Hash Key First"),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    /// A signature store with Jupyter's schema holding `digests`.
    fn signature_store(dir: &Path, digests: &[&str]) -> PathBuf {
        let path = dir.join(SIGNATURE_DB_FILE);
        let connection = Connection::open(&path).unwrap();
        connection
            .execute_batch(
                "CREATE TABLE nbsignatures (
                    id integer PRIMARY KEY AUTOINCREMENT,
                    algorithm text,
                    signature text,
                    path text,
                    last_seen timestamp
                );",
            )
            .unwrap();
        for digest in digests {
            connection
                .execute(
                    "INSERT INTO nbsignatures (algorithm, signature, path, last_seen) VALUES (?1, ?2, NULL, 0)",
                    params![SIGNATURE_SCHEME, digest],
                )
                .unwrap();
        }
        path
    }

    #[test]
    fn test_digest_in_signature_store_is_trusted() {
        let dir = tempfile::tempdir().unwrap();
        let mut notebook = json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {},
            "cells": [{"cell_type": "code", "source": "%%testcell a\nassert True"}]
        });
        let signer = HmacNotary::with_secret("s3cret");
        let recorded = signer.compute_digest(&notebook).unwrap();
        let store = signature_store(dir.path(), &[recorded.as_str()]);

        assert!(!signer.check_signature(&notebook));
        let notary = HmacNotary::with_secret("s3cret").with_signature_store(&store);
        assert!(notary.check_signature(&notebook));

        notebook["cells"][0]["source"] = json!("%%testcell a\nassert False");
        assert!(!notary.check_signature(&notebook));
    }

    #[test]
    fn test_missing_or_foreign_store_is_untrusted() {
        let dir = tempfile::tempdir().unwrap();
        let notebook = json!({"metadata": {}, "cells": []});

        let missing = HmacNotary::with_secret("s3cret").with_signature_store(dir.path().join("absent.db"));
        assert!(!missing.check_signature(&notebook));

        let garbage = dir.path().join("garbage.db");
        fs::write(&garbage, "not a database").unwrap();
        let unreadable = HmacNotary::with_secret("s3cret").with_signature_store(&garbage);
        assert!(!unreadable.check_signature(&notebook));

        let other_secret = HmacNotary::with_secret("other").compute_digest(&notebook).unwrap();
        let store = signature_store(dir.path(), &[other_secret.as_str()]);
        assert!(!HmacNotary::with_secret("s3cret").with_signature_store(store).check_signature(&notebook));
    }

    #[test]
    fn test_signed_notebook_is_trusted() {
        let notary = HmacNotary::with_secret("s3cret");
        let mut notebook = json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"kernelspec": {"name": "python3"}},
            "cells": [{"cell_type": "code", "source": "%%testcell a\nassert True", "execution_count": null}]
        });
        assert!(!notary.check_signature(&notebook));

        let signature = notary.compute_signature(&notebook).unwrap();
        assert!(signature.starts_with("sha256:"));
        notebook["metadata"]["signature"] = json!(signature);
        assert!(notary.check_signature(&notebook));

        notebook["cells"][0]["source"] = json!("%%testcell a\nassert False");
        assert!(!notary.check_signature(&notebook));
    }

    #[test]
    fn test_signature_ignores_key_order() {
        let notary = HmacNotary::with_secret("key");
        let a = json!({"b": 1, "a": [true, null, 2.5]});
        let b = json!({"a": [true, null, 2.5], "b": 1});
        assert_eq!(notary.compute_signature(&a), notary.compute_signature(&b));
    }

    #[test]
    fn test_without_secret_nothing_is_trusted() {
        let notebook = json!({"metadata": {"signature": "sha256:00"}});
        assert!(!HmacNotary::default().check_signature(&notebook));
        assert_eq!(HmacNotary::default().compute_signature(&notebook), None);
    }
}
