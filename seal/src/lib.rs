//! Integrity-checked payloads.
//!
//! A sealed payload is `digest || body`: a 32-byte HMAC-SHA256 digest of
//! the body, keyed with a secret both parties agreed on out-of-band,
//! prepended to the body bytes. The receiver recomputes the digest over
//! the received body and compares in constant time before the body is
//! used in any way.
//!
//! ```
//! use seal::{SecretKey, open_raw, sign};
//!
//! let key = SecretKey::generate();
//! let payload = sign(&key, b"hp: [3, 6]").unwrap();
//! assert_eq!(b"hp: [3, 6]".to_vec(), open_raw(&key, &payload).unwrap());
//! ```
//!
//! [`open`] parses the verified body as a textual tree document, which
//! cannot express executable directives. [`open_raw`] returns the raw
//! verified bytes for callers bringing their own body format; those
//! bytes must then be treated as fully trusted, code-equivalent input
//! from the secret-holder.

pub mod error;

use std::fmt;
use std::sync::atomic::{Ordering, compiler_fence};

use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use text::Document;

use error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of the digest prefix.
pub const DIGEST_LEN: usize = 32;

/// Minimum accepted key length in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// A session secret shared by both parties.
///
/// The key is never displayed, logged or serialized; `Debug` is
/// redacted and the material is wiped when the key is dropped.
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Draws a fresh 32-byte key from the OS random number generator.
    pub fn generate() -> SecretKey {
        let mut bytes = vec![0u8; MIN_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        SecretKey { bytes }
    }

    /// Wraps existing key material. Keys shorter than [`MIN_KEY_LEN`]
    /// are rejected; entropy is the caller's responsibility.
    pub fn from_bytes(bytes: &[u8]) -> Result<SecretKey, Error> {
        if bytes.len() < MIN_KEY_LEN {
            return Err(Error::KeyTooShort { len: bytes.len() });
        }
        Ok(SecretKey {
            bytes: bytes.to_vec(),
        })
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(&self.bytes).map_err(|_| Error::InvalidKey)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        // best-effort wipe of the key material
        self.bytes.iter_mut().for_each(|b| *b = 0);
        compiler_fence(Ordering::SeqCst);
    }
}

/// Seals `body` under `key`: returns `digest || body`.
pub fn sign(key: &SecretKey, body: &[u8]) -> Result<Vec<u8>, Error> {
    let mut mac = key.mac()?;
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    let mut payload = Vec::with_capacity(DIGEST_LEN + body.len());
    payload.extend_from_slice(&digest);
    payload.extend_from_slice(body);
    Ok(payload)
}

/// Checks the digest prefix and returns the body slice.
///
/// The received digest is compared to the recomputed one in constant
/// time (`Mac::verify_slice`), so the comparison leaks no information
/// about where a mismatch occurs. This function is the only path to the
/// body bytes: no caller can reach them without verification having
/// succeeded.
pub fn verify<'a>(key: &SecretKey, payload: &'a [u8]) -> Result<&'a [u8], Error> {
    if payload.len() < DIGEST_LEN {
        return Err(Error::Truncated { len: payload.len() });
    }
    let (digest, body) = payload.split_at(DIGEST_LEN);
    let mut mac = key.mac()?;
    mac.update(body);
    mac.verify_slice(digest).map_err(|_| Error::Integrity)?;
    Ok(body)
}

/// Verifies `payload` and parses the body as a document.
///
/// The body format is the restricted textual tree syntax, so a
/// successfully opened payload yields structured data and nothing more.
pub fn open(key: &SecretKey, payload: &[u8]) -> Result<Document, Error> {
    let body = verify(key, payload)?;
    let body = std::str::from_utf8(body)?;
    Ok(text::parse(body)?)
}

/// Verifies `payload` and returns the raw body bytes.
///
/// The caller takes over the capability boundary: a payload that opens
/// successfully is as trusted as code from the secret-holder, and must
/// only be fed to interpreters on that understanding.
pub fn open_raw(key: &SecretKey, payload: &[u8]) -> Result<Vec<u8>, Error> {
    verify(key, payload).map(|body| body.to_vec())
}
