//! RSA key management for envelope signing and verification.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256};

use crate::errors::{TokenError, TokenResult};

/// Manager for the RSA key pair used to sign and verify envelopes.
///
/// Besides the jsonwebtoken key handles, the manager carries the public
/// key's fingerprint, which is written into every minted envelope's header
/// and checked against presented envelopes before any signature work.
#[derive(Clone)]
pub struct RsaKeyManager {
    /// Private key for signing envelopes
    encoding_key: EncodingKey,
    /// Public key for verifying envelope signatures
    decoding_key: DecodingKey,
    /// Fingerprint of the public key, in `ssh-keygen -l` form
    fingerprint: String,
}

impl std::fmt::Debug for RsaKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyManager")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl RsaKeyManager {
    /// Creates a key manager from PEM key files.
    ///
    /// # Arguments
    ///
    /// * `private_key_path` - Path to the PEM-encoded private key file
    /// * `public_key_path` - Path to the PEM-encoded public key file
    pub fn new<P: AsRef<Path>>(private_key_path: P, public_key_path: P) -> TokenResult<Self> {
        let private_key_pem = fs::read_to_string(private_key_path.as_ref()).map_err(|err| {
            TokenError::key(format!("failed to read private key: {err}"))
        })?;
        let public_key_pem = fs::read_to_string(public_key_path.as_ref()).map_err(|err| {
            TokenError::key(format!("failed to read public key: {err}"))
        })?;
        Self::from_pem_strings(&private_key_pem, &public_key_pem)
    }

    /// Creates a key manager from PEM strings.
    pub fn from_pem_strings(private_key_pem: &str, public_key_pem: &str) -> TokenResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|err| TokenError::key(format!("invalid private key: {err}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|err| TokenError::key(format!("invalid public key: {err}")))?;
        let fingerprint = ssh_fingerprint(public_key_pem)?;

        Ok(Self {
            encoding_key,
            decoding_key,
            fingerprint,
        })
    }

    /// Returns the signing key.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the verification key.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns the public key fingerprint, e.g. `SHA256:gLWx…`.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Computes the SHA-256 fingerprint of the SSH wire encoding of an RSA
/// public key, rendered the way `ssh-keygen -l` prints it. The format is
/// stable across binaries, so envelopes minted by one deployment verify
/// under another holding the same key.
fn ssh_fingerprint(public_key_pem: &str) -> TokenResult<String> {
    let key = RsaPublicKey::from_public_key_pem(public_key_pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_key_pem))
        .map_err(|err| TokenError::key(format!("cannot fingerprint public key: {err}")))?;

    let mut wire = Vec::new();
    write_ssh_string(&mut wire, b"ssh-rsa");
    write_ssh_mpint(&mut wire, &key.e().to_bytes_be());
    write_ssh_mpint(&mut wire, &key.n().to_bytes_be());

    let digest = Sha256::digest(&wire);
    Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
}

fn write_ssh_string(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// SSH mpints are big-endian two's complement: leading zeros stripped, a
/// zero byte prepended when the high bit is set.
fn write_ssh_mpint(buf: &mut Vec<u8>, bytes: &[u8]) {
    let mut start = 0;
    while start < bytes.len() && bytes[start] == 0 {
        start += 1;
    }
    let body = &bytes[start..];
    let pad = !body.is_empty() && body[0] & 0x80 != 0;

    let len = body.len() + usize::from(pad);
    buf.extend_from_slice(&(len as u32).to_be_bytes());
    if pad {
        buf.push(0);
    }
    buf.extend_from_slice(body);
}
