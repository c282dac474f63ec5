//! OpenSSL "salted" AES-256-CBC envelopes, as written by CryptoJS with a passphrase.
//!
//! Layout: `"Salted__" || salt[8] || ciphertext`, key and IV derived with
//! `EVP_BytesToKey(MD5, passphrase, salt)`, PKCS#7 padding. On disk the blob is
//! base64 encoded; the web front-end base64-encodes the CryptoJS base64 string
//! once more, so both one and two layers are accepted.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};
use rand::RngCore;

use crate::error::VaultError;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// `EVP_BytesToKey` with MD5 and a single iteration.
fn derive_key_iv(passphrase: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut material = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut block: Vec<u8> = Vec::new();
    while material.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        material.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

fn decode_base64(text: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact).ok()
}

/// Peel base64 layers until the salted header shows up.
pub fn unwrap_envelope(stored: &str) -> Result<Vec<u8>, VaultError> {
    let not_salted = || VaultError::DecryptionFailed("payload is not a salted OpenSSL envelope".into());

    let first = decode_base64(stored.as_bytes()).ok_or_else(not_salted)?;
    if first.starts_with(MAGIC) {
        return Ok(first);
    }

    let second = decode_base64(&first).ok_or_else(not_salted)?;
    if second.starts_with(MAGIC) {
        return Ok(second);
    }

    Err(not_salted())
}

/// Decrypt a raw salted blob.
pub fn decrypt_salted(blob: &[u8], passphrase: &str) -> Result<Vec<u8>, VaultError> {
    if blob.len() <= MAGIC.len() + SALT_LEN || !blob.starts_with(MAGIC) {
        return Err(VaultError::DecryptionFailed("salted envelope is truncated".into()));
    }

    let salt = &blob[MAGIC.len()..MAGIC.len() + SALT_LEN];
    let ciphertext = &blob[MAGIC.len() + SALT_LEN..];
    let (key, iv) = derive_key_iv(passphrase.as_bytes(), salt);

    Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|e| VaultError::DecryptionFailed(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| VaultError::DecryptionFailed("bad padding (wrong MASTER_KEY?)".into()))
}

/// Decrypt stored file contents to UTF-8 text.
pub fn decrypt_text(stored: &str, passphrase: &str) -> Result<String, VaultError> {
    let blob = unwrap_envelope(stored)?;
    let plaintext = decrypt_salted(&blob, passphrase)?;

    let text = String::from_utf8(plaintext).map_err(|_| {
        VaultError::DecryptionFailed("plaintext is not UTF-8 (wrong MASTER_KEY?)".into())
    })?;

    if text.trim().is_empty() {
        return Err(VaultError::DecryptionFailed("plaintext is empty".into()));
    }

    Ok(text)
}

/// Encrypt `plaintext` into the front-end's storage form (two base64 layers).
pub fn seal(plaintext: &str, passphrase: &str) -> Result<String, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    seal_with_salt(plaintext, passphrase, salt)
}

fn seal_with_salt(plaintext: &str, passphrase: &str, salt: [u8; SALT_LEN]) -> Result<String, VaultError> {
    let (key, iv) = derive_key_iv(passphrase.as_bytes(), &salt);
    let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|e| VaultError::DecryptionFailed(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut blob = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len());
    blob.extend_from_slice(MAGIC);
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&ciphertext);

    let inner = STANDARD.encode(blob);
    Ok(STANDARD.encode(inner))
}
