use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
/// File signature and format version, authenticated as associated data.
const MAGIC: &[u8; 5] = b"CTRK\x01";
/// magic || m_cost || t_cost || p_cost (little-endian u32 each)
const HEADER_LEN: usize = MAGIC.len() + 12;
/// Refuse to allocate more than 1 GiB for a key read from a file header.
const MAX_MEMORY_KIB: u32 = 1 << 20;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("decryption failed: wrong passphrase or corrupted data")]
    Decryption,
    #[error("invalid data format")]
    InvalidFormat,
}

/// Argon2id cost settings. They are written into every sealed blob, so a file
/// can always be opened regardless of the current defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Cheap settings for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..MAGIC.len()].copy_from_slice(MAGIC);
        let fields = [self.memory_kib, self.iterations, self.parallelism];
        for (i, v) in fields.iter().enumerate() {
            let at = MAGIC.len() + i * 4;
            out[at..at + 4].copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    fn from_header(header: &[u8]) -> Result<Self, CryptoError> {
        if header.len() != HEADER_LEN || &header[..MAGIC.len()] != MAGIC {
            return Err(CryptoError::InvalidFormat);
        }
        let field = |i: usize| {
            let at = MAGIC.len() + i * 4;
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&header[at..at + 4]);
            u32::from_le_bytes(buf)
        };
        let params = Self {
            memory_kib: field(0),
            iterations: field(1),
            parallelism: field(2),
        };
        if params.memory_kib > MAX_MEMORY_KIB {
            return Err(CryptoError::InvalidFormat);
        }
        Ok(params)
    }
}

/// Derive a 256-bit key from a passphrase and salt using Argon2id.
fn derive_key(
    passphrase: &str,
    salt: &[u8],
    kdf: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(KEY_LEN))
        .map_err(|_| CryptoError::KeyDerivation)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|_| CryptoError::KeyDerivation)?;
    Ok(key)
}

/// Seal `plaintext` with a passphrase.
/// Layout: header || salt (32) || nonce (12) || ciphertext
pub fn seal(passphrase: &str, plaintext: &[u8], kdf: &KdfParams) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce_bytes);

    let header = kdf.header();
    let key = derive_key(passphrase, &salt, kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::Encryption)?;

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &header,
            },
        )
        .map_err(|_| CryptoError::Encryption)?;

    let mut output = Vec::with_capacity(HEADER_LEN + SALT_LEN + NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&header);
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Open a blob produced by [`seal`]. The returned buffer is wiped on drop.
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < HEADER_LEN + SALT_LEN + NONCE_LEN {
        return Err(CryptoError::InvalidFormat);
    }

    let (header, rest) = sealed.split_at(HEADER_LEN);
    let (salt, rest) = rest.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let kdf = KdfParams::from_header(header)?;
    let key = derive_key(passphrase, salt, &kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::Decryption)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open() {
        let kdf = KdfParams::insecure_fast();
        let sealed = seal("test-passphrase-123", b"hello tracker", &kdf).unwrap();
        let opened = open("test-passphrase-123", &sealed).unwrap();
        assert_eq!(opened.as_slice(), b"hello tracker");
    }

    #[test]
    fn wrong_passphrase_fails() {
        let sealed = seal("correct", b"secret", &KdfParams::insecure_fast()).unwrap();
        assert!(matches!(open("wrong", &sealed), Err(CryptoError::Decryption)));
    }

    #[test]
    fn truncated_data_fails() {
        assert!(matches!(open("any", &[0u8; 10]), Err(CryptoError::InvalidFormat)));
    }

    #[test]
    fn foreign_header_is_rejected() {
        let mut sealed = seal("pass", b"data", &KdfParams::insecure_fast()).unwrap();
        sealed[0] = b'X';
        assert!(matches!(open("pass", &sealed), Err(CryptoError::InvalidFormat)));
    }

    #[test]
    fn tampered_cost_fails_authentication() {
        let mut sealed = seal("pass", b"data", &KdfParams::insecure_fast()).unwrap();
        // bump the iteration count; the header is bound as associated data
        sealed[MAGIC.len() + 4] = 2;
        assert!(matches!(open("pass", &sealed), Err(CryptoError::Decryption)));
    }

    #[test]
    fn header_round_trips_params() {
        let kdf = KdfParams::default();
        assert_eq!(KdfParams::from_header(&kdf.header()).unwrap(), kdf);
    }
}
