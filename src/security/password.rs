use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;

/// PBKDF2 iteration count. Every stored credential was derived with this
/// value, so changing it invalidates existing hashes.
const KDF_ITERATIONS: u32 = 1000;
/// Derived key length in bytes, before hex encoding.
const KDF_OUTPUT_LEN: usize = 64;
/// Random salt length in bytes, before hex encoding.
const SALT_LEN: usize = 16;

/// Derive the stored hash for `plaintext` under `salt`.
///
/// The salt string's literal ASCII bytes feed the KDF; stored salts are hex
/// strings and are never decoded back to raw bytes.
pub fn hash_password(plaintext: &str, salt: &str) -> String {
    let mut derived = [0u8; KDF_OUTPUT_LEN];
    pbkdf2_hmac::<Sha512>(
        plaintext.as_bytes(),
        salt.as_bytes(),
        KDF_ITERATIONS,
        &mut derived,
    );
    hex::encode(derived)
}

/// Generate a fresh salt and the matching hash for a new credential.
/// Returns `(salt, hash)`, both hex strings.
pub fn new_credential(plaintext: &str) -> (String, String) {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);
    let hash = hash_password(plaintext, &salt);
    (salt, hash)
}

/// Check `candidate` against a stored salt/hash pair.
pub fn verify_password(candidate: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(candidate, salt) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_password("hunter42pass", "00112233445566778899aabbccddeeff");
        let b = hash_password("hunter42pass", "00112233445566778899aabbccddeeff");
        assert_eq!(a, b);
        // 64 bytes hex-encoded
        assert_eq!(a.len(), 128);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_changes_hash() {
        let a = hash_password("hunter42pass", "aaaa");
        let b = hash_password("hunter42pass", "bbbb");
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_credential_and_verify() {
        let (salt, hash) = new_credential("secret99word");
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert!(verify_password("secret99word", &salt, &hash));
        assert!(!verify_password("secret99wore", &salt, &hash));
    }

    #[test]
    fn test_fresh_credentials_do_not_collide() {
        let (salt_a, hash_a) = new_credential("samepassword1");
        let (salt_b, hash_b) = new_credential("samepassword1");
        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }
}
