//! Argon2id password hashing and the entropy check registration runs
//! before anything is hashed.

use std::collections::BTreeSet;
#[cfg(test)]
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand_core::OsRng;
use tracing::{error, warn};

use crate::error::ApiError;

/// Fixed salt for the decoy hash that unknown usernames are checked against.
const DUMMY_SALT: &str = "aGFpa3VodWItZGVjb3khIQ";
const DUMMY_PASSWORD: &str = "haikuhub-no-such-author";

/// Salted Argon2id hasher. `Default` uses the argon2 crate defaults
/// (19 MiB memory, 2 iterations, 1 lane).
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::from_argon2(Argon2::default())
    }
}

impl Hasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, ApiError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| ApiError::HashingFailure(format!("invalid Argon2 parameters: {e}")))?;

        Ok(Self::from_argon2(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        let dummy_hash = decoy_hash(&argon2).unwrap_or_else(|e| {
            error!("Failed to build decoy password hash: {}", e);
            String::new()
        });

        Self {
            argon2,
            dummy_hash,
            #[cfg(test)]
            verifications: Arc::default(),
        }
    }

    /// Returns the PHC-encoded hash, salt and parameters included.
    pub fn hash(&self, plaintext: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| ApiError::HashingFailure(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Constant-time verification. A corrupt or foreign hash is a mismatch.
    pub fn verify(&self, plaintext: &str, encoded: &str) -> bool {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let parsed = match PasswordHash::new(encoded) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spends the same Argon2 work as a real verification when there is no
    /// stored hash to check, so a missing author costs as much as a wrong
    /// password.
    pub fn verify_decoy(&self, plaintext: &str) {
        self.verify(plaintext, &self.dummy_hash);
    }

    #[cfg(test)]
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

fn decoy_hash(argon2: &Argon2<'_>) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::from_b64(DUMMY_SALT)?;
    Ok(argon2.hash_password(DUMMY_PASSWORD.as_bytes(), &salt)?.to_string())
}

// -- Entropy --

const REPLACE_CHARS: &str = "!@$&*";
const SEP_CHARS: &str = "_-., ";
const OTHER_SPECIAL_CHARS: &str = "\"#%'()+/:;<=>?[\\]^{|}~";
const LOWER_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGIT_CHARS: &str = "0123456789";

const SEQUENCES: &[&str] = &[
    DIGIT_CHARS,
    LOWER_CHARS,
    "qwertyuiop",
    "asdfghjkl",
    "zxcvbnm",
];

/// Estimated entropy in bits: effective length × log2(character pool size).
pub fn entropy(password: &str) -> f64 {
    let base = pool_size(password);
    if base == 0 {
        return 0.0;
    }
    effective_length(password) as f64 * (base as f64).log2()
}

pub fn check_strength(password: &str, min_bits: f64) -> Result<(), ApiError> {
    if entropy(password) < min_bits {
        return Err(ApiError::WeakCredential(
            "insecure password, try including more special characters, using uppercase letters, \
             using numbers or using a longer password"
                .to_string(),
        ));
    }
    Ok(())
}

fn pool_size(password: &str) -> usize {
    let pools = [
        REPLACE_CHARS,
        SEP_CHARS,
        OTHER_SPECIAL_CHARS,
        LOWER_CHARS,
        UPPER_CHARS,
        DIGIT_CHARS,
    ];
    let mut present = [false; 6];
    let mut others = BTreeSet::new();

    for c in password.chars() {
        match pools.iter().position(|pool| pool.contains(c)) {
            Some(idx) => present[idx] = true,
            None => {
                others.insert(c);
            }
        }
    }

    pools
        .iter()
        .zip(present)
        .filter(|(_, hit)| *hit)
        .map(|(pool, _)| pool.chars().count())
        .sum::<usize>()
        + others.len()
}

/// Length once runs longer than two (repeats like `aaaa`, or sequences like
/// `1234` and `qwerty`) are cut down to two characters.
fn effective_length(password: &str) -> usize {
    let chars: Vec<char> = password.chars().collect();

    (0..chars.len())
        .filter(|&i| i < 2 || !extends_run(chars[i - 2], chars[i - 1], chars[i]))
        .count()
}

fn extends_run(a: char, b: char, c: char) -> bool {
    if a == b && b == c {
        return true;
    }

    let (a, b, c) = (
        a.to_ascii_lowercase(),
        b.to_ascii_lowercase(),
        c.to_ascii_lowercase(),
    );
    SEQUENCES.iter().any(|seq| {
        let pos = |ch: char| seq.find(ch);
        match (pos(a), pos(b), pos(c)) {
            (Some(x), Some(y), Some(z)) => y == x + 1 && z == y + 1,
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Hasher {
        Hasher::new(256, 1, 1).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash("Str0ng!Passw0rd#2024").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Str0ng!Passw0rd#2024", &hash));
        assert!(!hasher.verify("Str0ng!Passw0rd#2025", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = cheap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn verification_uses_stored_parameters() {
        let hash = cheap().hash("password").unwrap();
        assert!(Hasher::default().verify("password", &hash));
    }

    #[test]
    fn corrupt_hash_fails_closed() {
        let hasher = cheap();
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("anything", "$argon2id$v=19$m=256,t=1,p=1$garbage"));
    }

    #[test]
    fn decoy_hash_uses_configured_parameters() {
        let hasher = cheap();
        assert!(hasher.dummy_hash.starts_with("$argon2id$v=19$m=256,t=1,p=1$"));
        assert!(hasher.verify(DUMMY_PASSWORD, &hasher.dummy_hash));

        hasher.verify_decoy("anything");
        assert_eq!(hasher.verifications(), 2);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(Hasher::new(0, 0, 0).is_err());
    }

    #[test]
    fn pool_counts_each_class_once() {
        assert_eq!(pool_size("abc"), 26);
        assert_eq!(pool_size("aB3"), 62);
        assert_eq!(pool_size("a!#"), 26 + 5 + 22);
        assert_eq!(pool_size("é"), 1);
        assert_eq!(pool_size(""), 0);
    }

    #[test]
    fn runs_are_collapsed() {
        assert_eq!(effective_length("aaaaaa"), 2);
        assert_eq!(effective_length("123456"), 2);
        assert_eq!(effective_length("QWERTY"), 2);
        assert_eq!(effective_length("abab"), 4);
        assert_eq!(effective_length("a1b2"), 4);
    }

    #[test]
    fn strength_threshold() {
        assert!(check_strength("Str0ng!Passw0rd#2024", 60.0).is_ok());
        assert!(matches!(
            check_strength("password", 60.0),
            Err(ApiError::WeakCredential(_))
        ));
        assert!(check_strength("aaaaaaaaaaaaaaaaaaaaaaaa", 60.0).is_err());
        assert!(check_strength("", 60.0).is_err());
    }
}
