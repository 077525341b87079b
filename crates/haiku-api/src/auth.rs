use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{debug, error};

use haiku_db::Database;
use haiku_types::models::Author;

use crate::convert::author_from_row;
use crate::error::ApiError;
use crate::password::Hasher;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub hasher: Hasher,
    pub registration: RegistrationPolicy,
}

#[derive(Debug, Clone)]
pub struct RegistrationPolicy {
    pub min_password_entropy: f64,
    pub require_email: bool,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            min_password_entropy: 60.0,
            require_email: true,
        }
    }
}

/// Outcome of checking a credential header. Anything other than
/// `Authenticated` must be treated as unauthorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Authenticated(Author),
    Unauthenticated,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Decodes `[scheme ]base64(username:password)`. The password may itself
/// contain colons; the username may not.
pub fn decode_credentials(header: &str) -> Result<Credentials, ApiError> {
    let header = header.trim();
    let encoded = match header.split_once(' ') {
        Some((_scheme, rest)) => rest.trim(),
        None => header,
    };

    let decoded = B64
        .decode(encoded)
        .map_err(|_| ApiError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| ApiError::MalformedCredentials)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(ApiError::MalformedCredentials)?;

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Checks a credential header against the stored hash. Blocking: looks up
/// the author and runs Argon2 verification.
///
/// Unknown user, wrong password, unreadable hash and store failures all
/// come back as `Unauthenticated`; only a structurally invalid header is an
/// error. Every path that reaches the store runs one Argon2 verification.
pub fn authenticate(db: &Database, hasher: &Hasher, header: &str) -> Result<Authentication, ApiError> {
    let credentials = decode_credentials(header)?;

    let row = match db.get_author_by_username(&credentials.username) {
        Ok(Some(row)) => row,
        Ok(None) => {
            hasher.verify_decoy(&credentials.password);
            debug!("Authentication failed for '{}'", credentials.username);
            return Ok(Authentication::Unauthenticated);
        }
        Err(e) => {
            hasher.verify_decoy(&credentials.password);
            error!("Author lookup failed during authentication: {}", e);
            return Ok(Authentication::Unauthenticated);
        }
    };

    if !hasher.verify(&credentials.password, &row.password_hash) {
        debug!("Authentication failed for '{}'", credentials.username);
        return Ok(Authentication::Unauthenticated);
    }

    Ok(Authentication::Authenticated(author_from_row(row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", B64.encode(raw))
    }

    fn setup() -> (Database, Hasher) {
        let db = Database::open_in_memory().unwrap();
        let hasher = Hasher::new(256, 1, 1).unwrap();
        let hash = hasher.hash("Str0ng!Passw0rd#2024").unwrap();
        db.create_author("alice", &hash, Some("alice@example.com")).unwrap();
        (db, hasher)
    }

    #[test]
    fn decodes_with_and_without_scheme() {
        let expected = Credentials {
            username: "alice".into(),
            password: "secret".into(),
        };
        assert_eq!(decode_credentials(&basic("alice:secret")).unwrap(), expected);
        assert_eq!(decode_credentials(&B64.encode("alice:secret")).unwrap(), expected);
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = decode_credentials(&basic("alice:a:b:c")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn malformed_headers() {
        let no_separator = basic("no-separator");
        for header in ["Basic !!!not-base64!!!", "", "Basic", no_separator.as_str()] {
            assert!(
                matches!(decode_credentials(header), Err(ApiError::MalformedCredentials)),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn correct_password_authenticates() {
        let (db, hasher) = setup();

        let outcome = authenticate(&db, &hasher, &basic("alice:Str0ng!Passw0rd#2024")).unwrap();
        match outcome {
            Authentication::Authenticated(author) => {
                assert_eq!(author.username, "alice");
                assert_eq!(author.email.as_deref(), Some("alice@example.com"));
            }
            Authentication::Unauthenticated => panic!("expected a match"),
        }
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let (db, hasher) = setup();

        let wrong = authenticate(&db, &hasher, &basic("alice:Str0ng!Passw0rd#2025")).unwrap();
        let unknown = authenticate(&db, &hasher, &basic("mallory:Str0ng!Passw0rd#2024")).unwrap();

        assert_eq!(wrong, Authentication::Unauthenticated);
        assert_eq!(unknown, Authentication::Unauthenticated);
    }

    #[test]
    fn unknown_user_costs_one_verification() {
        let (db, hasher) = setup();
        let before = hasher.verifications();

        authenticate(&db, &hasher, &basic("alice:Str0ng!Passw0rd#2025")).unwrap();
        let after_wrong = hasher.verifications();
        authenticate(&db, &hasher, &basic("mallory:Str0ng!Passw0rd#2024")).unwrap();
        let after_unknown = hasher.verifications();

        assert_eq!(after_wrong - before, 1);
        assert_eq!(after_unknown - after_wrong, 1);
    }

    #[test]
    fn malformed_header_skips_verification() {
        let (db, hasher) = setup();
        let before = hasher.verifications();

        assert!(authenticate(&db, &hasher, "Basic !!!").is_err());
        assert_eq!(hasher.verifications(), before);
    }

    #[test]
    fn corrupt_stored_hash_fails_closed() {
        let db = Database::open_in_memory().unwrap();
        db.create_author("bob", "not-a-hash", None).unwrap();

        let outcome = authenticate(&db, &Hasher::default(), &basic("bob:not-a-hash")).unwrap();
        assert_eq!(outcome, Authentication::Unauthenticated);
    }
}
