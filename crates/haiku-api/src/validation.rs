use regex::Regex;

use crate::error::ApiError;

pub const MAX_LIMIT: i64 = 100;
pub const MAX_SKIP: i64 = 100_000;

/// Substrings rejected in usernames, matched after normalisation.
const PROFANITIES: &[&str] = &[
    "arse", "asshole", "bastard", "bitch", "bollock", "bullshit", "cock", "crap", "cunt",
    "dick", "dildo", "fuck", "jackass", "penis", "piss", "porn", "pussy", "shit", "slut",
    "twat", "wank", "whore",
];

/// Innocent words containing a listed substring. Removed before matching.
const FALSE_POSITIVES: &[&str] = &[
    "arsenal", "arsenic", "coarse", "hoarse", "parse", "sparse", "scunthorpe", "cocktail",
    "cockpit", "cockatoo", "cockroach", "hancock", "hitchcock", "peacock", "shuttlecock",
    "woodcock", "dickens", "dickinson", "scrap", "penistone", "pissarro", "shitake",
    "saltwater", "swank",
];

pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_-]+$").is_ok_and(|regex| regex.is_match(username))
}

pub fn is_profane(text: &str) -> bool {
    let mut cleaned = sanitize(text);
    for word in FALSE_POSITIVES {
        cleaned = cleaned.replace(word, "");
    }
    PROFANITIES.iter().any(|word| cleaned.contains(word))
}

/// Lowercases, undoes common character substitutions and drops separators.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c.to_ascii_lowercase() {
            '0' => Some('o'),
            '1' | '!' => Some('i'),
            '3' => Some('e'),
            '4' | '@' => Some('a'),
            '5' | '$' => Some('s'),
            '7' => Some('t'),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Parses a single mailbox, either `addr@host` or `Display Name <addr@host>`,
/// and returns the bare address.
pub fn parse_email(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let address = match raw.rfind('<') {
        Some(open) => {
            let inner = raw[open + 1..].strip_suffix('>')?;
            let display = &raw[..open];
            if display.contains(['<', '>', '@']) {
                return None;
            }
            inner.trim()
        }
        None => raw,
    };

    Regex::new(r"^[^@\s<>,;]+@[^@\s<>,;]+\.[^@\s<>,;]+$")
        .is_ok_and(|regex| regex.is_match(address))
        .then(|| address.to_string())
}

pub fn required_field_error(field: &str) -> String {
    format!("request body requires a non-zero length '{field}' field")
}

/// Collects an error for every required field that is empty or blank.
pub fn check_required(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let errors: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| required_field_error(name))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidBody(errors))
    }
}

pub fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::Validation(format!("{what} must be an integer id")))
}

/// Checks paging bounds, returning them ready for the store.
pub fn check_page(limit: i64, skip: i64) -> Result<(u32, u32), ApiError> {
    if !(0..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "'limit' value needs to be number & below {MAX_LIMIT}"
        )));
    }
    if !(0..=MAX_SKIP).contains(&skip) {
        return Err(ApiError::Validation(format!(
            "'skip' value needs to be number & below {MAX_SKIP}"
        )));
    }
    Ok((limit as u32, skip as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_character_set() {
        assert!(valid_username("alice"));
        assert!(valid_username("Alice_the-2nd"));
        assert!(!valid_username(""));
        assert!(!valid_username("alice smith"));
        assert!(!valid_username("alice!"));
        assert!(!valid_username("ålice"));
        assert!(!valid_username("alice\n"));
    }

    #[test]
    fn profanity_is_case_insensitive() {
        assert!(is_profane("BigShit99"));
        assert!(!is_profane("alice"));
    }

    #[test]
    fn profanity_sees_through_substitutions() {
        assert!(is_profane("sh1t_lord"));
        assert!(is_profane("b-i-t-c-h"));
        assert!(is_profane("PI55-off"));
    }

    #[test]
    fn innocent_words_are_not_profane() {
        for name in ["Scunthorpe", "cocktail_hour", "ArsenalFan", "Dickens", "scrapbook", "saltwater"] {
            assert!(!is_profane(name), "{name} flagged");
        }
        assert!(!is_profane("user_2024"));
    }

    #[test]
    fn bare_email() {
        assert_eq!(
            parse_email("alice@example.com").as_deref(),
            Some("alice@example.com")
        );
        assert_eq!(
            parse_email("  name.surname@example.co ").as_deref(),
            Some("name.surname@example.co")
        );
    }

    #[test]
    fn named_mailbox() {
        assert_eq!(
            parse_email("Alice Liddell <alice@example.com>").as_deref(),
            Some("alice@example.com")
        );
    }

    #[test]
    fn rejects_invalid_email() {
        assert!(parse_email("not-an-email").is_none());
        assert!(parse_email("missing-domain@").is_none());
        assert!(parse_email("a@b@example.com").is_none());
        assert!(parse_email("a@example.com, b@example.com").is_none());
        assert!(parse_email("Alice <alice@example.com").is_none());
        assert!(parse_email("").is_none());
    }

    #[test]
    fn required_fields_are_all_reported() {
        let err = check_required(&[("username", ""), ("password", " "), ("email", "a@b.c")])
            .unwrap_err();
        match err {
            ApiError::InvalidBody(errors) => assert_eq!(
                errors,
                vec![
                    "request body requires a non-zero length 'username' field",
                    "request body requires a non-zero length 'password' field",
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn page_bounds() {
        assert_eq!(check_page(0, 0).unwrap(), (0, 0));
        assert_eq!(check_page(100, 100_000).unwrap(), (100, 100_000));
        assert!(check_page(101, 0).is_err());
        assert!(check_page(-1, 0).is_err());
        assert!(check_page(10, 100_001).is_err());
        assert!(check_page(10, -5).is_err());
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42", "haiku id").unwrap(), 42);
        assert!(parse_id("abc", "haiku id").is_err());
    }
}
