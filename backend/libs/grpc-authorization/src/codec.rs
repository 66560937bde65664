//! Wire format of the `authorization` metadata value
//!
//! The value is `<scheme> <credential>`: the scheme name, a run of ASCII
//! whitespace, then the credential taken verbatim up to the end of the value
//! (it may itself contain whitespace).

use crate::error::{AuthorizationError, Result};
use crate::scheme::validate_scheme;
use once_cell::sync::Lazy;
use regex::Regex;

/// `\s` / `\S` restricted to ASCII whitespace; `(?s)` so the credential may
/// span line breaks.
static WIRE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A([^\t\n\x0C\r ]+)[\t\n\x0C\r ]+(.*)\z")
        .expect("authorization wire pattern is valid")
});

/// A decoded `authorization` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCredential {
    pub scheme: String,
    pub credential: String,
}

/// Encode a credential for the `authorization` metadata entry
pub fn encode(scheme: &str, credential: &str) -> Result<String> {
    validate_scheme(scheme)?;
    Ok(format!("{} {}", scheme.to_lowercase(), credential))
}

/// Decode an `authorization` metadata value
///
/// ## Errors
///
/// - `MalformedHeader` if there is no whitespace-separated second token
/// - `InvalidSchemeName` if the first token is not a valid scheme name
pub fn decode(value: &str) -> Result<WireCredential> {
    let captures = WIRE_PATTERN.captures(value).ok_or_else(|| {
        AuthorizationError::MalformedHeader(
            "invalid format for authorization metadata".to_string(),
        )
    })?;

    let scheme = &captures[1];
    validate_scheme(scheme)?;

    Ok(WireCredential {
        scheme: scheme.to_string(),
        credential: captures[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode("bearer", "abc.def").unwrap(), "bearer abc.def");
        assert_eq!(encode("foo", "say wut").unwrap(), "foo say wut");
        assert_eq!(encode("foo", "").unwrap(), "foo ");
    }

    #[test]
    fn test_encode_rejects_invalid_scheme() {
        assert!(matches!(
            encode("", "42"),
            Err(AuthorizationError::InvalidSchemeName { .. })
        ));
        assert!(matches!(
            encode("Basic", "42"),
            Err(AuthorizationError::InvalidSchemeName { .. })
        ));
    }

    #[test]
    fn test_decode_whitespace_run() {
        let decoded = decode("hello   \t world").unwrap();
        assert_eq!(decoded.scheme, "hello");
        assert_eq!(decoded.credential, "world");
    }

    #[test]
    fn test_decode_keeps_trailing_whitespace() {
        let decoded = decode("hello world  ").unwrap();
        assert_eq!(decoded.credential, "world  ");

        let decoded = decode("hello ").unwrap();
        assert_eq!(decoded.credential, "");
    }

    #[test]
    fn test_decode_malformed() {
        for value in ["", "coucou", " leading", "\tbearer"] {
            assert!(
                matches!(decode(value), Err(AuthorizationError::MalformedHeader(_))),
                "{:?} should be malformed",
                value
            );
        }
    }

    #[test]
    fn test_decode_invalid_scheme_carries_token() {
        match decode("heLLo monde") {
            Err(AuthorizationError::InvalidSchemeName { scheme, .. }) => {
                assert_eq!(scheme, "heLLo")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_alphanumeric_scheme_rejected() {
        let cases = [
            ("a-b token", "a-b"),
            ("bé/ar x", "bé/ar"),
            ("见/見 x", "见/見"),
        ];
        for (wire, scheme) in cases {
            match decode(wire) {
                Err(AuthorizationError::InvalidSchemeName { scheme: token, reason }) => {
                    assert_eq!(token, scheme);
                    assert_eq!(reason, "must only contain alphanumeric characters");
                }
                other => panic!("{:?} gave {:?}", wire, other),
            }
            assert!(matches!(
                encode(scheme, "x"),
                Err(AuthorizationError::InvalidSchemeName { .. })
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            scheme in "[a-z0-9]{1,12}",
            credential in "([^\t\n\x0C\r ].*)?",
        ) {
            let wire = encode(&scheme, &credential).unwrap();
            let decoded = decode(&wire).unwrap();
            prop_assert_eq!(decoded.scheme, scheme);
            prop_assert_eq!(decoded.credential, credential);
        }

        #[test]
        fn prop_single_token_is_malformed(value in "[^\t\n\x0C\r ]*") {
            prop_assert!(matches!(
                decode(&value),
                Err(AuthorizationError::MalformedHeader(_))
            ));
        }

        #[test]
        fn prop_uppercase_scheme_rejected(
            scheme in "[a-z]{0,4}[A-Z][a-zA-Z]{0,4}",
            credential in "[a-z]{1,8}",
        ) {
            let wire = format!("{} {}", scheme, credential);
            prop_assert!(
                matches!(
                    decode(&wire),
                    Err(AuthorizationError::InvalidSchemeName { .. })
                ),
                "decode should reject an uppercase scheme",
            );
            prop_assert!(
                matches!(
                    encode(&scheme, &credential),
                    Err(AuthorizationError::InvalidSchemeName { .. })
                ),
                "encode should reject an uppercase scheme",
            );
        }

        #[test]
        fn prop_non_alphanumeric_scheme_rejected(
            scheme in "[a-z]{0,4}[!-/:-@\\[-`{-~][a-z]{0,4}",
            credential in "[a-z]{1,8}",
        ) {
            let wire = format!("{} {}", scheme, credential);
            prop_assert!(
                matches!(
                    decode(&wire),
                    Err(AuthorizationError::InvalidSchemeName { .. })
                ),
                "decode should reject a non-alphanumeric scheme",
            );
            prop_assert!(
                matches!(
                    encode(&scheme, &credential),
                    Err(AuthorizationError::InvalidSchemeName { .. })
                ),
                "encode should reject a non-alphanumeric scheme",
            );
        }
    }
}
