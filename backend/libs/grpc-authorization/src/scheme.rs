//! Scheme names and the scheme registry

use crate::error::{AuthorizationError, Result};
use crate::validator::CredentialValidator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Check a scheme name against the naming rule.
///
/// A scheme name must be non-empty, contain no whitespace, be lowercase and
/// only contain alphanumeric characters (any script). The same rule applies
/// when registering validators, encoding outgoing credentials and decoding
/// incoming ones.
pub fn validate_scheme(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("is empty")
    } else if name.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if name.to_lowercase() != name {
        Some("must be lowercase")
    } else if !name.chars().all(char::is_alphanumeric) {
        Some("must only contain alphanumeric characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AuthorizationError::InvalidSchemeName {
            scheme: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Mapping from scheme name to the validator handling it
///
/// Holds at most one validator per name; registering a name again replaces
/// the previous validator.
#[derive(Default, Clone)]
pub struct SchemeRegistry {
    validators: HashMap<String, Arc<dyn CredentialValidator>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, validator: Arc<dyn CredentialValidator>) -> Result<()> {
        validate_scheme(name)?;

        if self.validators.insert(name.to_string(), validator).is_some() {
            debug!(scheme = %name, "Replacing previously registered credential validator");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CredentialValidator>> {
        self.validators.get(name)
    }

    /// Registered scheme names, sorted
    pub fn schemes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for SchemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{validator_fn, AuthValue};

    fn reason_of(name: &str) -> &'static str {
        match validate_scheme(name) {
            Err(AuthorizationError::InvalidSchemeName { scheme, reason }) => {
                assert_eq!(scheme, name);
                reason
            }
            other => panic!("expected InvalidSchemeName for {:?}, got {:?}", name, other),
        }
    }

    #[test]
    fn test_valid_schemes() {
        for name in ["a", "42", "bearer", "basic2", "憑據"] {
            assert!(validate_scheme(name).is_ok(), "{:?} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_schemes() {
        assert_eq!(reason_of(""), "is empty");
        assert_eq!(reason_of("  "), "must not contain whitespace");
        assert_eq!(reason_of("be arer"), "must not contain whitespace");
        assert_eq!(reason_of("tab\there"), "must not contain whitespace");
        assert_eq!(reason_of("Bearer"), "must be lowercase");
        assert_eq!(reason_of("见/見"), "must only contain alphanumeric characters");
        assert_eq!(reason_of("a-b"), "must only contain alphanumeric characters");
    }

    #[test]
    fn test_register_rejects_invalid_name() {
        let mut registry = SchemeRegistry::new();
        let validator = Arc::new(validator_fn(|_, _| async { Ok(AuthValue::new(())) }));

        let result = registry.register("Bearer", validator);
        assert!(matches!(
            result,
            Err(AuthorizationError::InvalidSchemeName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = SchemeRegistry::new();
        let first: Arc<dyn CredentialValidator> =
            Arc::new(validator_fn(|_, _| async { Ok(AuthValue::new(1u8)) }));
        let second: Arc<dyn CredentialValidator> =
            Arc::new(validator_fn(|_, _| async { Ok(AuthValue::new(2u8)) }));

        registry.register("token", first).unwrap();
        registry.register("token", second.clone()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(registry.get("token").unwrap(), &second));
    }

    #[test]
    fn test_schemes_sorted() {
        let mut registry = SchemeRegistry::new();
        for name in ["hello", "basic", "foo"] {
            registry
                .register(name, Arc::new(validator_fn(|_, _| async { Ok(AuthValue::new(())) })))
                .unwrap();
        }

        assert_eq!(registry.schemes(), vec!["basic", "foo", "hello"]);
    }
}
