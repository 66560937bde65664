//! Attaching the outcome to a call and reading it back
//!
//! The outcome is stored in the request's extensions under a type private to
//! this module, so unrelated code can neither read nor replace it. Other
//! extensions (connection info, call span, ...) are left untouched.

use crate::error::{AuthorizationError, Result};
use crate::outcome::Outcome;
use std::any::{type_name, Any};

#[derive(Clone)]
struct AuthorizationSlot(Outcome);

static UNCHECKED: Outcome = Outcome::Unchecked;

/// Typed access to the authorization outcome of a call
///
/// Implemented for `tonic::Request<T>` (handlers) and `http::Request<B>`
/// (tower layers).
///
/// ```rust,no_run
/// use grpc_authorization::{AuthorizationError, AuthorizationExt};
/// use tonic::{Request, Response, Status};
///
/// #[derive(Clone)]
/// struct User {
///     name: String,
/// }
///
/// async fn whoami(request: Request<()>) -> Result<Response<String>, Status> {
///     let user = match request.authorization::<User>() {
///         Ok(user) => user,
///         Err(AuthorizationError::Missing) => {
///             return Err(Status::unauthenticated("needs authorization"))
///         }
///         Err(e) => return Err(e.into()),
///     };
///     Ok(Response::new(user.name.clone()))
/// }
/// ```
pub trait AuthorizationExt {
    /// The attached outcome, `Outcome::Unchecked` if none
    fn authorization_outcome(&self) -> &Outcome;

    /// A copy of this request carrying `outcome`
    fn with_authorization_outcome(self, outcome: Outcome) -> Self
    where
        Self: Sized;

    /// Borrow the validated value as `V`
    ///
    /// ## Errors
    ///
    /// - `Unchecked` if no authorization layer ran
    /// - the stored failure (`Missing`, `MalformedHeader`, `InvalidSchemeName`,
    ///   `UnsupportedScheme`, `Validator`)
    /// - `TypeMismatch` if the validator produced another type
    fn authorization<V: Any>(&self) -> Result<&V> {
        let outcome = self.authorization_outcome();
        let value = match outcome {
            Outcome::Success(value) => value,
            failure => {
                return Err(failure.error().unwrap_or(AuthorizationError::Unchecked));
            }
        };

        value
            .downcast_ref::<V>()
            .ok_or_else(|| AuthorizationError::TypeMismatch {
                expected: type_name::<V>(),
                actual: value.type_name(),
            })
    }

    /// Copy the validated value into `dest`
    ///
    /// Same errors as [`authorization`](Self::authorization); `dest` is only
    /// written on success.
    fn authorization_into<V: Any + Clone>(&self, dest: &mut V) -> Result<()> {
        let value = self.authorization::<V>()?;
        *dest = value.clone();
        Ok(())
    }
}

impl<T> AuthorizationExt for tonic::Request<T> {
    fn authorization_outcome(&self) -> &Outcome {
        self.extensions()
            .get::<AuthorizationSlot>()
            .map(|AuthorizationSlot(outcome)| outcome)
            .unwrap_or(&UNCHECKED)
    }

    fn with_authorization_outcome(mut self, outcome: Outcome) -> Self {
        self.extensions_mut().insert(AuthorizationSlot(outcome));
        self
    }
}

impl<B> AuthorizationExt for http::Request<B> {
    fn authorization_outcome(&self) -> &Outcome {
        self.extensions()
            .get::<AuthorizationSlot>()
            .map(|AuthorizationSlot(outcome)| outcome)
            .unwrap_or(&UNCHECKED)
    }

    fn with_authorization_outcome(mut self, outcome: Outcome) -> Self {
        self.extensions_mut().insert(AuthorizationSlot(outcome));
        self
    }
}

/// Attach `outcome` to `request`, returning the derived request
pub fn attach<R: AuthorizationExt>(request: R, outcome: Outcome) -> R {
    request.with_authorization_outcome(outcome)
}

/// Copy the validated value of `request` into `dest`
pub fn get<R: AuthorizationExt, V: Any + Clone>(request: &R, dest: &mut V) -> Result<()> {
    request.authorization_into(dest)
}
