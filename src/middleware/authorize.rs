use axum::http::request::Parts;

use crate::middleware::identity::Identity;

/// Decides whether an authenticated identity may reach a protected route.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, identity: &Identity, request: &Parts) -> bool;
}

/// Lets every authenticated identity through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _identity: &Identity, _request: &Parts) -> bool {
        true
    }
}

impl<F> Authorizer for F
where
    F: Fn(&Identity, &Parts) -> bool + Send + Sync,
{
    fn authorize(&self, identity: &Identity, request: &Parts) -> bool {
        (self)(identity, request)
    }
}
