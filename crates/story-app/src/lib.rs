pub mod error;
pub mod rest_api;
pub mod service;
pub mod state;

/// Builds service from application state for every request, services are
/// thin wrappers around shared pool and clients.
#[macro_export]
macro_rules! service_from_request {
    ($service:ty) => {
        impl axum::extract::FromRequestParts<$crate::state::AppState> for $service {
            type Rejection = http::StatusCode;

            fn from_request_parts(
                _parts: &mut http::request::Parts,
                state: &$crate::state::AppState,
            ) -> impl std::future::Future<Output = std::result::Result<Self, Self::Rejection>>
                   + core::marker::Send {
                futures::future::ready(std::result::Result::Ok(<$service>::from_state(state)))
            }
        }
    };
}
