#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web;

/// Declare the handlers of a routes module.
///
/// Expands to a `pub fn routes(cfg: &mut ServiceConfig)` registering every
/// listed handler, in order, to be passed to `App::configure`.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     route status_route,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $handler:path),* $(,)?) => {
        pub fn routes(cfg: &mut $crate::actix_web::web::ServiceConfig) {
            $( cfg.service($handler); )*
        }
    };
}
