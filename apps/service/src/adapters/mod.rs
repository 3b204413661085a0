//! Pool adapters backed by the service's store, hub and admin endpoint
pub mod loader;
pub mod notifier;

pub use loader::StoreLoader;
pub use notifier::ServiceNotifier;
