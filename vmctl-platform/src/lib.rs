//! Cross-platform discovery of the vmrun control binary.
//!
//! Platform differences (registry lookup, application bundles, launch
//! strategy, path escaping) live behind [`PlatformProvider`]; the
//! [`Locator`] picks one once and resolves the executable from an explicit
//! override, installation metadata, or the `PATH` search list.

pub mod locator;
pub mod providers;
pub mod registry;
pub mod traits;

// Re-export commonly used items
pub use locator::{Locator, ResolutionSource, ResolvedBinary, VMRUN_BINARY};
pub use registry::PlatformRegistry;
pub use traits::PlatformProvider;

/// Get the current platform provider
pub fn current() -> std::sync::Arc<dyn PlatformProvider> {
    PlatformRegistry::current()
}
