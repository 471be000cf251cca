//! Platform registry for detecting and providing platform implementations.

use crate::traits::PlatformProvider;
use std::sync::Arc;

#[cfg(target_os = "macos")]
use crate::providers::MacOSPlatform;

#[cfg(windows)]
use crate::providers::WindowsPlatform;

#[cfg(unix)]
use crate::providers::UnixPlatform;

/// Platform registry for detecting the current platform and creating providers.
pub struct PlatformRegistry;

impl PlatformRegistry {
    /// Get the platform provider for the current operating system.
    pub fn current() -> Arc<dyn PlatformProvider> {
        #[cfg(target_os = "macos")]
        return Arc::new(MacOSPlatform);

        #[cfg(windows)]
        return Arc::new(WindowsPlatform);

        #[cfg(all(unix, not(target_os = "macos")))]
        return Arc::new(UnixPlatform);

        #[cfg(not(any(unix, windows)))]
        compile_error!("Unsupported platform - only Unix-like and Windows platforms are supported");
    }

    /// Get a platform provider by name.
    ///
    /// Returns `None` for names unknown or not available on this host.
    pub fn for_name(name: &str) -> Option<Arc<dyn PlatformProvider>> {
        match name.to_lowercase().as_str() {
            "unix" | "linux" => {
                #[cfg(unix)]
                return Some(Arc::new(UnixPlatform));
                #[cfg(not(unix))]
                return None;
            }
            "windows" | "win32" => {
                #[cfg(windows)]
                return Some(Arc::new(WindowsPlatform));
                #[cfg(not(windows))]
                return None;
            }
            "macos" | "darwin" | "osx" => {
                #[cfg(target_os = "macos")]
                return Some(Arc::new(MacOSPlatform));
                #[cfg(not(target_os = "macos"))]
                return None;
            }
            _ => None,
        }
    }

    /// Get the current platform name as a string.
    pub fn current_platform_name() -> &'static str {
        Self::current().name()
    }
}
