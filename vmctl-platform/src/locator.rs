//! Resolution of the vmrun executable.
//!
//! Resolution never fails: when nothing is found the result is
//! [`ResolvedBinary::Unresolved`] and the error surfaces on the first
//! operation that needs the binary.

use crate::registry::PlatformRegistry;
use crate::traits::PlatformProvider;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Base name of the control binary.
pub const VMRUN_BINARY: &str = "vmrun";

/// Where a resolved binary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Override,
    Installation,
    SearchPath,
}

/// Outcome of executable resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBinary {
    Resolved {
        /// Filesystem path as found, unescaped.
        path: PathBuf,
        /// Token placed in front of the parameter string at launch.
        command: String,
        source: ResolutionSource,
    },
    Unresolved,
}

impl ResolvedBinary {
    pub fn command(&self) -> Option<&str> {
        match self {
            ResolvedBinary::Resolved { command, .. } => Some(command),
            ResolvedBinary::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedBinary::Resolved { .. })
    }
}

/// Finds the vmrun executable for one platform.
#[derive(Clone)]
pub struct Locator {
    platform: Arc<dyn PlatformProvider>,
    binary_name: String,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locator {
    pub fn new() -> Self {
        Self::with_platform(PlatformRegistry::current())
    }

    pub fn with_platform(platform: Arc<dyn PlatformProvider>) -> Self {
        let binary_name = platform.executable_name(VMRUN_BINARY);
        Self {
            platform,
            binary_name,
        }
    }

    pub fn platform(&self) -> &Arc<dyn PlatformProvider> {
        &self.platform
    }

    /// Resolve using the process `PATH`.
    pub fn resolve(&self, override_path: Option<&str>) -> ResolvedBinary {
        self.resolve_with_path(override_path, env::var_os("PATH"))
    }

    /// Resolve using an explicit search-path value.
    pub fn resolve_with_path(
        &self,
        override_path: Option<&str>,
        path_var: Option<OsString>,
    ) -> ResolvedBinary {
        if let Some(path) = override_path.filter(|p| !p.is_empty()) {
            debug!("Using vmrun override: {}", path);
            return ResolvedBinary::Resolved {
                path: PathBuf::from(path),
                command: path.to_string(),
                source: ResolutionSource::Override,
            };
        }

        let installed = match self.platform.installed_binary() {
            Ok(found) => found,
            Err(e) => {
                warn!("Installation lookup failed on {}: {:#}", self.platform.name(), e);
                None
            }
        };
        if let Some(path) = installed {
            return self.resolved(path, ResolutionSource::Installation);
        }

        if let Some(path) = path_var.as_deref().and_then(|p| self.scan_search_path(p)) {
            return self.resolved(path, ResolutionSource::SearchPath);
        }

        debug!("{} not found on {}", self.binary_name, self.platform.name());
        ResolvedBinary::Unresolved
    }

    /// First directory of `path_var`, in listed order, holding an executable
    /// with the platform's vmrun name.
    pub fn scan_search_path(&self, path_var: &OsStr) -> Option<PathBuf> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(&self.binary_name, Some(path_var), cwd).ok()
    }

    fn resolved(&self, path: PathBuf, source: ResolutionSource) -> ResolvedBinary {
        let command = self.platform.escape_path(&path.to_string_lossy());
        debug!(?source, "Resolved vmrun at {}", path.display());
        ResolvedBinary::Resolved {
            path,
            command,
            source,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::providers::UnixPlatform;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn locator() -> Locator {
        Locator::with_platform(Arc::new(UnixPlatform))
    }

    fn install_fake_vmrun(dir: &Path, mode: u32) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("vmrun");
        fs::write(&path, "#!/bin/sh\necho fake\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn join_paths(dirs: &[&Path]) -> OsString {
        env::join_paths(dirs).unwrap()
    }

    #[test]
    fn test_override_is_used_verbatim() {
        let resolved = locator().resolve_with_path(Some("/opt/My Tools/vmrun"), None);
        assert_eq!(
            resolved,
            ResolvedBinary::Resolved {
                path: PathBuf::from("/opt/My Tools/vmrun"),
                command: "/opt/My Tools/vmrun".to_string(),
                source: ResolutionSource::Override,
            }
        );
    }

    #[test]
    fn test_empty_override_falls_through_to_search() {
        let temp = TempDir::new().unwrap();
        let bin = install_fake_vmrun(&temp.path().join("bin"), 0o755);
        let resolved =
            locator().resolve_with_path(Some(""), Some(join_paths(&[bin.parent().unwrap()])));
        assert_eq!(resolved.command(), Some(bin.to_str().unwrap()));
    }

    #[test]
    fn test_search_selects_second_of_three_directories() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        let third = temp.path().join("third");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&third).unwrap();
        let expected = install_fake_vmrun(&second, 0o755);

        let resolved =
            locator().resolve_with_path(None, Some(join_paths(&[&first, &second, &third])));
        match resolved {
            ResolvedBinary::Resolved { path, source, .. } => {
                assert_eq!(path, expected);
                assert_eq!(source, ResolutionSource::SearchPath);
            }
            ResolvedBinary::Unresolved => panic!("vmrun should have been found"),
        }
    }

    #[test]
    fn test_search_stops_at_first_match() {
        let temp = TempDir::new().unwrap();
        let early = install_fake_vmrun(&temp.path().join("early"), 0o755);
        let late = install_fake_vmrun(&temp.path().join("late"), 0o755);

        let found = locator()
            .scan_search_path(&join_paths(&[early.parent().unwrap(), late.parent().unwrap()]));
        assert_eq!(found, Some(early));
    }

    #[test]
    fn test_search_skips_non_executable_files() {
        let temp = TempDir::new().unwrap();
        let not_exec = install_fake_vmrun(&temp.path().join("noexec"), 0o644);
        let exec = install_fake_vmrun(&temp.path().join("exec"), 0o755);

        let found = locator().scan_search_path(&join_paths(&[
            not_exec.parent().unwrap(),
            exec.parent().unwrap(),
        ]));
        assert_eq!(found, Some(exec));
    }

    #[test]
    fn test_resolved_path_with_space_is_escaped() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Program Files");
        let path = install_fake_vmrun(&dir, 0o755);

        let resolved = locator().resolve_with_path(None, Some(join_paths(&[&dir])));
        let expected = path.to_str().unwrap().replace(' ', "\\ ");
        assert_eq!(resolved.command(), Some(expected.as_str()));
        assert!(resolved.command().unwrap().contains("Program\\ Files"));
    }

    #[test]
    fn test_nothing_found_is_unresolved_not_error() {
        let temp = TempDir::new().unwrap();
        let resolved = locator().resolve_with_path(None, Some(join_paths(&[temp.path()])));
        assert_eq!(resolved, ResolvedBinary::Unresolved);
        assert!(!resolved.is_resolved());

        assert_eq!(locator().resolve_with_path(None, None), ResolvedBinary::Unresolved);
    }
}
