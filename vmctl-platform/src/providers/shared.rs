//! Shared implementations for platform providers.
//!
//! Helpers used by more than one provider. They are plain functions so the
//! parsing logic can be tested on every host, not only the one it runs on.

/// Backslash-escape every whitespace character for a POSIX shell.
pub fn posix_escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_whitespace() {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Extract a value from `reg query <key> /v <name>` output.
///
/// ```text
/// HKEY_LOCAL_MACHINE\SOFTWARE\VMware, Inc.\VMware Workstation
///     InstallPath    REG_SZ    C:\Program Files (x86)\VMware\VMware Workstation\
/// ```
pub fn parse_reg_query_value(output: &str, value_name: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(value_name)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let (kind, value) = rest.trim_start().split_once(char::is_whitespace)?;
        if !kind.starts_with("REG_") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_escape_path() {
        assert_eq!(posix_escape_path("/Program Files/vmrun"), "/Program\\ Files/vmrun");
        assert_eq!(posix_escape_path("/usr/bin/vmrun"), "/usr/bin/vmrun");
        assert_eq!(posix_escape_path("/a b\tc/vmrun"), "/a\\ b\\\tc/vmrun");
    }

    #[test]
    fn test_parse_reg_query_value() {
        let output = "\r\nHKEY_LOCAL_MACHINE\\SOFTWARE\\VMware, Inc.\\VMware Workstation\r\n    InstallPath    REG_SZ    C:\\Program Files (x86)\\VMware\\VMware Workstation\\\r\n\r\n";
        assert_eq!(
            parse_reg_query_value(output, "InstallPath").as_deref(),
            Some("C:\\Program Files (x86)\\VMware\\VMware Workstation\\")
        );
    }

    #[test]
    fn test_parse_reg_query_value_ignores_other_values() {
        let output = "    InstallPath64    REG_SZ    D:\\Other\\\n    ProductCode    REG_SZ    {1234}\n";
        assert_eq!(parse_reg_query_value(output, "InstallPath"), None);
        assert_eq!(parse_reg_query_value("", "InstallPath"), None);
    }

    #[test]
    fn test_parse_reg_query_value_expand_sz() {
        let output = "    InstallPath    REG_EXPAND_SZ    %ProgramFiles%\\VMware\\\n";
        assert_eq!(
            parse_reg_query_value(output, "InstallPath").as_deref(),
            Some("%ProgramFiles%\\VMware\\")
        );
    }
}
