//! Command-line assembly for vmrun invocations.
//!
//! Every invocation has the same layout:
//!
//! ```text
//! -T <product> -gu <user> -gp <password> <subcommand> "<vmx>" [args...]
//! ```
//!
//! The credential flags and sub-command form one combined leading token and
//! the VM descriptor path is always double-quoted. User, password and the
//! remaining operation arguments are quoted only when they contain
//! characters the host shell would interpret.

use crate::error::VmctlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const REDACTED: &str = "****";

/// Product family passed to vmrun with `-T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// VMware Workstation
    #[default]
    Ws,
    /// VMware Server 2.x
    Server,
    /// VMware Server 1.x
    Server1,
    /// VMware Fusion
    Fusion,
    /// VMware Player
    Player,
}

impl Product {
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Ws => "ws",
            Product::Server => "server",
            Product::Server1 => "server1",
            Product::Fusion => "fusion",
            Product::Player => "player",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = VmctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ws" | "workstation" => Ok(Product::Ws),
            "server" => Ok(Product::Server),
            "server1" => Ok(Product::Server1),
            "fusion" => Ok(Product::Fusion),
            "player" => Ok(Product::Player),
            other => Err(VmctlError::InvalidArgument(format!(
                "unknown product '{other}' (expected ws, server, server1, fusion or player)"
            ))),
        }
    }
}

/// Guest/host admin credentials sent with `-gu` and `-gp`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &REDACTED)
            .finish()
    }
}

/// How operation arguments are protected from word splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// POSIX `sh` single-quote escaping.
    Posix,
    /// Windows command-line double quoting.
    Windows,
}

impl QuoteStyle {
    /// The quoting style of the host this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            QuoteStyle::Windows
        } else {
            QuoteStyle::Posix
        }
    }

    pub fn quote(&self, arg: &str) -> String {
        match self {
            QuoteStyle::Posix => shell_escape(arg),
            QuoteStyle::Windows => windows_escape(arg),
        }
    }

    /// Like [`quote`](Self::quote), but an empty value stays empty so the
    /// credential flags keep their historical `-gu  -gp ` shape.
    fn quote_credential(&self, value: &str) -> String {
        if value.is_empty() {
            String::new()
        } else {
            self.quote(value)
        }
    }

    /// The VM descriptor path inside double quotes.
    ///
    /// `sh` still expands `$`, backticks and backslashes between double
    /// quotes, so those are backslash-escaped on POSIX hosts.
    fn quote_vmx(&self, vmx: &str) -> String {
        match self {
            QuoteStyle::Posix => {
                let mut quoted = String::with_capacity(vmx.len() + 2);
                quoted.push('"');
                for c in vmx.chars() {
                    if matches!(c, '$' | '`' | '"' | '\\') {
                        quoted.push('\\');
                    }
                    quoted.push(c);
                }
                quoted.push('"');
                quoted
            }
            QuoteStyle::Windows => format!("\"{vmx}\""),
        }
    }
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',' | '+' | '@')
}

/// Safely escape a string for shell execution by wrapping in single quotes
/// and escaping any existing single quotes
fn shell_escape(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_safe_char) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

/// Quote for the MSVC command-line parser: backslashes are literal unless
/// they precede a `"`, in which case each one must be doubled.
fn windows_escape(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(|c| is_safe_char(c) || c == '\\') {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                quoted.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.extend(std::iter::repeat('\\').take(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    quoted.extend(std::iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    quoted
}

/// A fully assembled vmrun parameter string.
///
/// The string excludes the executable itself; the launcher prepends it.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandLine {
    params: String,
    redacted: String,
}

impl CommandLine {
    pub fn build<S: AsRef<str>>(
        product: Product,
        credentials: &Credentials,
        subcommand: &str,
        vmx: &str,
        args: &[S],
        style: QuoteStyle,
    ) -> Self {
        let user = style.quote_credential(&credentials.user);
        let assemble = |password: &str| {
            let mut tokens = Vec::with_capacity(args.len() + 2);
            tokens.push(format!(
                "-T {} -gu {} -gp {} {}",
                product, user, password, subcommand
            ));
            tokens.push(style.quote_vmx(vmx));
            tokens.extend(args.iter().map(|a| style.quote(a.as_ref())));
            tokens.join(" ")
        };

        let params = assemble(&style.quote_credential(&credentials.password));
        let redacted = if credentials.password.is_empty() {
            params.clone()
        } else {
            assemble(REDACTED)
        };

        Self { params, redacted }
    }

    /// The exact parameter string handed to the launcher.
    pub fn as_str(&self) -> &str {
        &self.params
    }

    /// The parameter string with the password masked, safe for logs.
    pub fn redacted(&self) -> &str {
        &self.redacted
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.params)
    }
}

impl fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandLine").field(&self.redacted).finish()
    }
}
