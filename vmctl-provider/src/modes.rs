//! Typed forms of the enumerated vmrun arguments.

use std::fmt;
use std::str::FromStr;
use vmctl_core::VmctlError;

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every accepted token, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($token),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $token ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = VmctlError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $token => Ok($name::$variant), )+
                    other => Err(VmctlError::InvalidArgument(format!(
                        "invalid {} '{}' (expected {})",
                        $label,
                        other,
                        Self::VALUES.join("|")
                    ))),
                }
            }
        }
    };
}

token_enum! {
    /// How `stop`, `reset` and `suspend` treat the guest.
    PowerMode, "power mode" {
        Hard => "hard",
        Soft => "soft",
    }
}

token_enum! {
    /// Access granted to a host-guest shared folder.
    ShareMode, "share mode" {
        Writable => "writable",
        Readonly => "readonly",
    }
}

token_enum! {
    CloneMode, "clone mode" {
        Full => "full",
        Linked => "linked",
    }
}

token_enum! {
    /// Namespace for `readVariable` / `writeVariable`.
    VariableMode, "variable mode" {
        RuntimeConfig => "runtimeConfig",
        GuestEnv => "guestEnv",
        GuestVar => "guestVar",
    }
}

token_enum! {
    /// Short keys accepted for `runProgramInGuest`.
    RunMode, "run mode" {
        NoWait => "n",
        ActiveWindow => "a",
        Interactive => "i",
    }
}

impl RunMode {
    /// Key to vmrun flag translation used by the operation table.
    pub const FLAGS: &'static [(&'static str, &'static str)] = &[
        ("n", "-noWait"),
        ("a", "-activeWindow"),
        ("i", "-interactive"),
    ];
}

impl Default for PowerMode {
    fn default() -> Self {
        PowerMode::Soft
    }
}

impl Default for ShareMode {
    fn default() -> Self {
        ShareMode::Readonly
    }
}
