//! Output macros shared by the vmctl crates.
//!
//! Standard output is reserved for text produced by vmrun itself, so every
//! message that is not vmrun output goes to standard error.

#[macro_export]
macro_rules! vmctl_println {
    () => {
        println!();
    };
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! vmctl_error {
    ($($arg:tt)*) => {
        eprintln!("❌ {}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! vmctl_error_hint {
    ($($arg:tt)*) => {
        eprintln!("💡 {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! vmctl_warning {
    ($($arg:tt)*) => {
        eprintln!("⚠ {}", format!($($arg)*));
    };
}

/// Diagnostic channel used when a controller was built with `debug: true`.
#[macro_export]
macro_rules! vmctl_debug {
    ($($arg:tt)*) => {
        eprintln!("[DEBUG] {}", format!($($arg)*));
    };
}
