//! Show how vmrun would be found and launched on this host.

use vmctl_platform::{Locator, ResolvedBinary, VMRUN_BINARY};

fn main() -> anyhow::Result<()> {
    println!("=== vmrun Platform Demo ===");

    let platform = vmctl_platform::current();
    println!("Platform: {}", platform.name());
    println!(
        "Executable '{}' would be named: '{}'",
        VMRUN_BINARY,
        platform.executable_name(VMRUN_BINARY)
    );
    println!("Launch strategy: {:?}", platform.launch_strategy());
    println!("Argument quoting: {:?}", platform.quote_style());

    match platform.installed_binary()? {
        Some(path) => println!("Installed copy: {}", path.display()),
        None => println!("Installed copy: none registered"),
    }

    let override_path = std::env::args().nth(1);
    match Locator::with_platform(platform).resolve(override_path.as_deref()) {
        ResolvedBinary::Resolved {
            path,
            command,
            source,
        } => {
            println!("Resolved ({source:?}): {}", path.display());
            println!("Command token: {command}");
        }
        ResolvedBinary::Unresolved => println!("vmrun not found"),
    }

    Ok(())
}
