//! Attach command implementation

use std::io::BufRead;
use w5x00_core::lifecycle::LifecycleState;
use w5x00_host::ModuleHandle;

/// Load the module, report what got attached, then unload
///
/// Waits for Enter on stdin before unloading unless `no_wait` is set.
pub fn run_attach(
    handle: &mut ModuleHandle,
    no_wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    handle.load()?;
    print_status(handle);

    if let Some(e) = handle.last_probe_error() {
        eprintln!("Warning: probe failed: {}", e);
    } else if handle.state() == LifecycleState::Bound {
        eprintln!("Warning: chip bound but no network interface was created");
    }

    if !no_wait {
        println!();
        println!("Press Enter to detach...");
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
    }

    handle.unload();
    println!("Detached ({})", handle.state());
    Ok(())
}

fn print_status(handle: &ModuleHandle) {
    println!("Backend:   {}", handle.backend());
    println!("State:     {}", handle.state());
    println!(
        "IRQ:       {}",
        handle
            .irq()
            .map_or_else(|| "-".to_string(), |irq| irq.to_string())
    );
    println!(
        "Interface: {}",
        handle.interface_name().unwrap_or_else(|| "-".to_string())
    );
}
