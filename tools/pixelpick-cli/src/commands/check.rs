//! Check host capabilities.

use pixelpick_capture_engine::capability::{check_capabilities, print_capability_report};

pub fn run() -> anyhow::Result<()> {
    println!("Pixelpick System Check");
    println!("{}", "=".repeat(50));

    let capabilities = check_capabilities();
    print_capability_report(&capabilities);

    let all_required_ok = capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. Pixelpick is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
