use console::style;
use l3wrap_lib::installer::{ensure_binaries, missing_binaries, SetupOutcome};
use l3wrap_lib::{Config, Result};
use std::path::PathBuf;

pub fn handle_setup_command(config: &Config, data_dir: Option<PathBuf>, quiet: bool) -> Result<()> {
    let data_dir = data_dir.unwrap_or_else(|| config.root.clone());

    if !quiet {
        let missing = missing_binaries(&data_dir);
        if !missing.is_empty() {
            println!(
                "{} Missing binaries in {}: {}",
                style(">>>").cyan(),
                data_dir.display(),
                missing.join(", ")
            );
        }
    }

    match ensure_binaries(&data_dir)? {
        SetupOutcome::AlreadyInstalled => {
            if !quiet {
                println!("{} L3 binaries already installed", style("✓").green());
            }
        }
        SetupOutcome::Installed => {
            if !quiet {
                println!(
                    "{} L3 binaries installed in {}",
                    style("✓").green(),
                    data_dir.display()
                );
            }
        }
    }

    Ok(())
}
