use anyhow::Result;

use risk_dashboard::{config::Config, logging, render, services::report};

/// Prints one refresh of the risk report to stdout.
fn main() -> Result<()> {
    logging::init_logging()?;
    let config = Config::new()?;
    render::configure_console();

    let report = report::build_report(&config);
    print!("{}", render::render_report(&report)?);

    Ok(())
}
