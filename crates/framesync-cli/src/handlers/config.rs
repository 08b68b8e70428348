//! Config command handler.

use crate::config::CliConfig;
use crate::error::CliResult;

/// Execute the config command
pub fn execute_config(config: &CliConfig) -> CliResult<()> {
    print!("{}", render_config(config)?);
    Ok(())
}

/// Effective run settings as YAML
pub fn render_config(config: &CliConfig) -> CliResult<String> {
    let run_config = config.load_run_config()?;
    Ok(run_config.to_yaml()?)
}
