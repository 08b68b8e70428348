//! Profiles command handler.

use crate::commands::ProfilesArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use framesync::CaptureProfile;
use std::fmt::Write as _;

/// Execute the profiles command
pub fn execute_profiles(_config: &CliConfig, args: &ProfilesArgs) -> CliResult<()> {
    let profiles: Vec<CaptureProfile> = CaptureProfile::builtin_names()
        .iter()
        .filter_map(|&name| CaptureProfile::builtin(name))
        .collect();
    let content = if args.yaml {
        render_yaml(&profiles)?
    } else {
        render_table(&profiles)
    };
    print!("{content}");
    Ok(())
}

/// `name  WxH  threshold` per profile
#[must_use]
pub fn render_table(profiles: &[CaptureProfile]) -> String {
    let mut out = String::new();
    for profile in profiles {
        let _ = writeln!(
            out,
            "{:<20} {}x{}  {} digits  threshold {}",
            profile.name,
            profile.width,
            profile.height,
            profile.regions.len(),
            profile.darkness_threshold
        );
    }
    out
}

/// Full definitions as a YAML document stream
pub fn render_yaml(profiles: &[CaptureProfile]) -> CliResult<String> {
    let mut out = String::new();
    for profile in profiles {
        let yaml = serde_yaml_ng::to_string(profile)
            .map_err(|e| CliError::report_generation(format!("YAML serialization error: {e}")))?;
        out.push_str("---\n");
        out.push_str(&yaml);
    }
    Ok(out)
}
