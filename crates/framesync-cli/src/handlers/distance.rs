//! Distance command handler.

use crate::commands::DistanceArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use framesync::Timestamp;

/// Execute the distance command
pub fn execute_distance(_config: &CliConfig, args: &DistanceArgs) -> CliResult<()> {
    println!("{}", frame_distance(&args.from, &args.to)?);
    Ok(())
}

/// Signed frame distance between two readings.
///
/// Negative when `to` comes later in the match than `from`.
pub fn frame_distance(from: &str, to: &str) -> CliResult<i64> {
    let from: Timestamp = from.parse()?;
    let to: Timestamp = to.parse()?;
    Ok(from.distance_to(&to))
}
