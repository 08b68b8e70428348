//! Timer command handler: print the canonical countdown.

use crate::commands::TimerArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use framesync::canonical_sequence;
use std::io::{BufWriter, Write};

/// Execute the timer command
pub fn execute_timer(_config: &CliConfig, args: &TimerArgs) -> CliResult<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_timer(&mut out, args)?;
    out.flush()?;
    Ok(())
}

/// Write the selected slice of the countdown, one reading per line.
pub fn write_timer(out: &mut impl Write, args: &TimerArgs) -> CliResult<()> {
    let values = canonical_sequence(args.start_seconds)?.skip(args.skip);
    let limit = args.limit.unwrap_or(usize::MAX);
    for value in values.take(limit) {
        writeln!(out, "{value}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn render(args: &TimerArgs) -> String {
        let mut buf = Vec::new();
        write_timer(&mut buf, args).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_first_readings() {
        let text = render(&TimerArgs {
            start_seconds: 480,
            skip: 0,
            limit: Some(4),
        });
        assert_eq!(text, "080000\n075999\n075998\n075996\n");
    }

    #[test]
    fn test_skip_to_last_readings() {
        let text = render(&TimerArgs {
            start_seconds: 480,
            skip: 28_498,
            limit: None,
        });
        assert_eq!(text, "000504\n000502\n");
    }

    #[test]
    fn test_invalid_start() {
        let mut buf = Vec::new();
        let args = TimerArgs {
            start_seconds: 5,
            skip: 0,
            limit: None,
        };
        assert!(write_timer(&mut buf, &args).is_err());
    }
}
