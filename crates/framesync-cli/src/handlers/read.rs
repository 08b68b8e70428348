//! Read command handler: decode the clock from one still frame.

use super::build_reader;
use crate::commands::ReadArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use framesync::{load_frame, DigitScore, SyncError};
use std::fmt::Write as _;

/// Execute the read command
pub fn execute_read(config: &CliConfig, args: &ReadArgs) -> CliResult<()> {
    if !args.image.exists() {
        return Err(CliError::invalid_argument(format!(
            "Image file not found: {}",
            args.image.display()
        )));
    }

    let run_config = config.load_run_config()?;
    let reader = build_reader(&args.reader, &run_config)?;
    let frame = load_frame(&args.image)?;
    let reading = reader.read_checked(&frame)?;

    if args.scores || config.verbosity.is_verbose() {
        print!("{}", render_scores(&reader.region_scores(&frame)));
    }

    match reading {
        Some(timestamp) => {
            println!("{timestamp}");
            Ok(())
        }
        None => Err(SyncError::UnreadableFrame {
            message: format!("no clock reading in {}", args.image.display()),
        }
        .into()),
    }
}

/// One line per digit region: index, best digit, score.
#[must_use]
pub fn render_scores(scores: &[DigitScore]) -> String {
    let mut out = String::new();
    for (i, score) in scores.iter().enumerate() {
        let _ = writeln!(
            out,
            "region {i}: digit {} (confidence {:.3})",
            score.digit, score.confidence
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::ReaderArgs;
    use std::path::PathBuf;

    #[test]
    fn test_render_scores() {
        let scores = [
            DigitScore {
                digit: 0,
                confidence: 0.95,
            },
            DigitScore {
                digit: 7,
                confidence: 0.5,
            },
        ];
        let text = render_scores(&scores);
        assert_eq!(
            text,
            "region 0: digit 0 (confidence 0.950)\nregion 1: digit 7 (confidence 0.500)\n"
        );
    }

    #[test]
    fn test_execute_read_missing_image() {
        let args = ReadArgs {
            image: PathBuf::from("/nonexistent/frame.png"),
            scores: false,
            reader: ReaderArgs::default(),
        };
        let err = execute_read(&CliConfig::new(), &args).unwrap_err();
        assert!(err.to_string().contains("Image file not found"));
    }

    #[test]
    fn test_execute_read_missing_assets() {
        let temp = tempfile::TempDir::new().unwrap();
        let image = temp.path().join("frame.png");
        image::GrayImage::new(643, 528).save(&image).unwrap();
        let args = ReadArgs {
            image,
            scores: false,
            reader: ReaderArgs {
                assets: Some(temp.path().join("glyphs")),
                ..ReaderArgs::default()
            },
        };
        let err = execute_read(&CliConfig::new(), &args).unwrap_err();
        assert!(err.to_string().contains("Glyph directory not found"));
    }
}
