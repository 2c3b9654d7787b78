use anyhow::{bail, Context, Result};
use std::path::PathBuf;

const DEFAULT_OLD_OUTPUT_FOLDER: &str = "old";
const DEFAULT_OUTPUT_FOLDER: &str = "webp";
const DEFAULT_QUALITY: i32 = 85;

#[derive(Debug)]
pub struct Args {
    pub directory: PathBuf,
    pub old_output_folder: String,
    pub output_folder: String,
    pub quality: i32,
}

impl Args {
    /// Parse and validate command line arguments
    pub fn parse() -> Result<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    /// Parse `key=value` tokens. Recognized keys are `path`, `oldOutput`,
    /// `output` and `quality`; tokens may appear in any order and the first
    /// occurrence of a key wins.
    pub fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let directory = argument_value(&args, "path").unwrap_or_default();
        let old_output_folder = argument_value(&args, "oldOutput")
            .unwrap_or_else(|| DEFAULT_OLD_OUTPUT_FOLDER.to_string());
        let output_folder = argument_value(&args, "output")
            .unwrap_or_else(|| DEFAULT_OUTPUT_FOLDER.to_string());

        // No range validation here; out-of-range values are left to the encoder
        let quality = match argument_value(&args, "quality") {
            Some(value) => value
                .parse::<i32>()
                .with_context(|| format!("Invalid quality value: {}", value))?,
            None => DEFAULT_QUALITY,
        };

        if directory.is_empty() {
            bail!("No path argument provided. Use path=<directory-path>.");
        }

        let directory = PathBuf::from(directory);
        if !directory.exists() {
            bail!("The directory {} does not exist.", directory.display());
        }
        if !directory.is_dir() {
            bail!("The path {} is not a directory.", directory.display());
        }

        Ok(Args {
            directory,
            old_output_folder,
            output_folder,
            quality,
        })
    }
}

/// Find the first `key=value` token for `key` and return its value
fn argument_value(args: &[String], key: &str) -> Option<String> {
    let prefix = format!("{}=", key);
    args.iter()
        .find(|arg| arg.starts_with(&prefix))
        .map(|arg| arg[prefix.len()..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(vec![format!("path={}", dir.path().display())]).unwrap();

        assert_eq!(args.directory, dir.path());
        assert_eq!(args.old_output_folder, "old");
        assert_eq!(args.output_folder, "webp");
        assert_eq!(args.quality, 85);
    }

    #[test]
    fn test_explicit_values_in_any_order() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(vec![
            "quality=70".to_string(),
            "output=converted".to_string(),
            format!("path={}", dir.path().display()),
            "oldOutput=archive".to_string(),
        ])
        .unwrap();

        assert_eq!(args.old_output_folder, "archive");
        assert_eq!(args.output_folder, "converted");
        assert_eq!(args.quality, 70);
    }

    #[test]
    fn test_first_occurrence_of_a_key_wins() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(vec![
            format!("path={}", dir.path().display()),
            "quality=70".to_string(),
            "quality=95".to_string(),
        ])
        .unwrap();

        assert_eq!(args.quality, 70);
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let err = Args::parse_from(vec!["quality=90".to_string()]).unwrap_err();
        assert!(err.to_string().contains("No path argument provided"));
    }

    #[test]
    fn test_empty_path_is_fatal() {
        let err = Args::parse_from(vec!["path=".to_string()]).unwrap_err();
        assert!(err.to_string().contains("No path argument provided"));
    }

    #[test]
    fn test_nonexistent_directory_is_fatal() {
        let err = Args::parse_from(vec!["path=/no/such/directory".to_string()]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_path_to_a_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("image.png");
        std::fs::write(&file, b"data").unwrap();

        let err = Args::parse_from(vec![format!("path={}", file.display())]).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_non_numeric_quality_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Args::parse_from(vec![
            format!("path={}", dir.path().display()),
            "quality=best".to_string(),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Invalid quality value"));
    }

    #[test]
    fn test_out_of_range_quality_is_accepted_at_parse_time() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(vec![
            format!("path={}", dir.path().display()),
            "quality=250".to_string(),
        ])
        .unwrap();

        assert_eq!(args.quality, 250);
    }
}
