use std::path::Path;
use paritysplit::{SplitReport, split};
use crate::errors::CliError;

/// Parses the part count given on the command line and splits `source`.
pub fn handle_split(parts: &str, source: &Path, output_dir: &Path) -> Result<SplitReport, CliError> {
    let count: u32 = parts
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidPartsArgument(parts.to_string()))?;
    Ok(split(source, output_dir, count)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_numeric_parts_are_rejected_before_touching_files() {
        let err = handle_split("three", Path::new("/no/such/file"), Path::new("/no/such/dir"))
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidPartsArgument(ref s) if s == "three"));
        assert_eq!(err.exit_code(), 3);

        let err = handle_split("-2", Path::new("/no/such/file"), Path::new("/no/such/dir"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
