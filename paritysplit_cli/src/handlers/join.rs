use std::path::Path;
use tracing::info;
use paritysplit::{JoinReport, collect_parts, join};
use crate::errors::CliError;

/// Collects the part set named by `input` and rebuilds it into `output`.
pub fn handle_join(input: &Path, output: &Path) -> Result<JoinReport, CliError> {
    let set = collect_parts(input)?;
    info!(parts = set.len(), "Found part files");
    Ok(join(&set, output)?)
}
