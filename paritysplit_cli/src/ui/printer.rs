//! Functions for printing operation reports to the console.

use serde::Serialize;
use paritysplit::{JoinReport, SplitReport};
use crate::errors::CliError;

/// 以 JSON 格式打印报告
pub fn print_json<T: Serialize>(report: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// 打印拆分结果
pub fn print_split_report(report: &SplitReport) {
    println!("----------------------------------------");
    println!("  File:        {}", report.file_name);
    println!("  Size:        {} bytes", report.file_size);
    println!("  Id:          {}", report.id);
    println!("  Parts:       {} x {} bytes", report.part_count, report.part_length);
    println!("----------------------------------------");
    for part in &report.parts {
        println!("  {}", part.display());
    }
    println!("  {} (parity)", report.parity.display());
    println!("Split complete.");
}

/// 打印合并结果，包括恢复与重建的分片
pub fn print_join_report(report: &JoinReport) {
    println!("----------------------------------------");
    println!("  File:        {}", report.file_name);
    println!("  Size:        {} bytes", report.file_size);
    println!("  Id:          {}", report.id);
    println!("  Written to:  {}", report.destination.display());
    if let Some(part) = report.recovered_part {
        println!("  Recovered:   part {}", part);
    }
    if let Some(path) = &report.regenerated {
        println!("  Recreated:   {}", path.display());
    }
    println!("----------------------------------------");
    // warnings are already logged; repeat them so they survive RUST_LOG=off
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    println!("Join complete.");
}
