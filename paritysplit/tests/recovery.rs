use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use paritysplit::header::HeaderSetViolation;
use paritysplit::{JoinError, collect_from_candidates, collect_parts, join};

mod common;
use common::{read_part_payload, sample_bytes, split_sample};

/// Test: deleting `.002` of the 10-byte split recovers exactly "4567"
/// and recreates the part file next to the others.
#[test]
fn test_recover_middle_part() {
    let dir = tempdir().unwrap();
    let content = b"0123456789";
    let (parts_dir, _) = split_sample(&dir, "ten.bin", content, 3);
    let part2 = parts_dir.join("ten.bin.002");
    let original_part2 = fs::read(&part2).unwrap();
    fs::remove_file(&part2).unwrap();

    let restored = dir.path().join("restored.bin");
    let report = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap();

    assert_eq!(fs::read(&restored).unwrap(), content);
    assert_eq!(report.recovered_part, Some(2));
    assert_eq!(report.regenerated, Some(part2.clone()));
    assert!(report.warnings.is_empty());

    let (header, payload) = read_part_payload(&part2);
    assert_eq!(payload, b"4567");
    assert_eq!(header.part_number(), 2);
    // the regenerated file is byte-identical to the one the splitter wrote
    assert_eq!(fs::read(&part2).unwrap(), original_part2);
}

/// Test: a recovered last part is trimmed from the output and from the regenerated file.
#[test]
fn test_recover_short_last_part() {
    let dir = tempdir().unwrap();
    let content = b"0123456789";
    let (parts_dir, _) = split_sample(&dir, "ten.bin", content, 3);
    let part3 = parts_dir.join("ten.bin.003");
    fs::remove_file(&part3).unwrap();

    let restored = dir.path().join("restored.bin");
    let report = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap();

    assert_eq!(fs::read(&restored).unwrap(), content);
    assert_eq!(report.recovered_part, Some(3));
    let (_, payload) = read_part_payload(&part3);
    assert_eq!(payload, b"89");
}

/// Test: every single data part of a larger split can be lost and recovered.
#[test]
fn test_recover_each_data_part() {
    let content = sample_bytes(10_007);
    for missing in 1..=7u32 {
        let dir = tempdir().unwrap();
        let (parts_dir, _) = split_sample(&dir, "big.dat", &content, 7);
        fs::remove_file(parts_dir.join(format!("big.dat.{:03}", missing))).unwrap();

        let restored = dir.path().join("restored.dat");
        let report = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap();

        assert_eq!(report.recovered_part, Some(missing));
        assert_eq!(
            fs::read(&restored).unwrap(),
            content,
            "recovery of part {} failed",
            missing
        );
    }
}

/// Test: losing only the parity part still joins, and the parity is regenerated.
#[test]
fn test_missing_parity_is_regenerated() {
    let dir = tempdir().unwrap();
    let content = sample_bytes(1234);
    let (parts_dir, report) = split_sample(&dir, "p.bin", &content, 5);
    let (_, original_parity) = read_part_payload(&report.parity);
    fs::remove_file(&report.parity).unwrap();

    let restored = dir.path().join("restored.bin");
    let join_report = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap();

    assert_eq!(fs::read(&restored).unwrap(), content);
    assert_eq!(join_report.recovered_part, None);
    assert_eq!(join_report.regenerated, Some(parts_dir.join("p.bin.crc")));

    let (header, parity) = read_part_payload(&report.parity);
    assert!(header.is_parity());
    assert_eq!(header.id(), report.id);
    assert_eq!(parity.len() as u64, report.part_length);
    assert_eq!(parity, original_parity);
}

#[test]
fn test_two_missing_parts_cannot_recover() {
    let dir = tempdir().unwrap();
    let (parts_dir, _) = split_sample(&dir, "x.bin", &sample_bytes(500), 4);
    fs::remove_file(parts_dir.join("x.bin.001")).unwrap();
    fs::remove_file(parts_dir.join("x.bin.003")).unwrap();

    let restored = dir.path().join("restored.bin");
    let err = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap_err();

    match err {
        JoinError::CannotRecover { missing } => assert_eq!(missing, vec![1, 3]),
        other => panic!("expected CannotRecover, got {:?}", other),
    }
    assert!(err_message_mentions_rule(&parts_dir));
    assert!(!restored.exists());
}

fn err_message_mentions_rule(parts_dir: &std::path::Path) -> bool {
    let set = collect_parts(parts_dir).unwrap();
    let err = join(&set, &parts_dir.join("ignored")).unwrap_err();
    err.to_string()
        .contains("need all parts, or all but one plus parity")
}

#[test]
fn test_missing_data_and_parity_cannot_recover() {
    let dir = tempdir().unwrap();
    let (parts_dir, report) = split_sample(&dir, "x.bin", &sample_bytes(500), 4);
    fs::remove_file(parts_dir.join("x.bin.002")).unwrap();
    fs::remove_file(&report.parity).unwrap();

    let err = join(&collect_parts(&parts_dir).unwrap(), &dir.path().join("r")).unwrap_err();
    match err {
        JoinError::CannotRecover { missing } => assert_eq!(missing, vec![0, 2]),
        other => panic!("expected CannotRecover, got {:?}", other),
    }
}

/// Test: an existing file at the regeneration target is never overwritten;
/// the join still succeeds and reports a warning.
#[test]
fn test_regeneration_never_overwrites() {
    let dir = tempdir().unwrap();
    let content = sample_bytes(300);
    let (parts_dir, report) = split_sample(&dir, "k.bin", &content, 3);

    // leave `.002` out of the set, but keep a foreign file at its path
    let part2 = parts_dir.join("k.bin.002");
    fs::write(&part2, b"not a part").unwrap();
    let candidates: Vec<PathBuf> = vec![
        report.parts[0].clone(),
        report.parts[2].clone(),
        report.parity.clone(),
    ];
    let set = collect_from_candidates(candidates, None);

    let restored = dir.path().join("restored.bin");
    let join_report = join(&set, &restored).unwrap();

    assert_eq!(fs::read(&restored).unwrap(), content);
    assert_eq!(join_report.recovered_part, Some(2));
    assert_eq!(join_report.regenerated, None);
    assert_eq!(join_report.warnings.len(), 1);
    assert!(join_report.warnings[0].contains("already exists"));
    assert_eq!(fs::read(&part2).unwrap(), b"not a part");
}

#[test]
fn test_parity_regeneration_never_overwrites() {
    let dir = tempdir().unwrap();
    let content = sample_bytes(300);
    let (_, report) = split_sample(&dir, "k.bin", &content, 3);
    fs::write(&report.parity, b"keep me").unwrap();

    // the parity file no longer has a header, so the scan treats it as foreign
    let set = collect_parts(&report.parts[0]).unwrap();
    assert_eq!(set.len(), 3);

    let restored = dir.path().join("restored.bin");
    let join_report = join(&set, &restored).unwrap();

    assert_eq!(fs::read(&restored).unwrap(), content);
    assert_eq!(join_report.warnings.len(), 1);
    assert_eq!(fs::read(&report.parity).unwrap(), b"keep me");
}

/// Test: a copied part makes the header set invalid and nothing is written.
#[test]
fn test_duplicate_part_is_rejected() {
    let dir = tempdir().unwrap();
    let (parts_dir, report) = split_sample(&dir, "d.bin", &sample_bytes(100), 2);
    fs::copy(&report.parts[0], parts_dir.join("d.bin.001 (copy)")).unwrap();

    let restored = dir.path().join("restored.bin");
    let err = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap_err();

    assert!(matches!(
        err,
        JoinError::InvalidHeaderSet(HeaderSetViolation::DuplicatePart(1))
    ));
    assert!(!restored.exists());
}

/// Test: a part with extra trailing bytes is refused instead of corrupting the output.
#[test]
fn test_oversized_payload_is_rejected() {
    let dir = tempdir().unwrap();
    let (parts_dir, report) = split_sample(&dir, "o.bin", &sample_bytes(100), 4);
    let mut bytes = fs::read(&report.parts[0]).unwrap();
    bytes.push(0xAA);
    fs::write(&report.parts[0], bytes).unwrap();

    let restored = dir.path().join("restored.bin");
    let err = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap_err();
    assert!(matches!(err, JoinError::PayloadTooLong { expected: 25, .. }));
    assert!(!restored.exists());
}

/// Test: a part cut short is refused instead of shifting the rest of the output.
#[test]
fn test_truncated_payload_is_rejected() {
    let dir = tempdir().unwrap();
    let (parts_dir, report) = split_sample(&dir, "s.bin", &sample_bytes(100), 4);
    let bytes = fs::read(&report.parts[1]).unwrap();
    fs::write(&report.parts[1], &bytes[..bytes.len() - 5]).unwrap();

    let restored = dir.path().join("restored.bin");
    let err = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap_err();
    assert!(matches!(
        err,
        JoinError::PayloadLengthMismatch {
            expected: 25,
            actual: 20,
            ..
        }
    ));
    assert!(!restored.exists());
}

/// Test: a short part during recovery fails the join and no part is recreated from it.
#[test]
fn test_truncated_payload_is_not_used_for_recovery() {
    let dir = tempdir().unwrap();
    let (parts_dir, report) = split_sample(&dir, "s.bin", &sample_bytes(100), 4);
    fs::remove_file(&report.parts[3]).unwrap();
    let bytes = fs::read(&report.parts[0]).unwrap();
    fs::write(&report.parts[0], &bytes[..bytes.len() - 5]).unwrap();

    let restored = dir.path().join("restored.bin");
    let err = join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap_err();
    assert!(matches!(err, JoinError::PayloadLengthMismatch { .. }));
    assert!(!restored.exists());
    assert!(!report.parts[3].exists());
}

/// Test: processing order comes from part numbers, not file names.
#[test]
fn test_join_ignores_file_names() {
    let dir = tempdir().unwrap();
    let content = sample_bytes(777);
    let (parts_dir, report) = split_sample(&dir, "n.bin", &content, 3);
    // rename so lexical order is the reverse of part order
    fs::rename(&report.parts[0], parts_dir.join("z-first")).unwrap();
    fs::rename(&report.parts[2], parts_dir.join("a-last")).unwrap();

    let restored = dir.path().join("restored.bin");
    join(&collect_parts(&parts_dir).unwrap(), &restored).unwrap();
    assert_eq!(fs::read(&restored).unwrap(), content);
}
