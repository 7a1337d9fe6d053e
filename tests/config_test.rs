//! Tests for loading game configuration from disk.

use std::io::Write;
use strictly_lasers::{GameConfig, OwnTargetRule, PieceKind, Session, Side};

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
width = 10
height = 9
mirror_layout = false
own_target_rule = "pass_through"
max_moves = 40

[reserve]
blockers = 0
double_mirrors = 2
"#
    )
    .unwrap();

    let config = GameConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.width(), 10);
    assert_eq!(*config.height(), 9);
    assert!(!*config.mirror_layout());
    assert_eq!(*config.own_target_rule(), OwnTargetRule::PassThrough);
    assert_eq!(config.rules().max_moves, Some(40));
    assert_eq!(config.reserve().remaining(PieceKind::Blocker), 0);
    assert_eq!(config.reserve().remaining(PieceKind::DoubleMirror), 2);

    let session = Session::from_config(
        "cfg".to_string(),
        ("a".to_string(), "A".to_string()),
        ("b".to_string(), "B".to_string()),
        &config,
    )
    .unwrap();
    let board = session.game().board();
    assert_eq!((board.width(), board.height()), (10, 9));
    // Flip layout puts B's emitter straight below A's.
    assert_eq!(board.emitter_of(Side::B).map(|(cell, _)| cell.col), Some(0));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GameConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "width = \"wide\"").unwrap();
    let err = GameConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}
