#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{signal_container, SCHEMA_VERSION};
use imxdiff_core::{ImxError, LedgerEntry, MultiRepository, Severity};

#[test]
fn test_critical_entry_raised_on_drain() {
    // S1: duplicates are recorded during ingestion, raised when drained
    let repo = signal_container("c-1", SCHEMA_VERSION, &[("s1", "A"), ("s1", "B")]);
    assert!(repo.ledger().has_critical());

    let mut sink: Vec<LedgerEntry> = Vec::new();
    let err = repo.drain_ledger(&mut sink).unwrap_err();

    assert!(matches!(err, ImxError::CriticalDiagnostic { ref puic, .. } if puic == "s1"));
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].severity, Severity::Critical);
    assert_eq!(repo.ledger().len(), 1);
}

#[test]
fn test_clean_repository_drains_nothing() {
    let repo = signal_container("c-1", SCHEMA_VERSION, &[("s1", "A")]);
    let mut sink: Vec<LedgerEntry> = Vec::new();
    assert_eq!(repo.drain_ledger(&mut sink).unwrap(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_merged_ledger_keeps_container_entries() {
    let a = signal_container("a", SCHEMA_VERSION, &[("s1", "A"), ("s1", "B")]);
    let b = signal_container("b", SCHEMA_VERSION, &[("s1", "A"), ("s1", "B")]);
    let mut multi = MultiRepository::from_repositories(&[&a, &b], true).unwrap();

    assert_eq!(multi.ledger().len(), 2);
    let containers: Vec<&str> = multi
        .ledger()
        .entries()
        .iter()
        .filter_map(|e| e.container_id.as_ref().map(|c| c.as_str()))
        .collect();
    assert_eq!(containers, vec!["a", "b"]);

    multi.remove_container(a.container_id()).unwrap();
    assert_eq!(multi.ledger().len(), 1);
}
