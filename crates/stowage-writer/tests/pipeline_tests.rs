// SPDX-FileCopyrightText: 2026 Stowage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests against the mock connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use stowage_core::{ExecutionStage, StowageError};
use stowage_test_utils::{
    ConnectionEvent, FactoryProbe, MockConnection, MockProbe, RecordingFactory, TestRecord,
};
use stowage_writer::{AsyncRecordWriter, EXECUTOR_THREAD_NAME, WriterConfig};

type TestWriter = AsyncRecordWriter<MockConnection, RecordingFactory, TestRecord>;

fn build(conn: MockConnection, factory: RecordingFactory, rows: usize, statements: usize) -> TestWriter {
    AsyncRecordWriter::new(WriterConfig::new(rows, statements).unwrap(), conn, factory)
}

fn harness(rows: usize, statements: usize) -> (TestWriter, MockProbe, FactoryProbe) {
    let (conn, probe) = MockConnection::new();
    let (factory, builds) = RecordingFactory::new();
    (build(conn, factory, rows, statements), probe, builds)
}

fn wait_for(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn seven_records_three_per_statement_two_per_transaction() {
    let (mut writer, probe, builds) = harness(3, 2);
    for id in 1..=7 {
        writer.write(&TestRecord::new(id)).unwrap();
    }
    writer.close().unwrap();

    assert_eq!(builds.batch_sizes(), vec![3, 3, 1]);
    assert_eq!(
        probe.executed(),
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]
    );

    // Commit after the second statement (counter reached 2) and once at close.
    let order: Vec<&str> = probe
        .events()
        .iter()
        .filter_map(|e| match e {
            ConnectionEvent::Executed { .. } => Some("exec"),
            ConnectionEvent::Committed => Some("commit"),
            ConnectionEvent::Closed => Some("close"),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["exec", "exec", "commit", "exec", "commit", "close"]);
}

#[test]
fn empty_writer_commits_and_closes() {
    let (mut writer, probe, builds) = harness(3, 2);
    writer.close().unwrap();

    assert!(builds.builds().is_empty());
    assert!(probe.executed().is_empty());
    assert_eq!(probe.commit_count(), 1);
    assert_eq!(probe.close_count(), 1);
}

#[test]
fn statements_execute_on_executor_thread_with_factory_mode() {
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let mut writer = build(conn, factory.batched(), 2, 5);
    for id in 1..=4 {
        writer.write(&TestRecord::new(id)).unwrap();
    }
    writer.close().unwrap();

    let events = probe.events();
    let executed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ConnectionEvent::Executed { .. }))
        .collect();
    assert_eq!(executed.len(), 2);
    for event in executed {
        match event {
            ConnectionEvent::Executed { batched, thread, .. } => {
                assert!(*batched);
                assert_eq!(thread.as_deref(), Some(EXECUTOR_THREAD_NAME));
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn buffered_record_is_independent_of_caller_copy() {
    let (mut writer, probe, _) = harness(2, 10);
    let mut record = TestRecord::new(1);
    writer.write(&record).unwrap();
    record.id = 99;
    writer.write(&record).unwrap();
    writer.close().unwrap();

    assert_eq!(probe.executed(), vec![vec![1, 99]]);
}

#[test]
fn close_is_idempotent() {
    let (mut writer, probe, _) = harness(2, 2);
    writer.write(&TestRecord::new(1)).unwrap();
    writer.close().unwrap();
    writer.close().unwrap();
    writer.close().unwrap();

    assert_eq!(probe.close_count(), 1);
    assert_eq!(probe.commit_count(), 1);
    assert_eq!(probe.executed(), vec![vec![1]]);
}

#[test]
fn copy_failure_leaves_buffer_unchanged() {
    let (mut writer, probe, builds) = harness(2, 2);
    writer.write(&TestRecord::new(1)).unwrap();

    let err = writer.write(&TestRecord::uncopyable(2)).unwrap_err();
    assert!(matches!(err.cause(), StowageError::RecordCopy { .. }));
    assert_eq!(writer.buffered(), 1);
    assert!(!writer.is_started());

    writer.write(&TestRecord::new(3)).unwrap();
    writer.close().unwrap();
    assert_eq!(builds.builds(), vec![vec![1, 3]]);
    assert_eq!(probe.executed(), vec![vec![1, 3]]);
}

#[test]
fn execute_failure_surfaces_on_next_flush_and_drains() {
    let (gate_tx, gate_rx) = mpsc::channel();
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let mut writer = build(conn.gated(gate_rx).fail_execute_on(1), factory, 1, 1);

    // Executor holds statement 1 at the gate, so no error exists yet.
    writer.write(&TestRecord::new(1)).unwrap();
    gate_tx.send(()).unwrap();

    // The handoff only completes once statement 1 has failed.
    let err = writer.write(&TestRecord::new(2)).unwrap_err();
    assert!(matches!(
        err.cause(),
        StowageError::Execution {
            stage: ExecutionStage::Execute,
            ..
        }
    ));

    // Later writes keep failing with the same error and never block.
    let again = writer.write(&TestRecord::new(3)).unwrap_err();
    assert_eq!(again.to_string(), err.to_string());

    let closed = writer.close().unwrap_err();
    assert_eq!(closed.to_string(), err.to_string());

    assert!(probe.executed().is_empty());
    assert_eq!(probe.commit_count(), 0);
    assert_eq!(probe.release_count(), 3);
    assert_eq!(probe.close_count(), 1);
}

#[test]
fn first_error_wins_over_later_failures() {
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let mut writer = build(conn.fail_execute_on(1).fail_release(), factory, 1, 1);

    let _ = writer.write(&TestRecord::new(1));
    let _ = writer.write(&TestRecord::new(2));
    let err = writer.close().unwrap_err();

    match err.cause() {
        StowageError::Execution { stage, source } => {
            assert_eq!(*stage, ExecutionStage::Execute);
            assert_eq!(source.to_string(), "execution 1 rejected");
        }
        other => panic!("expected Execution error, got {other:?}"),
    }
    assert_eq!(probe.close_count(), 1);
}

#[test]
fn commit_failure_surfaces_at_close() {
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let mut writer = build(conn.fail_commit_on(1), factory, 5, 100);

    writer.write(&TestRecord::new(1)).unwrap();
    let err = writer.close().unwrap_err();

    assert!(matches!(
        err.cause(),
        StowageError::Execution {
            stage: ExecutionStage::Commit,
            ..
        }
    ));
    assert_eq!(probe.close_count(), 1);
}

#[test]
fn build_failure_is_sticky_and_never_grows_a_batch() {
    let (conn, probe) = MockConnection::new();
    let (factory, builds) = RecordingFactory::new();
    let mut writer = build(conn, factory.fail_on_build(1), 2, 1);

    writer.write(&TestRecord::new(1)).unwrap();
    let err = writer.write(&TestRecord::new(2)).unwrap_err();
    assert!(matches!(err.cause(), StowageError::StatementBuild { .. }));
    assert_eq!(writer.buffered(), 0);

    // Later writes report the same failure without buffering or building.
    for id in 3..=5 {
        let again = writer.write(&TestRecord::new(id)).unwrap_err();
        assert_eq!(again.to_string(), err.to_string());
    }
    assert_eq!(writer.buffered(), 0);

    let closed = writer.close().unwrap_err();
    assert_eq!(closed.to_string(), err.to_string());

    assert_eq!(builds.batch_sizes(), vec![2]);
    assert!(builds.batch_sizes().iter().all(|&size| size <= 2));
    assert!(probe.executed().is_empty());
    assert_eq!(probe.commit_count(), 0);
    assert_eq!(probe.close_count(), 1);
}

#[test]
fn build_failure_at_close_still_closes_connection() {
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let mut writer = build(conn.fail_close(), factory.fail_on_build(1), 10, 10);

    writer.write(&TestRecord::new(1)).unwrap();
    let err = writer.close().unwrap_err();

    // The build failure takes precedence over the close failure.
    assert!(matches!(err.cause(), StowageError::StatementBuild { .. }));
    assert_eq!(probe.close_count(), 1);
    assert!(probe.executed().is_empty());
}

#[test]
fn close_failure_is_reported() {
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let mut writer = build(conn.fail_close(), factory, 10, 10);

    writer.write(&TestRecord::new(1)).unwrap();
    let err = writer.close().unwrap_err();
    assert!(matches!(err.cause(), StowageError::Shutdown { .. }));

    writer.close().unwrap();
    assert_eq!(probe.close_count(), 1);
    assert_eq!(probe.executed(), vec![vec![1]]);
}

#[test]
fn producer_blocks_while_executor_is_busy() {
    let (gate_tx, gate_rx) = mpsc::channel();
    let (conn, probe) = MockConnection::new();
    let (factory, _) = RecordingFactory::new();
    let writer = build(conn.gated(gate_rx), factory, 1, 10);

    let completed = Arc::new(AtomicUsize::new(0));
    let progress = Arc::clone(&completed);
    let producer = thread::spawn(move || {
        let mut writer = writer;
        for id in 1..=3 {
            writer.write(&TestRecord::new(id)).unwrap();
            progress.fetch_add(1, Ordering::SeqCst);
        }
        writer
    });

    // Statement 1 is accepted, then held at the gate; write 2 cannot complete.
    assert!(wait_for(Duration::from_secs(5), || completed.load(Ordering::SeqCst) >= 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(completed.load(Ordering::SeqCst), 1);

    // Releasing statement 1 lets the executor take statement 2.
    gate_tx.send(()).unwrap();
    assert!(wait_for(Duration::from_secs(5), || completed.load(Ordering::SeqCst) >= 2));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(completed.load(Ordering::SeqCst), 2);

    drop(gate_tx);
    let mut writer = producer.join().unwrap();
    writer.close().unwrap();
    assert_eq!(probe.executed(), vec![vec![1], vec![2], vec![3]]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Records are partitioned into ceil(N/T) statements in write order, and
    /// every statement-per-transaction boundary plus close commits exactly once.
    #[test]
    fn statements_partition_records_in_order(
        count in 0u32..40,
        rows in 1usize..8,
        statements in 1usize..5,
    ) {
        let (mut writer, probe, builds) = harness(rows, statements);
        for id in 0..count {
            writer.write(&TestRecord::new(id)).unwrap();
        }
        writer.close().unwrap();

        let n = count as usize;
        let executed = probe.executed();
        prop_assert_eq!(executed.len(), n.div_ceil(rows));
        prop_assert_eq!(builds.builds(), executed.clone());

        let flattened: Vec<u32> = executed.iter().flatten().copied().collect();
        prop_assert_eq!(flattened, (0..count).collect::<Vec<_>>());
        for batch in executed.iter().rev().skip(1) {
            prop_assert_eq!(batch.len(), rows);
        }

        let full_statements = n / rows;
        prop_assert_eq!(probe.commit_count(), full_statements / statements + 1);
        prop_assert_eq!(probe.close_count(), 1);
    }
}
