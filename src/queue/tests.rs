//! Unit tests for the coalescing command queue

use super::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn program(bytes: &[u8]) -> Command {
    Command::LoadProgram {
        bytecode: bytes.to_vec(),
    }
}

// ============================================================================
// Kinds
// ============================================================================

#[test]
fn test_command_kind_mapping() {
    assert_eq!(Command::SetPower { is_on: true }.kind(), CommandKind::SetPower);
    assert_eq!(Command::SetBrightness { level: 3 }.kind(), CommandKind::SetBrightness);
    assert_eq!(
        Command::RaiseInterrupt { vector: 1, arg: 2 }.kind(),
        CommandKind::RaiseInterrupt
    );
    assert_eq!(program(&[]).kind(), CommandKind::LoadProgram);
}

#[test]
fn test_priority_order_is_consistent() {
    let priorities: Vec<u8> = CommandKind::BY_PRIORITY
        .iter()
        .map(|kind| kind.priority())
        .collect();
    assert_eq!(priorities, vec![3, 2, 1, 0]);
}

#[test]
fn test_load_program_debug_hides_payload() {
    let cmd = program(&[1, 2, 3]);
    assert_eq!(format!("{:?}", cmd), "LoadProgram(3 bytes)");
}

// ============================================================================
// Queue
// ============================================================================

#[test]
fn test_new_queue_is_empty() {
    let queue = CommandQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.try_pop(), None);
}

#[test]
fn test_same_kind_coalesces() {
    let queue = CommandQueue::new();
    queue.push(Command::SetBrightness { level: 10 });
    queue.push(Command::SetBrightness { level: 20 });

    assert_eq!(queue.pending(), 1);
    assert_eq!(queue.pop(), Command::SetBrightness { level: 20 });
    assert!(queue.is_empty());
}

#[test]
fn test_pop_follows_priority_not_arrival() {
    let queue = CommandQueue::new();
    queue.push(Command::SetBrightness { level: 10 });
    queue.push(Command::SetPower { is_on: true });
    queue.push(Command::RaiseInterrupt { vector: 0, arg: 7 });
    queue.push(program(&[1, 2]));

    assert_eq!(queue.pop(), program(&[1, 2]));
    assert_eq!(queue.pop(), Command::RaiseInterrupt { vector: 0, arg: 7 });
    assert_eq!(queue.pop(), Command::SetPower { is_on: true });
    assert_eq!(queue.pop(), Command::SetBrightness { level: 10 });
    assert!(queue.is_empty());
}

#[test]
fn test_lower_priority_stays_queued() {
    let queue = CommandQueue::new();
    queue.push(Command::SetBrightness { level: 10 });
    queue.push(program(&[1]));

    assert_eq!(queue.pop().kind(), CommandKind::LoadProgram);
    assert_eq!(queue.pending(), 1);
    assert_eq!(queue.try_pop(), Some(Command::SetBrightness { level: 10 }));
}

#[test]
fn test_clone_shares_queue() {
    let queue = CommandQueue::new();
    let producer = queue.clone();
    producer.push(Command::SetPower { is_on: false });
    assert_eq!(queue.try_pop(), Some(Command::SetPower { is_on: false }));
}

#[test]
fn test_pop_timeout_on_empty_queue() {
    let queue = CommandQueue::new();
    assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
}

#[test]
fn test_pop_blocks_until_push() {
    let queue = CommandQueue::new();
    let consumer = queue.clone();
    let popped = Arc::new(AtomicBool::new(false));
    let popped_clone = Arc::clone(&popped);

    let handle = thread::spawn(move || {
        let cmd = consumer.pop();
        popped_clone.store(true, Ordering::SeqCst);
        cmd
    });

    thread::sleep(Duration::from_millis(50));
    assert!(!popped.load(Ordering::SeqCst), "pop returned on an empty queue");

    queue.push(Command::RaiseInterrupt { vector: 3, arg: 65_535 });
    let cmd = handle.join().expect("consumer panicked");
    assert_eq!(cmd, Command::RaiseInterrupt { vector: 3, arg: 65_535 });
}

#[test]
fn test_competing_consumers_never_get_empty_pop() {
    let queue = CommandQueue::new();
    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let q = queue.clone();
            thread::spawn(move || q.pop_timeout(Duration::from_millis(300)))
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    queue.push(Command::SetPower { is_on: true });

    let results: Vec<_> = consumers
        .into_iter()
        .map(|h| h.join().expect("consumer panicked"))
        .collect();
    let delivered: Vec<_> = results.into_iter().flatten().collect();
    assert_eq!(delivered, vec![Command::SetPower { is_on: true }]);
}

// ============================================================================
// Idle tracking
// ============================================================================

#[test]
fn test_empty_queue_is_idle() {
    let queue = CommandQueue::new();
    assert!(queue.wait_idle_timeout(Duration::ZERO));
}

#[test]
fn test_pending_command_is_not_idle() {
    let queue = CommandQueue::new();
    queue.push(Command::SetPower { is_on: true });
    assert!(!queue.wait_idle_timeout(Duration::from_millis(20)));
}

#[test]
fn test_tracked_command_is_not_idle_until_done() {
    let queue = CommandQueue::new();
    queue.push(Command::SetBrightness { level: 3 });

    assert_eq!(queue.pop_tracked(), Command::SetBrightness { level: 3 });
    assert!(queue.is_empty());
    assert!(!queue.wait_idle_timeout(Duration::from_millis(20)));

    queue.mark_done();
    assert!(queue.wait_idle_timeout(Duration::ZERO));
}

#[test]
fn test_wait_idle_wakes_when_worker_finishes() {
    let queue = CommandQueue::new();
    let worker_queue = queue.clone();
    queue.push(program(&[1, 2, 3]));
    queue.push(Command::SetBrightness { level: 9 });

    let worker = thread::spawn(move || {
        for _ in 0..2 {
            let _cmd = worker_queue.pop_tracked();
            thread::sleep(Duration::from_millis(30));
            worker_queue.mark_done();
        }
    });

    assert!(queue.wait_idle_timeout(Duration::from_secs(5)));
    assert!(queue.is_empty());
    worker.join().unwrap();
}

// ============================================================================
// Properties
// ============================================================================

fn any_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        any::<bool>().prop_map(|is_on| Command::SetPower { is_on }),
        any::<u8>().prop_map(|level| Command::SetBrightness { level }),
        (0u8..4, any::<u16>()).prop_map(|(vector, arg)| Command::RaiseInterrupt { vector, arg }),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(|bytecode| Command::LoadProgram { bytecode }),
    ]
}

proptest! {
    #[test]
    fn prop_drain_is_priority_ordered_last_writer_wins(cmds in prop::collection::vec(any_command(), 0..32)) {
        let queue = CommandQueue::new();
        let mut latest: HashMap<CommandKind, Command> = HashMap::new();
        for cmd in cmds {
            latest.insert(cmd.kind(), cmd.clone());
            queue.push(cmd);
        }

        prop_assert_eq!(queue.pending(), latest.len());

        let mut last_priority = u8::MAX;
        while let Some(cmd) = queue.try_pop() {
            let kind = cmd.kind();
            prop_assert!(kind.priority() < last_priority);
            last_priority = kind.priority();
            prop_assert_eq!(Some(&cmd), latest.get(&kind));
        }
    }
}
