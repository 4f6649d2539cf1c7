//! Tests for simulated time and deferred task flushing

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};
use stk_application::Scope;
use stk_domain::error::Error;
use stk_domain::ports::{HostEnvironment, TaskScheduler};
use stk_infrastructure::{MockTimeout, SimulatedClock};

fn timeout() -> (Scope, MockTimeout) {
    let root = Scope::new_root(10);
    let timeout = MockTimeout::new(root.clone(), Rc::new(SimulatedClock::new()));
    (root, timeout)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let make = move |tag: &'static str| -> Box<dyn FnOnce()> {
        let sink = Rc::clone(&sink);
        Box::new(move || sink.borrow_mut().push(tag))
    };
    (log, make)
}

#[test]
fn test_tasks_wait_for_flush() {
    let (_root, timeout) = timeout();
    let (log, task) = recorder();
    timeout.schedule(ms(10), task("a"));

    assert!(log.borrow().is_empty());
    assert_eq!(timeout.pending_count(), 1);
    timeout.flush(None).unwrap();
    assert_eq!(*log.borrow(), vec!["a"]);
    assert_eq!(timeout.clock().now(), ms(10));
}

#[test]
fn test_tasks_run_by_due_time_then_schedule_order() {
    let (_root, timeout) = timeout();
    let (log, task) = recorder();
    timeout.schedule(ms(20), task("late"));
    timeout.schedule(ms(5), task("early"));
    timeout.schedule(ms(20), task("late-second"));

    timeout.flush(None).unwrap();
    assert_eq!(*log.borrow(), vec!["early", "late", "late-second"]);
}

#[test]
fn test_flush_with_delay_runs_only_due_tasks() {
    let (_root, timeout) = timeout();
    let (log, task) = recorder();
    timeout.schedule(ms(10), task("soon"));
    timeout.schedule(ms(100), task("later"));

    timeout.flush(Some(ms(50))).unwrap();
    assert_eq!(*log.borrow(), vec!["soon"]);
    assert_eq!(timeout.clock().now(), ms(50));
    assert!(matches!(
        timeout.verify_no_pending_tasks(),
        Err(Error::PendingTasks { count: 1 })
    ));

    timeout.flush(Some(ms(50))).unwrap();
    assert_eq!(*log.borrow(), vec!["soon", "later"]);
    timeout.verify_no_pending_tasks().unwrap();
}

#[test]
fn test_flush_without_tasks_or_delay_fails() {
    let (_root, timeout) = timeout();
    assert!(matches!(timeout.flush(None), Err(Error::NoPendingTasks)));
    assert!(timeout.flush(Some(ms(1))).is_ok());
}

#[test]
fn test_cancelled_task_never_runs() {
    let (_root, timeout) = timeout();
    let (log, task) = recorder();
    let id = timeout.schedule(ms(10), task("cancelled"));
    timeout.schedule(ms(10), task("kept"));

    assert!(timeout.cancel(id));
    assert!(!timeout.cancel(id));
    timeout.flush(None).unwrap();
    assert_eq!(*log.borrow(), vec!["kept"]);
}

#[test]
fn test_task_scheduled_by_task_runs_if_due() {
    let root = Scope::new_root(10);
    let timeout = Rc::new(MockTimeout::new(root, Rc::new(SimulatedClock::new())));
    let (log, task) = recorder();
    let inner = task("inner");
    let outer = task("outer");
    let scheduler = Rc::clone(&timeout);
    timeout.defer(ms(10), move || {
        outer();
        scheduler.schedule(ms(5), inner);
    });

    timeout.flush(Some(ms(20))).unwrap();
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    assert_eq!(timeout.clock().now(), ms(20));
}

#[test]
fn test_flush_digests_root_scope() {
    let (root, timeout) = timeout();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    root.watch(
        "status",
        |scope| scope.get("status").unwrap_or(Value::Null),
        move |new, _, _| log.borrow_mut().push(new.clone()),
    );
    root.digest().unwrap();

    let target = root.clone();
    timeout.defer(ms(100), move || target.set("status", json!("done")));
    timeout.flush(None).unwrap();

    assert_eq!(*seen.borrow(), vec![Value::Null, json!("done")]);
}
