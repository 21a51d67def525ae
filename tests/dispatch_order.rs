//! Integration tests for handler chain ordering, cancellation and fault
//! isolation.

mod common;

use common::{TestInstance, chat, count};
use parking_lot::Mutex;
use std::sync::Arc;
use tileguard::config::InstanceSettings;
use tileguard::handlers::{
    Context, DispatchEvent, Handler, HandlerError, HandlerResult, Outcome, Priority, Registry,
};
use tileguard_proto::{MessageKind, Packet};

#[derive(Clone, Copy)]
enum Action {
    Pass,
    Cancel,
    Stop,
    Overwrite,
    Fail,
    Panic,
}

/// Appends its label to a shared log, then performs `action`.
struct Probe {
    label: &'static str,
    action: Action,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Handler for Probe {
    fn handle(&self, _ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
        self.log.lock().push(self.label);
        match self.action {
            Action::Pass => {}
            Action::Cancel => event.cancel(),
            Action::Stop => {
                event.cancel();
                event.stop_propagation = true;
            }
            Action::Overwrite => event.overwrite(),
            Action::Fail => return Err(HandlerError::Internal("probe failure".into())),
            Action::Panic => panic!("probe panic"),
        }
        Ok(())
    }
}

struct Harness {
    t: TestInstance,
    log: Arc<Mutex<Vec<&'static str>>>,
    talker: u8,
    listener: u8,
}

/// Built-in validators plus probes on the chat chain.
fn harness(probes: &[(&'static str, Priority, Action)]) -> Harness {
    let registry = Registry::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for &(label, priority, action) in probes {
        registry.register(
            MessageKind::ChatText,
            Probe {
                label,
                action,
                log: log.clone(),
            },
            priority,
        );
    }
    let mut t = TestInstance::build(InstanceSettings::named("test"), registry);
    let listener = t.join("listener");
    let talker = t.join("talker");
    t.out.clear();
    Harness {
        t,
        log,
        talker,
        listener,
    }
}

fn chats(h: &Harness) -> usize {
    count(&h.t.sent_to(h.listener), |p| matches!(p, Packet::Chat { .. }))
}

#[test]
fn chain_runs_highest_priority_first() {
    let mut h = harness(&[
        ("low", Priority::Low, Action::Pass),
        ("higher", Priority::Higher, Action::Pass),
        ("normal", Priority::Normal, Action::Pass),
        ("high", Priority::High, Action::Pass),
        ("higher-2", Priority::Higher, Action::Pass),
    ]);

    assert_eq!(h.t.send(h.talker, chat("hello")), Outcome::Continue);
    assert_eq!(
        *h.log.lock(),
        vec!["higher", "higher-2", "high", "normal", "low"]
    );
    assert_eq!(chats(&h), 1);
}

#[test]
fn cancel_lets_later_handlers_run_but_skips_the_effect() {
    let mut h = harness(&[
        ("veto", Priority::High, Action::Cancel),
        ("audit", Priority::Low, Action::Pass),
    ]);

    assert_eq!(h.t.send(h.talker, chat("hello")), Outcome::Cancel);
    assert_eq!(*h.log.lock(), vec!["veto", "audit"]);
    assert_eq!(chats(&h), 0);
}

#[test]
fn stop_propagation_ends_the_chain() {
    let mut h = harness(&[
        ("gate", Priority::Higher, Action::Stop),
        ("audit", Priority::Low, Action::Pass),
    ]);

    assert_eq!(h.t.send(h.talker, chat("hello")), Outcome::Cancel);
    assert_eq!(*h.log.lock(), vec!["gate"]);
    assert_eq!(chats(&h), 0);
}

#[test]
fn overwrite_skips_the_default_effect() {
    let mut h = harness(&[("rewrite", Priority::High, Action::Overwrite)]);

    assert_eq!(h.t.send(h.talker, chat("hello")), Outcome::Overwrite);
    assert_eq!(chats(&h), 0);
}

#[test]
fn handler_error_cancels_and_stops() {
    let mut h = harness(&[
        ("broken", Priority::High, Action::Fail),
        ("audit", Priority::Low, Action::Pass),
    ]);

    assert_eq!(h.t.send(h.talker, chat("hello")), Outcome::Cancel);
    assert_eq!(*h.log.lock(), vec!["broken"]);
    assert_eq!(chats(&h), 0);
    // The sender stays connected.
    assert!(h.t.instance.session(h.talker).is_some());
}

#[test]
fn handler_panic_is_contained() {
    let mut h = harness(&[
        ("explodes", Priority::Higher, Action::Panic),
        ("audit", Priority::Low, Action::Pass),
    ]);

    assert_eq!(h.t.send(h.talker, chat("hello")), Outcome::Cancel);
    assert_eq!(*h.log.lock(), vec!["explodes"]);
    assert!(h.t.instance.session(h.talker).is_some());

    // Other kinds keep flowing.
    let outcome = h.t.send(
        h.talker,
        tileguard_proto::Payload::LoadoutSwitch(tileguard_proto::message::LoadoutSwitch {
            player: h.talker,
            index: 1,
        }),
    );
    assert_eq!(outcome, Outcome::Continue);
}

#[test]
fn builtin_validator_still_applies_under_probes() {
    let mut h = harness(&[("audit", Priority::Low, Action::Pass)]);

    let long = "x".repeat(600);
    assert_eq!(h.t.send(h.talker, chat(&long)), Outcome::Cancel);
    assert_eq!(*h.log.lock(), vec!["audit"]);
    assert_eq!(chats(&h), 0);
}

#[test]
fn dispatch_counts_every_message() {
    let mut h = harness(&[]);
    for _ in 0..3 {
        h.t.send(h.talker, chat("hi"));
    }
    let stats = h.t.instance.registry().dispatch_stats();
    let chat_count = stats
        .iter()
        .find(|(kind, _)| *kind == MessageKind::ChatText)
        .map(|(_, n)| *n);
    assert_eq!(chat_count, Some(3));
}
