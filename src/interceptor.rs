//! Channel interception.
//!
//! The game page owns its socket. We never create it and never change what
//! it sends; we only need to see what it receives. The first real `send` on
//! a channel is the signal that the channel is live, so that is where the
//! frame observer is attached.
//!
//! ```text
//! host code ── send(frame) ──► InterceptedChannel
//!                                 │ first send on this instance?
//!                                 ├─ yes: channel.observe(sink.observer())   (fail-soft)
//!                                 └─ always: channel.send(frame) → host result
//! ```
//!
//! The gate belongs to each channel instance, so a reconnect gets its own
//! observer.

use std::cell::Cell;

use crate::error::ObserveError;

/// Callback receiving every inbound binary frame.
pub type FrameObserver = Box<dyn FnMut(&[u8])>;

/// A host-owned bidirectional channel.
pub trait Channel {
    type SendError;

    fn send(&self, frame: &[u8]) -> Result<(), Self::SendError>;

    /// Register `observer` for every inbound binary frame on this channel.
    fn observe(&self, observer: FrameObserver) -> Result<(), ObserveError>;
}

/// Produces the observer that is attached to each intercepted channel.
pub trait FrameSink {
    fn observer(&self) -> FrameObserver;
}

// ---------------------------------------------------------------------------
// ChannelHook
// ---------------------------------------------------------------------------

/// Explicit on-create capability handed to whatever constructs channels.
#[derive(Debug, Clone)]
pub struct ChannelHook<S> {
    sink: S,
}

impl<S: FrameSink + Clone> ChannelHook<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Wrap a freshly created channel. The observer is attached on its first
    /// send.
    pub fn on_create<C: Channel>(&self, channel: C) -> InterceptedChannel<C, S> {
        InterceptedChannel {
            inner: channel,
            sink: self.sink.clone(),
            gate: Cell::new(Gate::Armed),
        }
    }

    /// Attach the observer right away. Failures are logged and reported as
    /// `false`; they never propagate to the host.
    pub fn attach<C: Channel + ?Sized>(&self, channel: &C) -> bool {
        attach_observer(channel, &self.sink)
    }
}

fn attach_observer<C, S>(channel: &C, sink: &S) -> bool
where
    C: Channel + ?Sized,
    S: FrameSink,
{
    match channel.observe(sink.observer()) {
        Ok(()) => {
            log::debug!("[interceptor] observer attached");
            true
        }
        Err(e) => {
            log::warn!("[interceptor] {}; channel traffic continues unobserved", e);
            false
        }
    }
}

// ---------------------------------------------------------------------------
// InterceptedChannel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// No send yet.
    Armed,
    /// Observer attached on first send.
    Observing,
    /// Attaching failed on first send. Not retried.
    Failed,
}

pub struct InterceptedChannel<C, S> {
    inner: C,
    sink: S,
    gate: Cell<Gate>,
}

impl<C: Channel, S: FrameSink> InterceptedChannel<C, S> {
    /// Send through the wrapped channel, attaching the observer first if
    /// this is the first send on this instance. The inner result is returned
    /// untouched whether or not attaching worked.
    pub fn send(&self, frame: &[u8]) -> Result<(), C::SendError> {
        if self.gate.get() == Gate::Armed {
            let next = if attach_observer(&self.inner, &self.sink) {
                Gate::Observing
            } else {
                Gate::Failed
            };
            self.gate.set(next);
        }
        self.inner.send(frame)
    }

    pub fn gate(&self) -> Gate {
        self.gate.get()
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeChannel {
        sent: RefCell<Vec<Vec<u8>>>,
        observers: RefCell<Vec<FrameObserver>>,
        refuse_observe: bool,
    }

    impl FakeChannel {
        fn deliver(&self, frame: &[u8]) {
            for obs in self.observers.borrow_mut().iter_mut() {
                obs(frame);
            }
        }
    }

    impl Channel for FakeChannel {
        type SendError = ();

        fn send(&self, frame: &[u8]) -> Result<(), ()> {
            self.sent.borrow_mut().push(frame.to_vec());
            Ok(())
        }

        fn observe(&self, observer: FrameObserver) -> Result<(), ObserveError> {
            if self.refuse_observe {
                return Err(ObserveError::new("refused"));
            }
            self.observers.borrow_mut().push(observer);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Collector(Rc<RefCell<Vec<Vec<u8>>>>);

    impl FrameSink for Collector {
        fn observer(&self) -> FrameObserver {
            let frames = self.0.clone();
            Box::new(move |f: &[u8]| frames.borrow_mut().push(f.to_vec()))
        }
    }

    #[test]
    fn first_send_attaches_exactly_once() {
        let hook = ChannelHook::new(Collector::default());
        let ch = hook.on_create(FakeChannel::default());
        assert_eq!(ch.gate(), Gate::Armed);
        assert!(ch.inner().observers.borrow().is_empty());

        ch.send(b"a").unwrap();
        ch.send(b"b").unwrap();
        ch.send(b"c").unwrap();

        assert_eq!(ch.gate(), Gate::Observing);
        assert_eq!(ch.inner().observers.borrow().len(), 1);
        assert_eq!(ch.inner().sent.borrow().len(), 3);
    }

    #[test]
    fn nothing_is_observed_before_first_send() {
        let sink = Collector::default();
        let hook = ChannelHook::new(sink.clone());
        let ch = hook.on_create(FakeChannel::default());
        ch.inner().deliver(b"early");
        assert!(sink.0.borrow().is_empty());

        ch.send(b"hello").unwrap();
        ch.inner().deliver(b"late");
        assert_eq!(*sink.0.borrow(), vec![b"late".to_vec()]);
    }

    #[test]
    fn sends_are_delegated_unchanged() {
        let hook = ChannelHook::new(Collector::default());
        let ch = hook.on_create(FakeChannel::default());
        ch.send(&[1, 2, 3]).unwrap();
        ch.send(&[]).unwrap();
        assert_eq!(*ch.inner().sent.borrow(), vec![vec![1, 2, 3], vec![]]);
    }

    #[test]
    fn observe_failure_does_not_block_send() {
        let hook = ChannelHook::new(Collector::default());
        let ch = hook.on_create(FakeChannel {
            refuse_observe: true,
            ..Default::default()
        });
        assert!(ch.send(b"x").is_ok());
        assert!(ch.send(b"y").is_ok());
        assert_eq!(ch.gate(), Gate::Failed);
        assert_eq!(ch.inner().sent.borrow().len(), 2);
    }

    #[test]
    fn each_instance_has_its_own_gate() {
        let sink = Collector::default();
        let hook = ChannelHook::new(sink.clone());
        let first = hook.on_create(FakeChannel::default());
        let second = hook.on_create(FakeChannel::default());

        first.send(b"1").unwrap();
        second.send(b"2").unwrap();
        first.inner().deliver(b"from-first");
        second.inner().deliver(b"from-second");

        assert_eq!(sink.0.borrow().len(), 2);
    }

    #[test]
    fn attach_reports_failure_without_panicking() {
        let hook = ChannelHook::new(Collector::default());
        assert!(hook.attach(&FakeChannel::default()));
        assert!(!hook.attach(&FakeChannel {
            refuse_observe: true,
            ..Default::default()
        }));
    }
}
