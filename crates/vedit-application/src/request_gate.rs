//! Single in-flight request guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// `Idle -> Busy -> Idle` transition for edit requests.
///
/// [`RequestGate::try_begin`] flips the gate to busy and hands out a ticket;
/// dropping the ticket returns it to idle. At most one ticket exists at a time.
#[derive(Debug, Default)]
pub struct RequestGate {
    busy: AtomicBool,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if a request is already outstanding.
    pub fn try_begin(&self) -> Option<RequestTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RequestTicket { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the single in-flight slot.
#[derive(Debug)]
pub struct RequestTicket<'a> {
    gate: &'a RequestGate,
}

impl Drop for RequestTicket<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_ticket_at_a_time() {
        let gate = RequestGate::new();
        assert!(!gate.is_busy());

        let ticket = gate.try_begin().expect("idle gate should open");
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());

        drop(ticket);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_ticket_released_on_panic_unwind() {
        let gate = RequestGate::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ticket = gate.try_begin().unwrap();
            panic!("request failed");
        }));
        assert!(result.is_err());
        assert!(!gate.is_busy());
    }
}
