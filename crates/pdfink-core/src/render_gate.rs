//! Generation tokens that discard stale render results.

/// Ticket identifying one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Monotonic counter of render requests.
///
/// Every new request invalidates all earlier tickets, so a page render that
/// completes after the user has already zoomed or navigated again is
/// dropped instead of painting over the newer view.
#[derive(Debug, Default)]
pub struct RenderGate {
    current: u64,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating every earlier ticket.
    pub fn issue(&mut self) -> RenderTicket {
        self.current += 1;
        RenderTicket(self.current)
    }

    /// Invalidate outstanding tickets without issuing a new one.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.0 == self.current
    }
}
