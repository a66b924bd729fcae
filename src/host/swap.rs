use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const IDLE: usize = usize::MAX;

/// Single-slot mailbox for effect selections plus the generation counter the
/// control side polls to notice completed swaps.
///
/// Any thread may deposit a request; only the audio thread consumes. A second
/// request before the first is consumed replaces it.
pub struct SwapController {
    pending: AtomicUsize,
    generation: AtomicU64,
}

impl Default for SwapController {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapController {
    pub const fn new() -> Self {
        Self {
            pending: AtomicUsize::new(IDLE),
            generation: AtomicU64::new(0),
        }
    }

    pub fn request_swap(&self, index: usize) {
        // usize::MAX is the idle marker; it is out of range for any registry
        // anyway, so fold it onto the next value and let the consumer reject it.
        let index = index.min(IDLE - 1);
        self.pending.store(index, Ordering::Release);
    }

    /// Claim and clear the pending selection. Audio thread only.
    pub fn try_consume_swap(&self) -> Option<usize> {
        match self.pending.swap(IDLE, Ordering::AcqRel) {
            IDLE => None,
            index => Some(index),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) != IDLE
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Mark a swap as complete. Everything written before this call is
    /// visible to a reader that observes the new generation.
    pub(crate) fn publish(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Release) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_idle_by_default() {
        let swap = SwapController::new();
        assert!(!swap.is_pending());
        assert_eq!(swap.try_consume_swap(), None);
        assert_eq!(swap.generation(), 0);
    }

    #[test]
    fn test_consume_clears_request() {
        let swap = SwapController::new();
        swap.request_swap(3);
        assert!(swap.is_pending());
        assert_eq!(swap.try_consume_swap(), Some(3));
        assert_eq!(swap.try_consume_swap(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let swap = SwapController::new();
        swap.request_swap(1);
        swap.request_swap(2);
        swap.request_swap(0);
        assert_eq!(swap.try_consume_swap(), Some(0));
        assert_eq!(swap.try_consume_swap(), None);
    }

    #[test]
    fn test_idle_marker_is_not_a_valid_request() {
        let swap = SwapController::new();
        swap.request_swap(usize::MAX);
        assert_eq!(swap.try_consume_swap(), Some(usize::MAX - 1));
    }

    #[test]
    fn test_publish_increments_generation() {
        let swap = SwapController::new();
        assert_eq!(swap.publish(), 1);
        assert_eq!(swap.publish(), 2);
        assert_eq!(swap.generation(), 2);
    }

    #[test]
    fn test_requests_from_other_threads_are_seen() {
        let swap = Arc::new(SwapController::new());
        let writer = Arc::clone(&swap);

        thread::spawn(move || writer.request_swap(5))
            .join()
            .unwrap();

        assert_eq!(swap.try_consume_swap(), Some(5));
    }
}
