//! Page chrome suppression while dialogs are open.
//!
//! Every open dialog holds a [`SuppressionToken`]. The first token hides the
//! page header and locks body scrolling; the chrome goes back to what it was
//! before only when the last token is gone, however each one was released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Visibility of the shared page chrome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChromeState {
    pub header_hidden: bool,
    pub scroll_locked: bool,
}

impl ChromeState {
    const SUPPRESSED: ChromeState = ChromeState {
        header_hidden: true,
        scroll_locked: true,
    };
}

#[derive(Debug, Default)]
struct Stack {
    depth: usize,
    current: ChromeState,
    saved: Option<ChromeState>,
}

#[derive(Debug, Clone, Default)]
pub struct ModalStack {
    inner: Arc<Mutex<Stack>>,
}

impl ModalStack {
    pub fn new(initial: ChromeState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Stack {
                current: initial,
                ..Stack::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Stack> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn acquire(&self) -> SuppressionToken {
        let mut stack = self.lock();
        if stack.depth == 0 {
            stack.saved = Some(stack.current);
            stack.current = ChromeState::SUPPRESSED;
        }
        stack.depth += 1;

        SuppressionToken {
            stack: self.clone(),
            released: false,
        }
    }

    pub fn chrome(&self) -> ChromeState {
        self.lock().current
    }

    pub fn depth(&self) -> usize {
        self.lock().depth
    }

    fn pop(&self) {
        let mut stack = self.lock();
        stack.depth = stack.depth.saturating_sub(1);
        if stack.depth == 0 {
            if let Some(saved) = stack.saved.take() {
                stack.current = saved;
            }
        }
    }
}

/// One open dialog's claim on the chrome. Dropping it releases the claim.
#[derive(Debug)]
#[must_use = "the dialog closes as soon as its token is dropped"]
pub struct SuppressionToken {
    stack: ModalStack,
    released: bool,
}

impl SuppressionToken {
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.stack.pop();
        }
    }
}

impl Drop for SuppressionToken {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_token_suppresses_chrome() {
        let stack = ModalStack::default();
        assert_eq!(stack.chrome(), ChromeState::default());

        let token = stack.acquire();
        assert!(stack.chrome().header_hidden);
        assert!(stack.chrome().scroll_locked);

        token.release();
        assert_eq!(stack.chrome(), ChromeState::default());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn chrome_returns_only_after_last_token() {
        let stack = ModalStack::default();
        let outer = stack.acquire();
        let inner = stack.acquire();

        drop(outer);
        assert_eq!(stack.depth(), 1);
        assert!(stack.chrome().header_hidden);

        drop(inner);
        assert_eq!(stack.depth(), 0);
        assert!(!stack.chrome().header_hidden);
    }

    #[test]
    fn prior_state_is_restored_exactly() {
        let prior = ChromeState {
            header_hidden: false,
            scroll_locked: true,
        };
        let stack = ModalStack::new(prior);

        {
            let _a = stack.acquire();
            let _b = stack.acquire();
            assert_eq!(stack.chrome(), ChromeState::SUPPRESSED);
        }

        assert_eq!(stack.chrome(), prior);
    }

    #[test]
    fn release_then_drop_pops_once() {
        let stack = ModalStack::default();
        let keep = stack.acquire();
        let token = stack.acquire();

        token.release();
        assert_eq!(stack.depth(), 1);
        assert!(stack.chrome().header_hidden);

        drop(keep);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn tokens_released_on_another_thread_still_count() {
        let stack = ModalStack::default();
        let token = stack.acquire();

        std::thread::spawn(move || drop(token)).join().unwrap();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.chrome(), ChromeState::default());
    }
}
