//! Editor focus notifications

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    Gained,
    Lost,
}

/// The editing view whose aggregate focus drives the reconciler.
pub trait FocusSource {
    /// Whether the view holds focus right now.
    fn has_focus(&self) -> bool;

    fn subscribe(&mut self);

    fn unsubscribe(&mut self);
}

/// Focus state set directly by the caller.
#[derive(Debug, Default, Clone)]
pub struct ManualFocus {
    focused: bool,
    subscribed: bool,
    unsubscribe_calls: usize,
}

impl ManualFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls
    }
}

impl FocusSource for ManualFocus {
    fn has_focus(&self) -> bool {
        self.focused
    }

    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.unsubscribe_calls += 1;
    }
}
