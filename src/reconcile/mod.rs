//! Keeps an editor's global indentation settings in line with the
//! configuration of the focused file.
//!
//! Some formatters read the application-wide settings instead of the view's
//! own, so while a view holds focus its resolved values are written to the
//! global store and the previous values are put back when focus leaves.
//!
//! Focus gained does not apply immediately. Hosts that open a modal dialog
//! hand focus back to the view for a moment while the dialog appears; the
//! reconciler waits for a debounce delay and only applies when the view
//! still holds focus afterwards.

mod focus;
mod store;
mod timer;

pub use focus::{FocusEvent, FocusSource, ManualFocus};
pub use store::{InMemorySettings, SettingKey, SettingValue, SettingsSnapshot, SettingsStore};
pub use timer::{ManualScheduler, Scheduler, TimerId};

use std::time::Duration;

use tracing::{debug, info};

use crate::properties::{IndentStyle, ResolvedConfiguration};

/// Environment variable overriding the debounce delay, in milliseconds.
pub const FOCUS_DELAY_ENV: &str = "EDITORCONFIG_FOCUS_DELAY";

pub const DEFAULT_FOCUS_DELAY: Duration = Duration::from_millis(500);

/// Parse a delay in milliseconds, falling back to the default.
pub fn parse_focus_delay(raw: Option<&str>) -> Duration {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_FOCUS_DELAY)
}

/// Debounce delay from `EDITORCONFIG_FOCUS_DELAY`.
pub fn focus_delay_from_env() -> Duration {
    parse_focus_delay(std::env::var(FOCUS_DELAY_ENV).ok().as_deref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Idle,
    /// Focus gained, waiting for the debounce timer.
    AwaitingConfirmation,
    /// Global settings saved and overwritten.
    Applied,
    Disposed,
}

/// Applies one file's configuration to the global settings store while its
/// view holds focus.
pub struct SettingsReconciler<S: SettingsStore, F: FocusSource, T: Scheduler> {
    store: S,
    focus: F,
    scheduler: T,
    config: Option<ResolvedConfiguration>,
    delay: Duration,
    state: ReconcilerState,
    pending: Option<TimerId>,
    snapshot: Option<SettingsSnapshot>,
}

impl<S: SettingsStore, F: FocusSource, T: Scheduler> SettingsReconciler<S, F, T> {
    /// Create a reconciler with the debounce delay taken from the
    /// environment.
    pub fn new(
        config: Option<ResolvedConfiguration>,
        store: S,
        focus: F,
        scheduler: T,
    ) -> Self {
        Self::with_delay(config, store, focus, scheduler, focus_delay_from_env())
    }

    pub fn with_delay(
        config: Option<ResolvedConfiguration>,
        store: S,
        mut focus: F,
        scheduler: T,
        delay: Duration,
    ) -> Self {
        focus.subscribe();
        if let Some(config) = &config {
            debug!(file = %config.file_name(), delay_ms = delay.as_millis() as u64, "reconciler created");
        }

        Self {
            store,
            focus,
            scheduler,
            config,
            delay,
            state: ReconcilerState::Idle,
            pending: None,
            snapshot: None,
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn config(&self) -> Option<&ResolvedConfiguration> {
        self.config.as_ref()
    }

    pub fn snapshot(&self) -> Option<&SettingsSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn focus(&self) -> &F {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut F {
        &mut self.focus
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn handle(&mut self, event: FocusEvent) {
        match event {
            FocusEvent::Gained => self.focus_gained(),
            FocusEvent::Lost => self.focus_lost(),
        }
    }

    /// Deliver an elapsed timer. Cancelled or superseded timers are ignored.
    pub fn timer_elapsed(&mut self, id: TimerId) {
        if self.state != ReconcilerState::AwaitingConfirmation || self.pending != Some(id) {
            return;
        }
        self.pending = None;

        if !self.focus.has_focus() {
            info!(
                file = %self.file_name(),
                "got focus but lost it within {} ms, skipping global settings",
                self.delay.as_millis()
            );
            self.state = ReconcilerState::Idle;
            return;
        }

        self.save();
        self.apply();
        self.state = ReconcilerState::Applied;
    }

    /// Stop reacting to focus and put back any saved settings. Calling it
    /// again does nothing.
    pub fn dispose(&mut self) {
        if self.state == ReconcilerState::Disposed {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
        self.focus.unsubscribe();
        self.restore();
        self.state = ReconcilerState::Disposed;
    }

    fn focus_gained(&mut self) {
        match self.state {
            ReconcilerState::Disposed => return,
            ReconcilerState::Applied => {
                debug!(file = %self.file_name(), "focus gained while applied, ignoring");
                return;
            }
            ReconcilerState::AwaitingConfirmation => {
                if let Some(id) = self.pending.take() {
                    self.scheduler.cancel(id);
                }
            }
            ReconcilerState::Idle => {}
        }

        if self.config.is_none() {
            return;
        }

        self.pending = Some(self.scheduler.schedule(self.delay));
        self.state = ReconcilerState::AwaitingConfirmation;
    }

    fn focus_lost(&mut self) {
        match self.state {
            ReconcilerState::AwaitingConfirmation => {
                if let Some(id) = self.pending.take() {
                    self.scheduler.cancel(id);
                }
                debug!(file = %self.file_name(), "focus lost before debounce elapsed");
                self.state = ReconcilerState::Idle;
            }
            ReconcilerState::Applied => {
                self.restore();
                self.state = ReconcilerState::Idle;
            }
            ReconcilerState::Idle | ReconcilerState::Disposed => {}
        }
    }

    fn save(&mut self) {
        let (snapshot, errors) = SettingsSnapshot::capture(&self.store);
        for err in errors {
            debug!("not saving: {err}");
        }
        info!(file = %self.file_name(), "saved global settings {snapshot}");
        self.snapshot = Some(snapshot);
    }

    /// Write the configured values. Keys missing from the snapshot are left
    /// alone, since restore could not put them back.
    fn apply(&mut self) {
        let (Some(config), Some(snapshot)) = (&self.config, &self.snapshot) else {
            return;
        };
        let store = &mut self.store;
        let mut set = |key: SettingKey, value: SettingValue| {
            if snapshot.get(key).is_some() {
                set_quietly(&mut *store, key, value);
            } else {
                debug!("not applying {key}: original value was not saved");
            }
        };

        config.if_has_key_try_setting("tab_width", |v| {
            set(SettingKey::TabSize, SettingValue::Int(v))
        });
        config.if_has_key_try_setting("indent_size", |v| {
            set(SettingKey::IndentSize, SettingValue::Int(v))
        });

        match config.indent_style() {
            Some(IndentStyle::Tab) => set(SettingKey::InsertTabs, SettingValue::Bool(true)),
            Some(IndentStyle::Space) => set(SettingKey::InsertTabs, SettingValue::Bool(false)),
            None => {}
        }
    }

    fn restore(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        if snapshot.is_empty() {
            return;
        }

        info!(file = %self.file_name(), "restored global settings {snapshot}");
        for (key, value) in snapshot.iter() {
            set_quietly(&mut self.store, key, value);
        }
    }

    fn file_name(&self) -> String {
        self.config
            .as_ref()
            .map(ResolvedConfiguration::file_name)
            .unwrap_or_default()
    }
}

impl<S: SettingsStore, F: FocusSource> SettingsReconciler<S, F, ManualScheduler> {
    /// Advance virtual time and deliver every timer that came due.
    pub fn advance(&mut self, by: Duration) {
        for id in self.scheduler.advance(by) {
            self.timer_elapsed(id);
        }
    }
}

impl<S: SettingsStore, F: FocusSource, T: Scheduler> Drop for SettingsReconciler<S, F, T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn set_quietly<S: SettingsStore>(store: &mut S, key: SettingKey, value: SettingValue) {
    if let Err(err) = store.set(key, value) {
        debug!("skipping setting: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::DeclarationFile;
    use crate::error::SettingAccessError;
    use crate::properties::merge;
    use std::path::Path;

    const MS: Duration = Duration::from_millis(1);

    type TestReconciler = SettingsReconciler<InMemorySettings, ManualFocus, ManualScheduler>;

    fn config(props: &str) -> ResolvedConfiguration {
        let file = DeclarationFile::parse(
            Path::new("/proj/.editorconfig"),
            &format!("root = true\n[*]\n{props}"),
        );
        merge(Path::new("/proj/main.rs"), &[file]).unwrap()
    }

    fn reconciler(config: Option<ResolvedConfiguration>, store: InMemorySettings) -> TestReconciler {
        let mut focus = ManualFocus::new();
        focus.set_focused(true);
        SettingsReconciler::with_delay(config, store, focus, ManualScheduler::new(), 500 * MS)
    }

    fn full_config() -> ResolvedConfiguration {
        config("tab_width = 8\nindent_size = 2\nindent_style = tab\n")
    }

    #[test]
    fn test_parse_focus_delay() {
        assert_eq!(parse_focus_delay(None), DEFAULT_FOCUS_DELAY);
        assert_eq!(parse_focus_delay(Some("250")), 250 * MS);
        assert_eq!(parse_focus_delay(Some("abc")), DEFAULT_FOCUS_DELAY);
        assert_eq!(parse_focus_delay(Some("-5")), DEFAULT_FOCUS_DELAY);
    }

    #[test]
    fn test_subscribes_on_creation() {
        let r = reconciler(None, InMemorySettings::new(4, 4, false));
        assert!(r.focus().is_subscribed());
        assert_eq!(r.state(), ReconcilerState::Idle);
    }

    #[test]
    fn test_apply_then_restore_round_trip() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        assert_eq!(r.state(), ReconcilerState::AwaitingConfirmation);
        r.advance(500 * MS);

        assert_eq!(r.state(), ReconcilerState::Applied);
        assert_eq!(r.store().value(SettingKey::TabSize), Some(SettingValue::Int(8)));
        assert_eq!(r.store().value(SettingKey::IndentSize), Some(SettingValue::Int(2)));
        assert_eq!(r.store().value(SettingKey::InsertTabs), Some(SettingValue::Bool(true)));
        assert_eq!(r.snapshot().map(SettingsSnapshot::len), Some(3));

        r.focus_mut().set_focused(false);
        r.handle(FocusEvent::Lost);

        assert_eq!(r.state(), ReconcilerState::Idle);
        assert!(r.snapshot().is_none());
        assert_eq!(r.store().render(), InMemorySettings::new(4, 4, false).render());
    }

    #[test]
    fn test_short_focus_never_touches_store() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        r.advance(200 * MS);
        r.handle(FocusEvent::Lost);
        r.advance(1000 * MS);

        assert_eq!(r.state(), ReconcilerState::Idle);
        assert_eq!(r.store().writes(), 0);
        assert!(r.snapshot().is_none());
    }

    #[test]
    fn test_timer_without_focus_aborts() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        r.focus_mut().set_focused(false);
        r.advance(500 * MS);

        assert_eq!(r.state(), ReconcilerState::Idle);
        assert_eq!(r.store().writes(), 0);
    }

    #[test]
    fn test_regained_focus_restarts_debounce() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        r.advance(300 * MS);
        r.handle(FocusEvent::Gained);
        r.advance(300 * MS);
        assert_eq!(r.state(), ReconcilerState::AwaitingConfirmation);

        r.advance(200 * MS);
        assert_eq!(r.state(), ReconcilerState::Applied);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        let stale = r.scheduler_mut().schedule(0 * MS);
        r.timer_elapsed(stale);

        assert_eq!(r.state(), ReconcilerState::AwaitingConfirmation);
        assert_eq!(r.store().writes(), 0);
    }

    #[test]
    fn test_only_valid_values_are_applied() {
        let cfg = config("tab_width = 3\nindent_size = abc\nindent_style = mixed\n");
        let mut r = reconciler(Some(cfg), InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        r.advance(500 * MS);

        assert_eq!(r.store().writes(), 1);
        assert_eq!(r.store().value(SettingKey::TabSize), Some(SettingValue::Int(3)));
        assert_eq!(r.store().value(SettingKey::IndentSize), Some(SettingValue::Int(4)));
        assert_eq!(r.store().value(SettingKey::InsertTabs), Some(SettingValue::Bool(false)));
    }

    #[test]
    fn test_space_style_clears_insert_tabs() {
        let mut r = reconciler(
            Some(config("indent_style = space\n")),
            InMemorySettings::new(4, 4, true),
        );

        r.handle(FocusEvent::Gained);
        r.advance(500 * MS);

        assert_eq!(r.store().value(SettingKey::InsertTabs), Some(SettingValue::Bool(false)));
    }

    #[test]
    fn test_without_configuration_is_a_no_op() {
        let mut r = reconciler(None, InMemorySettings::new(4, 4, false));

        r.handle(FocusEvent::Gained);
        assert_eq!(r.state(), ReconcilerState::Idle);
        assert_eq!(r.scheduler_mut().pending(), 0);

        r.advance(1000 * MS);
        r.handle(FocusEvent::Lost);
        assert_eq!(r.store().writes(), 0);
    }

    #[test]
    fn test_unsupported_setting_is_skipped() {
        let store = InMemorySettings::new(4, 4, false).unsupported(SettingKey::InsertTabs);
        let mut r = reconciler(Some(full_config()), store);

        r.handle(FocusEvent::Gained);
        r.advance(500 * MS);
        assert_eq!(r.state(), ReconcilerState::Applied);
        assert_eq!(r.store().value(SettingKey::TabSize), Some(SettingValue::Int(8)));
        assert_eq!(r.snapshot().map(SettingsSnapshot::len), Some(2));

        r.handle(FocusEvent::Lost);
        assert_eq!(r.store().value(SettingKey::TabSize), Some(SettingValue::Int(4)));
        assert_eq!(r.store().value(SettingKey::IndentSize), Some(SettingValue::Int(4)));
    }

    #[test]
    fn test_dispose_restores_once_and_unsubscribes() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));
        r.handle(FocusEvent::Gained);
        r.advance(500 * MS);
        let writes_after_apply = r.store().writes();

        r.dispose();
        assert_eq!(r.state(), ReconcilerState::Disposed);
        assert_eq!(r.store().writes(), writes_after_apply + 3);
        assert_eq!(r.store().render(), InMemorySettings::new(4, 4, false).render());
        assert!(!r.focus().is_subscribed());

        r.dispose();
        assert_eq!(r.store().writes(), writes_after_apply + 3);
        assert_eq!(r.focus().unsubscribe_calls(), 1);

        r.handle(FocusEvent::Gained);
        r.advance(500 * MS);
        assert_eq!(r.state(), ReconcilerState::Disposed);
        assert_eq!(r.store().writes(), writes_after_apply + 3);
    }

    #[test]
    fn test_dispose_cancels_pending_timer() {
        let mut r = reconciler(Some(full_config()), InMemorySettings::new(4, 4, false));
        r.handle(FocusEvent::Gained);
        r.dispose();

        assert_eq!(r.scheduler_mut().pending(), 0);
        r.advance(500 * MS);
        assert_eq!(r.store().writes(), 0);
    }

    #[test]
    fn test_drop_restores_borrowed_store() {
        let mut store = InMemorySettings::new(4, 4, false);
        {
            let mut focus = ManualFocus::new();
            focus.set_focused(true);
            let mut r = SettingsReconciler::with_delay(
                Some(full_config()),
                &mut store,
                focus,
                ManualScheduler::new(),
                500 * MS,
            );
            r.handle(FocusEvent::Gained);
            r.advance(500 * MS);
            assert_eq!(r.state(), ReconcilerState::Applied);
        }

        assert_eq!(store.value(SettingKey::TabSize), Some(SettingValue::Int(4)));
        assert_eq!(store.value(SettingKey::InsertTabs), Some(SettingValue::Bool(false)));
        assert_eq!(store.writes(), 6);
    }

    /// Accepts writes for every key but cannot report `IndentSize`.
    struct BlindIndent(InMemorySettings);

    impl SettingsStore for BlindIndent {
        fn get(&self, key: SettingKey) -> Result<SettingValue, SettingAccessError> {
            if key == SettingKey::IndentSize {
                return Err(SettingAccessError {
                    key,
                    reason: "write only".into(),
                });
            }
            self.0.get(key)
        }

        fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingAccessError> {
            self.0.set(key, value)
        }
    }

    #[test]
    fn test_unreadable_setting_is_not_applied() {
        let mut focus = ManualFocus::new();
        focus.set_focused(true);
        let mut r = SettingsReconciler::with_delay(
            Some(config("indent_size = 2\ntab_width = 8\n")),
            BlindIndent(InMemorySettings::new(4, 4, false)),
            focus,
            ManualScheduler::new(),
            500 * MS,
        );

        r.handle(FocusEvent::Gained);
        r.advance(500 * MS);
        assert_eq!(r.state(), ReconcilerState::Applied);
        assert_eq!(r.store().0.value(SettingKey::TabSize), Some(SettingValue::Int(8)));
        assert_eq!(r.store().0.value(SettingKey::IndentSize), Some(SettingValue::Int(4)));

        r.focus_mut().set_focused(false);
        r.handle(FocusEvent::Lost);
        assert_eq!(r.store().0.render(), InMemorySettings::new(4, 4, false).render());
    }
}
