//! Dry run of one editor focus session against in-memory global settings

use std::time::Duration;

use crate::config::Baseline;
use crate::properties::ResolvedConfiguration;
use crate::reconcile::{FocusEvent, ManualFocus, ManualScheduler, SettingsReconciler};

/// Global settings before, while focused, and whether focus loss put them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOutcome {
    pub before: String,
    pub applied: String,
    pub restored: bool,
}

/// Focus the view, let the debounce delay pass, then take focus away.
pub fn preview_session(
    resolved: ResolvedConfiguration,
    baseline: Baseline,
    delay: Duration,
) -> PreviewOutcome {
    let mut store = baseline.to_store();
    let before = store.render();

    let mut focus = ManualFocus::new();
    focus.set_focused(true);

    let applied = {
        let mut reconciler = SettingsReconciler::with_delay(
            Some(resolved),
            &mut store,
            focus,
            ManualScheduler::new(),
            delay,
        );
        reconciler.handle(FocusEvent::Gained);
        reconciler.advance(delay);
        let applied = reconciler.store().render();

        reconciler.focus_mut().set_focused(false);
        reconciler.handle(FocusEvent::Lost);
        applied
    };

    let restored = store.render() == before;
    PreviewOutcome {
        before,
        applied,
        restored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::DeclarationFile;
    use crate::properties::merge;
    use std::path::Path;

    fn resolved(props: &str) -> ResolvedConfiguration {
        let file = DeclarationFile::parse(
            Path::new("/proj/.editorconfig"),
            &format!("[*]\n{props}"),
        );
        merge(Path::new("/proj/Makefile"), &[file]).unwrap()
    }

    #[test]
    fn test_preview_applies_and_restores() {
        let outcome = preview_session(
            resolved("indent_style = tab\ntab_width = 8\n"),
            Baseline::default(),
            Duration::from_millis(500),
        );

        assert_eq!(outcome.before, "TabSize = 4\nIndentSize = 4\nInsertTabs = false\n");
        assert_eq!(outcome.applied, "TabSize = 8\nIndentSize = 4\nInsertTabs = true\n");
        assert!(outcome.restored);
    }

    #[test]
    fn test_preview_with_nothing_to_apply() {
        let outcome = preview_session(
            resolved("charset = utf-8\n"),
            Baseline::default(),
            Duration::ZERO,
        );
        assert_eq!(outcome.before, outcome.applied);
        assert!(outcome.restored);
    }
}
