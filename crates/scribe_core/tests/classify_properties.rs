use proptest::prelude::*;
use scribe_core::{classify, ScrollCommand, ScrollTracker, Severity};

fn random_case(word: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

fn error_keyword() -> impl Strategy<Value = String> {
    prop_oneof![random_case("error"), random_case("exception")]
}

fn warning_keyword() -> impl Strategy<Value = String> {
    prop_oneof![random_case("warning"), random_case("warn")]
}

proptest! {
    #[test]
    fn error_keywords_always_win(
        prefix in "[ -~]{0,20}",
        keyword in error_keyword(),
        noise in prop_oneof![Just(""), Just("warning"), Just("INFO"), Just("warn info")],
        suffix in "[ -~]{0,20}",
    ) {
        let line = format!("{prefix}{noise}{keyword}{noise}{suffix}");
        prop_assert_eq!(classify(&line), Severity::Error);
    }

    #[test]
    fn warning_keywords_without_error(
        prefix in "[ -~]{0,20}",
        keyword in warning_keyword(),
        suffix in "[ -~]{0,20}",
    ) {
        let line = format!("{prefix}{keyword}{suffix}");
        let lowered = line.to_lowercase();
        prop_assume!(!lowered.contains("error") && !lowered.contains("exception"));
        prop_assert_eq!(classify(&line), Severity::Warning);
    }

    #[test]
    fn pin_decision_matches_threshold(
        viewport in 50.0f64..800.0,
        extra in 0.0f64..5000.0,
        gap in 0.0f64..200.0,
    ) {
        let content = viewport + extra;
        let offset = (extra - gap).max(0.0);
        let mut tracker = ScrollTracker::new();
        tracker.on_scroll(viewport, content, offset);
        let expected = if (content - viewport - offset).abs() < 10.0 {
            ScrollCommand::ScrollToBottom
        } else {
            ScrollCommand::Stay
        };
        prop_assert_eq!(tracker.on_content_grew(), expected);
    }
}

#[test]
fn sequence_of_scrolls_uses_the_last_position() {
    let mut tracker = ScrollTracker::new();
    tracker.on_scroll(100.0, 1000.0, 100.0);
    tracker.on_scroll(100.0, 1000.0, 500.0);
    tracker.on_scroll(100.0, 1000.0, 895.0);
    assert_eq!(tracker.on_content_grew(), ScrollCommand::ScrollToBottom);

    tracker.on_scroll(100.0, 1000.0, 880.0);
    assert_eq!(tracker.on_content_grew(), ScrollCommand::Stay);

    assert_eq!(tracker.force_pin(), ScrollCommand::ScrollToBottom);
    assert_eq!(tracker.on_content_grew(), ScrollCommand::ScrollToBottom);
}
