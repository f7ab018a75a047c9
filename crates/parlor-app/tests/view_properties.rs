//! Property-based tests for the view state machine.
//!
//! Invariants must hold under arbitrary event sequences: the badge never
//! renders above its cap, scroll commands only fire when the viewer is
//! (or just became) pinned to the bottom, and the one-time instant scroll
//! happens at most once per screen.

use parlor_app::{App, AppAction, AppEvent, Viewport};
use parlor_proto::GatewayError;
use proptest::prelude::*;

fn arbitrary_event() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        ((0u32..1000), (0u32..1000)).prop_map(|(top, bottom)| AppEvent::Scrolled {
            top_offset_px: top,
            bottom_offset_px: bottom,
        }),
        "[a-z ]{0,20}".prop_map(|text| AppEvent::ComposeChanged { text }),
        Just(AppEvent::Submit),
        Just(AppEvent::DismissNotice),
        (1usize..100).prop_map(|count| AppEvent::Loaded { count }),
        any::<bool>().prop_map(|own| AppEvent::MessageAppended { own }),
        (1usize..31).prop_map(|count| AppEvent::MessagesPrepended { count }),
        Just(AppEvent::MessageUpdated),
        "[a-z ]{1,10}".prop_map(|body| AppEvent::SendFailed {
            body,
            failure: parlor_client::SendFailure::Transient {
                error: GatewayError { status: 500, error: "boom".into(), code: None },
            },
        }),
        any::<bool>().prop_map(|live| AppEvent::ConnectionChanged { live }),
    ]
}

proptest! {
    #[test]
    fn badge_never_exceeds_cap(events in proptest::collection::vec(arbitrary_event(), 0..200)) {
        let mut app = App::new();

        for event in events {
            app.handle(event);
            if let Some(badge) = app.unread_badge() {
                let shown: u32 = badge.trim_start_matches('+').parse().unwrap_or(0);
                prop_assert!(shown >= 1 && shown <= 9);
                if badge.starts_with('+') {
                    prop_assert_eq!(badge.as_str(), "+9");
                }
            }
        }
    }

    #[test]
    fn scroll_commands_only_when_pinned(
        events in proptest::collection::vec(arbitrary_event(), 0..200)
    ) {
        let mut app = App::new();

        for event in events {
            let actions = app.handle(event);
            if actions.iter().any(|a| matches!(a, AppAction::ScrollToBottom { .. })) {
                // A scroll command always lands the viewer at the bottom.
                prop_assert_eq!(app.viewport(), Viewport::AtBottom);
                prop_assert_eq!(app.unread_badge(), None);
            }
        }
    }

    #[test]
    fn instant_scroll_happens_at_most_once(
        events in proptest::collection::vec(arbitrary_event(), 0..200)
    ) {
        let mut app = App::new();
        let mut instant_scrolls = 0usize;

        for event in events {
            for action in app.handle(event) {
                if action == (AppAction::ScrollToBottom { smooth: false }) {
                    instant_scrolls += 1;
                }
            }
        }

        prop_assert!(instant_scrolls <= 1);
    }

    #[test]
    fn badge_clears_whenever_viewer_reaches_bottom(
        events in proptest::collection::vec(arbitrary_event(), 0..200)
    ) {
        let mut app = App::new();

        for event in events {
            app.handle(event);
            if app.viewport() == Viewport::AtBottom {
                prop_assert_eq!(app.unread_badge(), None);
            }
        }
    }
}
