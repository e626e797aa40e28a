//! Transcript reconciler: fold classified deltas into the message list
//!
//! The reconciler decides, per delta, whether to append to the current
//! assistant message or to start a new one. Each contiguous run of
//! same-channel fragments becomes exactly one transcript message.

use crate::protocol::{Channel, Delta, Message, Transcript};

/// Result of folding one delta into the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldResult {
    /// Whether the fold appended a new message (as opposed to extending
    /// the active target in place)
    pub appended: bool,
}

/// Cursor over the message currently receiving appended content
#[derive(Debug, Clone, Copy)]
struct ActiveTarget {
    /// Index of the target message in the caller's transcript
    index: usize,

    /// Channel the target was created for
    channel: Channel,
}

/// State machine that folds a delta sequence into an ordered message list
///
/// States are `no-active-target` and `active-target(channel)`. A turn
/// always begins fresh: create one reconciler per send, never reuse it
/// across user turns.
#[derive(Debug, Default)]
pub struct Reconciler {
    active: Option<ActiveTarget>,
}

impl Reconciler {
    /// Create a reconciler in the `no-active-target` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel of the current active target, if one exists
    pub fn active_channel(&self) -> Option<Channel> {
        self.active.map(|target| target.channel)
    }

    /// Fold one delta into the transcript
    ///
    /// Appends a new assistant message when there is no active target or
    /// the channel changed; otherwise extends the active target in place
    /// (same message identity, transcript length unchanged). The caller
    /// must not reorder or truncate the transcript between folds.
    pub fn fold(&mut self, transcript: &mut Transcript, delta: &Delta) -> FoldResult {
        match self.active {
            Some(target) if target.channel == delta.channel => {
                transcript[target.index].content.push_str(&delta.text);
                FoldResult { appended: false }
            }
            _ => {
                transcript.push(Message::assistant(delta.text.clone(), delta.channel));
                self.active = Some(ActiveTarget {
                    index: transcript.len() - 1,
                    channel: delta.channel,
                });
                FoldResult { appended: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Role;

    fn delta(text: &str, channel: Channel) -> Delta {
        Delta {
            text: text.into(),
            channel,
        }
    }

    #[test]
    fn test_first_delta_appends() {
        let mut reconciler = Reconciler::new();
        let mut transcript = vec![Message::user("hi")];

        let result = reconciler.fold(&mut transcript, &delta("hello", Channel::Response));

        assert!(result.appended);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].channel, Some(Channel::Response));
    }

    #[test]
    fn test_same_channel_extends_in_place() {
        let mut reconciler = Reconciler::new();
        let mut transcript = Vec::new();

        reconciler.fold(&mut transcript, &delta("hel", Channel::Response));
        let result = reconciler.fold(&mut transcript, &delta("lo", Channel::Response));

        assert!(!result.appended);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content, "hello");
    }

    #[test]
    fn test_channel_switch_starts_new_message() {
        let mut reconciler = Reconciler::new();
        let mut transcript = Vec::new();

        reconciler.fold(
            &mut transcript,
            &delta("**Reasoning** thinking", Channel::Reasoning),
        );
        let result = reconciler.fold(&mut transcript, &delta("answer", Channel::Response));

        assert!(result.appended);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].channel, Some(Channel::Reasoning));
        assert_eq!(transcript[1].channel, Some(Channel::Response));
    }

    #[test]
    fn test_switch_back_creates_third_message() {
        let mut reconciler = Reconciler::new();
        let mut transcript = Vec::new();

        reconciler.fold(&mut transcript, &delta("**Reasoning** a", Channel::Reasoning));
        reconciler.fold(&mut transcript, &delta("b", Channel::Response));
        reconciler.fold(&mut transcript, &delta("**Reasoning** c", Channel::Reasoning));

        assert_eq!(transcript.len(), 3);
        assert_eq!(reconciler.active_channel(), Some(Channel::Reasoning));
    }

    #[test]
    fn test_fresh_reconciler_has_no_target() {
        let reconciler = Reconciler::new();
        assert_eq!(reconciler.active_channel(), None);
    }

    #[test]
    fn test_target_indexes_past_existing_history() {
        let mut reconciler = Reconciler::new();
        let mut transcript = vec![
            Message::user("first question"),
            Message::assistant("first answer", Channel::Response),
            Message::user("second question"),
        ];

        reconciler.fold(&mut transcript, &delta("second ", Channel::Response));
        reconciler.fold(&mut transcript, &delta("answer", Channel::Response));

        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[3].content, "second answer");
        // Earlier messages untouched
        assert_eq!(transcript[1].content, "first answer");
    }
}
