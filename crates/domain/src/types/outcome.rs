//! Classified result of one publish attempt

/// What a publish attempt concluded, and what recovery it needs.
///
/// The scheduler branches on this instead of inspecting raw response
/// codes; the publisher is the only place that reads the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Accepted in full; the sequence counter has been advanced.
    Success,
    /// Transient failure (transport error or unexpected code); retry
    /// the same attempt later, nothing was changed.
    RetryableTransient(String),
    /// Session token rejected; a relogin was initiated, retry after.
    RetryableAfterReauth,
    /// Sequence drift; the counter was realigned to the gateway's
    /// expectation, retry with the corrected value.
    RetryableAfterResync {
        /// Sequence number the gateway said it expects next.
        expected: u64,
    },
    /// Unrecoverable for this payload; do not retry.
    Fatal(String),
}

impl PushOutcome {
    /// True when the scheduler may attempt the same publish again.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RetryableTransient(_) | Self::RetryableAfterReauth | Self::RetryableAfterResync { .. }
        )
    }

    /// Short stable label for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::RetryableTransient(_) => "retryable_transient",
            Self::RetryableAfterReauth => "retryable_after_reauth",
            Self::RetryableAfterResync { .. } => "retryable_after_resync",
            Self::Fatal(_) => "fatal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_outcomes_are_not_retryable() {
        assert!(!PushOutcome::Success.is_retryable());
        assert!(!PushOutcome::Fatal("bad payload".to_owned()).is_retryable());
    }

    #[test]
    fn recovery_outcomes_are_retryable() {
        assert!(PushOutcome::RetryableTransient("timeout".to_owned()).is_retryable());
        assert!(PushOutcome::RetryableAfterReauth.is_retryable());
        assert!(PushOutcome::RetryableAfterResync { expected: 9 }.is_retryable());
    }
}
