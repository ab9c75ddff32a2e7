use crate::error::Result;
use chrono::{DateTime, Utc};

/// Observable state of one polling provider.
///
/// `data` only ever changes on a successful fetch; a failed fetch keeps the
/// previous value around so consumers can keep showing it next to the error.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
}

impl<T> ProviderState<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            last_success: None,
        }
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// Apply the outcome of one fetch
    pub fn record(&mut self, outcome: Result<T>) {
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.last_success = Some(Utc::now());
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }
}

impl<T> Default for ProviderState<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FishcastError;

    #[test]
    fn starts_loading_without_data() {
        let state: ProviderState<u32> = ProviderState::new();
        assert!(state.loading);
        assert!(state.data.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut state = ProviderState::new();
        state.record(Ok(vec![1, 2, 3]));
        state.begin_fetch();
        state.record(Err(FishcastError::UpstreamUnavailable(
            "tides returned 503".into(),
        )));

        assert_eq!(state.data, Some(vec![1, 2, 3]));
        assert_eq!(
            state.error.as_deref(),
            Some("Upstream unavailable: tides returned 503")
        );
        assert!(!state.loading);
        assert!(state.is_stale());
    }

    #[test]
    fn failure_before_any_success_leaves_data_absent() {
        let mut state: ProviderState<Vec<u32>> = ProviderState::new();
        state.record(Err(FishcastError::ConfigurationMissing("api key".into())));
        assert!(state.data.is_none());
        assert!(state.error.is_some());
        assert!(!state.loading);
        assert!(!state.is_stale());
    }

    #[test]
    fn success_clears_error_and_replaces_data() {
        let mut state = ProviderState::new();
        state.record(Ok(vec![1, 2, 3]));
        state.record(Err(FishcastError::UpstreamMalformed("bad".into())));
        state.record(Ok(vec![9]));

        assert_eq!(state.data, Some(vec![9]));
        assert!(state.error.is_none());
        assert!(state.last_success.is_some());
    }
}
