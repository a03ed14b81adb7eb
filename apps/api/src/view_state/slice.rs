use serde::Serialize;

/// Load state of one independently loading slice.
///
/// A slice is never loading and failed at the same time, and a loaded value
/// is only ever replaced by a newer load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SliceState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        SliceState::Idle
    }
}

impl<T> SliceState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SliceState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SliceState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            SliceState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, SliceState::Loaded(_) | SliceState::Failed(_))
    }
}

impl<T: Default + Clone> SliceState<T> {
    /// The loaded value, or the slice's empty default for every other state.
    pub fn value_or_default(&self) -> T {
        self.data().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let failed: SliceState<u32> = SliceState::Failed("timeout".to_string());
        assert!(!failed.is_loading());
        assert_eq!(failed.error(), Some("timeout"));
        assert!(failed.data().is_none());
        assert!(failed.is_settled());

        let loading: SliceState<u32> = SliceState::Loading;
        assert!(loading.is_loading());
        assert!(loading.error().is_none());
        assert!(!loading.is_settled());
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let loaded = SliceState::Loaded(vec!["a".to_string()]);
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            json!({"status": "loaded", "value": ["a"]})
        );
        let idle: SliceState<u8> = SliceState::Idle;
        assert_eq!(serde_json::to_value(&idle).unwrap(), json!({"status": "idle"}));
    }
}
