//! Conversation context management
//!
//! This module tracks, per user, where they are in the menu tree and which
//! admin dialogue (scenario and step) they are in, with any collected data.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Duration};

use crate::utils::errors::{MenuGateError, Result};

/// Position of a user inside the menu tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Button whose children are on screen; `None` means root
    pub current_parent: Option<i64>,
}

impl NavigationState {
    pub fn at_root() -> Self {
        Self { current_parent: None }
    }

    pub fn at(parent: Option<i64>) -> Self {
        Self { current_parent: parent }
    }

    pub fn is_root(&self) -> bool {
        self.current_parent.is_none()
    }
}

/// User conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    /// User ID this context belongs to
    pub user_id: i64,
    /// Menu position
    #[serde(default)]
    pub navigation: NavigationState,
    /// Current admin dialogue
    pub scenario: Option<String>,
    /// Current step within the dialogue
    pub step: Option<String>,
    /// Dialogue data collected so far
    pub data: HashMap<String, serde_json::Value>,
    /// When the dialogue expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Last time anything in this context changed
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create a new conversation context for a user
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            navigation: NavigationState::default(),
            scenario: None,
            step: None,
            data: HashMap::new(),
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Move the user to another menu level
    pub fn set_navigation(&mut self, navigation: NavigationState) {
        self.navigation = navigation;
        self.updated_at = Utc::now();
    }

    /// Start a new scenario
    pub fn start_scenario(&mut self, scenario: &str, initial_step: &str) -> Result<()> {
        self.scenario = Some(scenario.to_string());
        self.step = Some(initial_step.to_string());
        self.data.clear();
        self.updated_at = Utc::now();
        self.expires_at = Some(Utc::now() + Duration::hours(1));
        Ok(())
    }

    /// Move to the next step in the current scenario
    pub fn next_step(&mut self, step: &str) -> Result<()> {
        if self.scenario.is_none() {
            return Err(MenuGateError::InvalidStateTransition {
                from: "no_scenario".to_string(),
                to: step.to_string(),
            });
        }

        self.step = Some(step.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Complete the current scenario and clear its data.
    ///
    /// The menu position is kept.
    pub fn complete_scenario(&mut self) {
        self.scenario = None;
        self.step = None;
        self.data.clear();
        self.expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Cancel the current scenario
    pub fn cancel_scenario(&mut self) {
        self.complete_scenario();
    }

    /// Whether any dialogue is active
    pub fn has_scenario(&self) -> bool {
        self.scenario.is_some() && !self.is_expired()
    }

    /// Set data for the current context
    pub fn set_data<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.data.insert(key.to_string(), json_value);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Get data from the current context
    pub fn get_data<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        if let Some(value) = self.data.get(key) {
            let result: T = serde_json::from_value(value.clone())?;
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }

    /// Get string data (convenience method)
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_data::<String>(key).unwrap_or(None)
    }

    /// Get integer data (convenience method)
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_data::<i64>(key).unwrap_or(None)
    }

    /// Remove data from context
    pub fn remove_data(&mut self, key: &str) -> Option<serde_json::Value> {
        self.updated_at = Utc::now();
        self.data.remove(key)
    }

    /// Check if the dialogue has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }

    /// Whether nothing has touched this context for longer than `idle`
    pub fn is_idle(&self, idle: Duration) -> bool {
        Utc::now() - self.updated_at > idle
    }

    /// Set custom expiry time
    pub fn set_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Check if user is in a specific scenario
    pub fn is_in_scenario(&self, scenario: &str) -> bool {
        self.scenario.as_ref().map_or(false, |s| s == scenario)
    }

    /// Check if user is at a specific step
    pub fn is_at_step(&self, step: &str) -> bool {
        self.step.as_ref().map_or(false, |s| s == step)
    }

    /// Check if user is in a specific scenario and step
    pub fn is_at(&self, scenario: &str, step: &str) -> bool {
        self.is_in_scenario(scenario) && self.is_at_step(step)
    }

    /// Get current scenario and step as tuple
    pub fn current_state(&self) -> (Option<&str>, Option<&str>) {
        (
            self.scenario.as_deref(),
            self.step.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context() {
        let context = ConversationContext::new(123);
        assert_eq!(context.user_id, 123);
        assert!(context.navigation.is_root());
        assert!(context.scenario.is_none());
        assert!(!context.has_scenario());
    }

    #[test]
    fn test_scenario_keeps_navigation() {
        let mut context = ConversationContext::new(1);
        context.set_navigation(NavigationState::at(Some(5)));
        context.start_scenario("button_add", "pick_parent").unwrap();
        context.set_data("parent_id", 3i64).unwrap();
        assert_eq!(context.get_i64("parent_id"), Some(3));
        assert!(context.is_at("button_add", "pick_parent"));

        context.complete_scenario();
        assert!(context.data.is_empty());
        assert!(context.scenario.is_none());
        assert_eq!(context.navigation.current_parent, Some(5));
    }

    #[test]
    fn test_next_step_requires_scenario() {
        let mut context = ConversationContext::new(1);
        assert!(context.next_step("title").is_err());
    }

    #[test]
    fn test_expiry_and_idle() {
        let mut context = ConversationContext::new(1);
        context.start_scenario("broadcast", "await_message").unwrap();
        context.set_expiry(Utc::now() - Duration::minutes(1));
        assert!(context.is_expired());
        assert!(!context.has_scenario());

        context.updated_at = Utc::now() - Duration::hours(2);
        assert!(context.is_idle(Duration::hours(1)));
        assert!(!context.is_idle(Duration::hours(3)));
    }

    #[test]
    fn test_serde_round_trip_defaults_navigation() {
        let json = serde_json::json!({
            "user_id": 9,
            "scenario": null,
            "step": null,
            "data": {},
            "expires_at": null,
            "updated_at": Utc::now(),
        });
        let context: ConversationContext = serde_json::from_value(json).unwrap();
        assert!(context.navigation.is_root());
    }
}
