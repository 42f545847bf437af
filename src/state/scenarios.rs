//! Conversation scenarios implementation
//!
//! Admin panel dialogues are short multi-step scenarios. Each scenario lists
//! its steps, the allowed transitions between them and how typed input is
//! validated at every step.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::utils::errors::{MenuGateError, Result};
use super::context::ConversationContext;

/// Scenario and step identifiers
pub mod ids {
    pub const CHANNEL_ADD: &str = "channel_add";
    pub const STEP_ASK_ID: &str = "ask_id";
    pub const STEP_CHOOSE_MODE: &str = "choose_mode";
    pub const STEP_ASK_LINK: &str = "ask_link";

    pub const BUTTON_ADD: &str = "button_add";
    pub const STEP_PICK_PARENT: &str = "pick_parent";
    pub const STEP_TITLE: &str = "title";

    pub const BUTTON_RENAME: &str = "button_rename";
    pub const STEP_NEW_TITLE: &str = "new_title";

    pub const CONTENT_ADD: &str = "content_add";
    pub const STEP_AWAIT_CONTENT: &str = "await_content";

    pub const ADMIN_ADD: &str = "admin_add";
    pub const ADMIN_REMOVE: &str = "admin_remove";
    pub const STEP_AWAIT_ID: &str = "await_id";

    pub const BROADCAST: &str = "broadcast";
    pub const STEP_AWAIT_MESSAGE: &str = "await_message";
}

/// Represents a conversation scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Initial step when starting this scenario
    pub initial_step: String,
    /// All possible steps in this scenario
    pub steps: HashMap<String, ScenarioStep>,
    /// Maximum duration for this scenario (in seconds)
    pub max_duration: Option<u64>,
}

/// Represents a step within a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Step identifier
    pub id: String,
    /// Possible next steps from this step
    pub next_steps: Vec<String>,
    /// Validation rules for typed input
    pub validation: Option<StepValidation>,
}

/// Validation rules for a scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepValidation {
    /// Input type expected
    pub input_type: InputType,
    /// Minimum length in characters
    pub min_length: Option<usize>,
    /// Maximum length in characters
    pub max_length: Option<usize>,
    /// Pattern to match (regex)
    pub pattern: Option<String>,
    /// Custom validation message
    pub error_message: Option<String>,
}

/// Types of input expected in a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputType {
    Text,
    Number,
    Link,
    /// Any message, including media; not validated as text
    Any,
}

/// Scenario manager for handling all admin dialogues
#[derive(Debug, Clone)]
pub struct ScenarioManager {
    scenarios: HashMap<String, Scenario>,
}

impl ScenarioManager {
    /// Create a new scenario manager with default scenarios
    pub fn new() -> Self {
        let mut manager = Self {
            scenarios: HashMap::new(),
        };

        manager.register_default_scenarios();
        manager
    }

    /// Register all default scenarios
    fn register_default_scenarios(&mut self) {
        self.register_scenario(create_channel_add_scenario());
        self.register_scenario(create_button_add_scenario());
        self.register_scenario(create_button_rename_scenario());
        self.register_scenario(create_content_add_scenario());
        self.register_scenario(create_admin_id_scenario(ids::ADMIN_ADD, "Add admin", true));
        self.register_scenario(create_admin_id_scenario(ids::ADMIN_REMOVE, "Remove admin", false));
        self.register_scenario(create_broadcast_scenario());
    }

    /// Register a new scenario
    pub fn register_scenario(&mut self, scenario: Scenario) {
        self.scenarios.insert(scenario.id.clone(), scenario);
    }

    /// Get a scenario by ID
    pub fn get_scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    /// Start a scenario for a user
    pub fn start_scenario(&self, context: &mut ConversationContext, scenario_id: &str) -> Result<()> {
        let scenario = self.get_scenario(scenario_id)
            .ok_or_else(|| MenuGateError::InvalidInput(format!("Unknown scenario: {}", scenario_id)))?;

        context.start_scenario(scenario_id, &scenario.initial_step)?;

        if let Some(max_duration) = scenario.max_duration {
            let expiry = chrono::Utc::now() + chrono::Duration::seconds(max_duration as i64);
            context.set_expiry(expiry);
        }

        Ok(())
    }

    /// Move to the next step in a scenario
    pub fn next_step(&self, context: &mut ConversationContext, next_step: &str) -> Result<()> {
        let current_step = self.get_current_step(context).map_err(|_| {
            MenuGateError::InvalidStateTransition {
                from: context.step.clone().unwrap_or_else(|| "no_step".to_string()),
                to: next_step.to_string(),
            }
        })?;

        if !current_step.next_steps.iter().any(|s| s == next_step) {
            return Err(MenuGateError::InvalidStateTransition {
                from: current_step.id.clone(),
                to: next_step.to_string(),
            });
        }

        context.next_step(next_step)?;
        Ok(())
    }

    /// Validate user input for the current step
    pub fn validate_input(&self, context: &ConversationContext, input: &str) -> Result<()> {
        let step = self.get_current_step(context)?;

        if let Some(validation) = &step.validation {
            validate_input_against_rules(input, validation)?;
        }

        Ok(())
    }

    /// Get the current step information
    pub fn get_current_step(&self, context: &ConversationContext) -> Result<&ScenarioStep> {
        let scenario_id = context.scenario.as_ref()
            .ok_or_else(|| MenuGateError::InvalidInput("No active scenario".to_string()))?;

        let step_id = context.step.as_ref()
            .ok_or_else(|| MenuGateError::InvalidInput("No active step".to_string()))?;

        let scenario = self.get_scenario(scenario_id)
            .ok_or_else(|| MenuGateError::InvalidInput(format!("Unknown scenario: {}", scenario_id)))?;

        scenario.steps.get(step_id)
            .ok_or_else(|| MenuGateError::InvalidInput(format!("Unknown step: {}", step_id)))
    }
}

/// Validate input against validation rules
fn validate_input_against_rules(input: &str, validation: &StepValidation) -> Result<()> {
    let length = input.chars().count();

    if let Some(min_length) = validation.min_length {
        if length < min_length {
            return Err(MenuGateError::InvalidInput(
                validation.error_message.clone()
                    .unwrap_or_else(|| format!("Input too short (minimum {} characters)", min_length))
            ));
        }
    }

    if let Some(max_length) = validation.max_length {
        if length > max_length {
            return Err(MenuGateError::InvalidInput(
                validation.error_message.clone()
                    .unwrap_or_else(|| format!("Input too long (maximum {} characters)", max_length))
            ));
        }
    }

    if let Some(pattern) = &validation.pattern {
        let regex = regex::Regex::new(pattern)
            .map_err(|_| MenuGateError::Config("Invalid regex pattern".to_string()))?;

        if !regex.is_match(input) {
            return Err(MenuGateError::InvalidInput(
                validation.error_message.clone()
                    .unwrap_or_else(|| "Input format is invalid".to_string())
            ));
        }
    }

    match &validation.input_type {
        InputType::Number => {
            if input.trim().parse::<i64>().is_err() {
                return Err(MenuGateError::InvalidInput(
                    validation.error_message.clone()
                        .unwrap_or_else(|| "Invalid number format".to_string())
                ));
            }
        }
        InputType::Link => {
            if !crate::utils::helpers::is_http_link(input) {
                return Err(MenuGateError::InvalidInput(
                    validation.error_message.clone()
                        .unwrap_or_else(|| "Send a valid link (t.me/...)".to_string())
                ));
            }
        }
        InputType::Text | InputType::Any => {}
    }

    Ok(())
}

fn step(id: &str, next_steps: &[&str], validation: Option<StepValidation>) -> (String, ScenarioStep) {
    (
        id.to_string(),
        ScenarioStep {
            id: id.to_string(),
            next_steps: next_steps.iter().map(|s| s.to_string()).collect(),
            validation,
        },
    )
}

fn title_validation() -> StepValidation {
    StepValidation {
        input_type: InputType::Text,
        min_length: Some(1),
        max_length: Some(64),
        pattern: Some(r"^[^/]".to_string()),
        error_message: Some("Title must be 1-64 characters and must not start with '/'".to_string()),
    }
}

/// Mandatory channel registration
fn create_channel_add_scenario() -> Scenario {
    let steps = HashMap::from([
        step(ids::STEP_ASK_ID, &[ids::STEP_CHOOSE_MODE], Some(StepValidation {
            input_type: InputType::Text,
            min_length: Some(2),
            max_length: Some(256),
            pattern: None,
            error_message: Some("❌ Wrong format. Send an id (-100...) or @username.".to_string()),
        })),
        step(ids::STEP_CHOOSE_MODE, &[ids::STEP_ASK_LINK], None),
        step(ids::STEP_ASK_LINK, &[], Some(StepValidation {
            input_type: InputType::Link,
            min_length: None,
            max_length: Some(512),
            pattern: None,
            error_message: Some("❌ Send a valid link (t.me/...).".to_string()),
        })),
    ]);

    Scenario {
        id: ids::CHANNEL_ADD.to_string(),
        name: "Add channel".to_string(),
        initial_step: ids::STEP_ASK_ID.to_string(),
        steps,
        max_duration: Some(1800),
    }
}

/// New menu button: pick a parent, then type the title
fn create_button_add_scenario() -> Scenario {
    let steps = HashMap::from([
        step(ids::STEP_PICK_PARENT, &[ids::STEP_TITLE], None),
        step(ids::STEP_TITLE, &[], Some(title_validation())),
    ]);

    Scenario {
        id: ids::BUTTON_ADD.to_string(),
        name: "Add button".to_string(),
        initial_step: ids::STEP_PICK_PARENT.to_string(),
        steps,
        max_duration: Some(1800),
    }
}

/// Rename a button picked beforehand
fn create_button_rename_scenario() -> Scenario {
    let steps = HashMap::from([step(ids::STEP_NEW_TITLE, &[], Some(title_validation()))]);

    Scenario {
        id: ids::BUTTON_RENAME.to_string(),
        name: "Rename button".to_string(),
        initial_step: ids::STEP_NEW_TITLE.to_string(),
        steps,
        max_duration: Some(1800),
    }
}

/// Collect any number of content messages for a button
fn create_content_add_scenario() -> Scenario {
    let steps = HashMap::from([step(ids::STEP_AWAIT_CONTENT, &[], Some(StepValidation {
        input_type: InputType::Any,
        min_length: None,
        max_length: None,
        pattern: None,
        error_message: None,
    }))]);

    Scenario {
        id: ids::CONTENT_ADD.to_string(),
        name: "Add content".to_string(),
        initial_step: ids::STEP_AWAIT_CONTENT.to_string(),
        steps,
        max_duration: Some(3600),
    }
}

/// Roster change keyed by a typed user id (or handle when adding)
fn create_admin_id_scenario(id: &str, name: &str, accept_handle: bool) -> Scenario {
    let validation = if accept_handle {
        StepValidation {
            input_type: InputType::Text,
            min_length: Some(1),
            max_length: Some(64),
            pattern: Some(r"^(@[A-Za-z0-9_]{3,}|\d+)$".to_string()),
            error_message: Some("Invalid id.".to_string()),
        }
    } else {
        StepValidation {
            input_type: InputType::Number,
            min_length: Some(1),
            max_length: Some(20),
            pattern: None,
            error_message: Some("Invalid id.".to_string()),
        }
    };

    Scenario {
        id: id.to_string(),
        name: name.to_string(),
        initial_step: ids::STEP_AWAIT_ID.to_string(),
        steps: HashMap::from([step(ids::STEP_AWAIT_ID, &[], Some(validation))]),
        max_duration: Some(900),
    }
}

/// Capture the message to copy to every user
fn create_broadcast_scenario() -> Scenario {
    Scenario {
        id: ids::BROADCAST.to_string(),
        name: "Broadcast".to_string(),
        initial_step: ids::STEP_AWAIT_MESSAGE.to_string(),
        steps: HashMap::from([step(ids::STEP_AWAIT_MESSAGE, &[], None)]),
        max_duration: Some(900),
    }
}

impl Default for ScenarioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_creation() {
        let manager = ScenarioManager::new();

        for id in [
            ids::CHANNEL_ADD, ids::BUTTON_ADD, ids::BUTTON_RENAME, ids::CONTENT_ADD,
            ids::ADMIN_ADD, ids::ADMIN_REMOVE, ids::BROADCAST,
        ] {
            assert!(manager.get_scenario(id).is_some(), "missing {}", id);
        }
        assert!(manager.get_scenario("nonexistent").is_none());
    }

    #[test]
    fn test_channel_add_flow() {
        let manager = ScenarioManager::new();
        let mut context = ConversationContext::new(123);

        manager.start_scenario(&mut context, ids::CHANNEL_ADD).unwrap();
        assert!(context.is_at(ids::CHANNEL_ADD, ids::STEP_ASK_ID));

        manager.next_step(&mut context, ids::STEP_CHOOSE_MODE).unwrap();
        manager.next_step(&mut context, ids::STEP_ASK_LINK).unwrap();
        assert!(manager.validate_input(&context, "https://t.me/+abc").is_ok());
        assert!(manager.validate_input(&context, "t.me/+abc").is_err());
    }

    #[test]
    fn test_invalid_transitions() {
        let manager = ScenarioManager::new();
        let mut context = ConversationContext::new(123);

        manager.start_scenario(&mut context, ids::CHANNEL_ADD).unwrap();
        assert!(manager.next_step(&mut context, ids::STEP_ASK_LINK).is_err());
        assert!(manager.next_step(&mut context, "nonexistent").is_err());

        let mut idle = ConversationContext::new(1);
        assert!(manager.next_step(&mut idle, ids::STEP_TITLE).is_err());
    }

    #[test]
    fn test_title_validation() {
        let manager = ScenarioManager::new();
        let mut context = ConversationContext::new(1);
        manager.start_scenario(&mut context, ids::BUTTON_RENAME).unwrap();

        assert!(manager.validate_input(&context, "Lessons").is_ok());
        assert!(manager.validate_input(&context, "").is_err());
        assert!(manager.validate_input(&context, "/start").is_err());
        assert!(manager.validate_input(&context, &"x".repeat(65)).is_err());
    }

    #[test]
    fn test_admin_id_validation() {
        let manager = ScenarioManager::new();
        let mut add = ConversationContext::new(1);
        manager.start_scenario(&mut add, ids::ADMIN_ADD).unwrap();
        assert!(manager.validate_input(&add, "12345").is_ok());
        assert!(manager.validate_input(&add, "@someone").is_ok());
        assert!(manager.validate_input(&add, "someone").is_err());

        let mut remove = ConversationContext::new(1);
        manager.start_scenario(&mut remove, ids::ADMIN_REMOVE).unwrap();
        assert!(manager.validate_input(&remove, "12345").is_ok());
        assert!(manager.validate_input(&remove, "@someone").is_err());
    }
}
