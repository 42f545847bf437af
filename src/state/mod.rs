//! State management module
//!
//! This module handles per-user navigation position and admin dialogue state

pub mod context;
pub mod scenarios;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, NavigationState};
pub use scenarios::{Scenario, ScenarioManager, ScenarioStep, StepValidation, InputType};
pub use storage::{
    StateStore, MemoryStateStorage, RedisStateStorage, StateStorageManager, create_state_store,
};
