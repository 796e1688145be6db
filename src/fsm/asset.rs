use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::errors::{AnimationError, Result};

/// Value of a named state machine parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FsmParam {
    Bool(bool),
    Float(f32),
    /// One-shot flag, reset when a transition consumes it.
    Trigger(bool),
}

/// Named parameters the state machine conditions read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsmParams {
    values: FxHashMap<String, FsmParam>,
}

impl FsmParams {
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.values.insert(name.to_string(), FsmParam::Bool(value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.values.insert(name.to_string(), FsmParam::Float(value));
    }

    pub fn set_trigger(&mut self, name: &str) {
        self.values.insert(name.to_string(), FsmParam::Trigger(true));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FsmParam> {
        self.values.get(name).copied()
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(FsmParam::Float(v)) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_triggered(&self, name: &str) -> bool {
        matches!(self.get(name), Some(FsmParam::Trigger(true)))
    }

    pub(crate) fn consume_trigger(&mut self, name: &str) {
        if let Some(FsmParam::Trigger(fired)) = self.values.get_mut(name) {
            *fired = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FsmCondition {
    Bool { param: String, value: bool },
    Greater { param: String, threshold: f32 },
    Less { param: String, threshold: f32 },
    Trigger { param: String },
}

impl FsmCondition {
    /// Evaluates without consuming triggers.
    #[must_use]
    pub fn holds(&self, params: &FsmParams) -> bool {
        match self {
            Self::Bool { param, value } => {
                matches!(params.get(param), Some(FsmParam::Bool(v)) if v == *value)
            }
            Self::Greater { param, threshold } => params.float(param).is_some_and(|v| v > *threshold),
            Self::Less { param, threshold } => params.float(param).is_some_and(|v| v < *threshold),
            Self::Trigger { param } => params.is_triggered(param),
        }
    }
}

/// Two clips blended by the `speed` parameter in `[0, 1]`, normalized-time
/// synchronized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedBlend {
    pub clip_a: String,
    pub clip_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmState {
    pub id: u32,
    pub name: String,
    pub clip: String,
    pub play_rate: f32,
    pub looping: bool,
    pub blend: Option<SpeedBlend>,
}

impl Default for FsmState {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            clip: String::new(),
            play_rate: 1.0,
            looping: true,
            blend: None,
        }
    }
}

impl FsmState {
    #[must_use]
    pub fn new(id: u32, clip: impl Into<String>) -> Self {
        let clip = clip.into();
        Self {
            id,
            name: clip.clone(),
            clip,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmTransition {
    /// `None` means any state.
    pub from: Option<u32>,
    pub to: u32,
    /// Cross-fade length in seconds.
    pub blend_duration: f32,
    /// All must hold.
    pub conditions: Vec<FsmCondition>,
}

impl Default for FsmTransition {
    fn default() -> Self {
        Self {
            from: None,
            to: 0,
            blend_duration: 0.2,
            conditions: Vec::new(),
        }
    }
}

/// Externally parsed state machine definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmAsset {
    pub default_state: u32,
    pub states: Vec<FsmState>,
    pub transitions: Vec<FsmTransition>,
}

impl FsmAsset {
    #[must_use]
    pub fn state(&self, id: u32) -> Option<&FsmState> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Checks ids: unique states, a known default, known transition ends.
    pub fn validate(&self) -> Result<()> {
        let mut ids = FxHashSet::default();
        for state in &self.states {
            if !ids.insert(state.id) {
                return Err(AnimationError::DuplicateState(state.id));
            }
        }
        if !ids.contains(&self.default_state) {
            return Err(AnimationError::UnknownState(self.default_state));
        }
        for transition in &self.transitions {
            for id in transition.from.into_iter().chain(Some(transition.to)) {
                if !ids.contains(&id) {
                    return Err(AnimationError::UnknownState(id));
                }
            }
        }
        Ok(())
    }
}
