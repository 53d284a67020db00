//! Voice assistant command router
//!
//! **Purpose:** Map free-form driver requests onto hub operations with
//! driver-safety gating.
//!
//! **Components:**
//! - `intents` - predicates and handlers for each intent
//! - `AssistantRouter` - ordered (predicate, handler) table; first match wins
//!
//! The router holds no state of its own. Handlers mutate the hub through its
//! public operations and return speech plus an action log. A handler error
//! becomes speech with an empty action log; nothing escapes to the caller.

pub mod intents;

use crate::error::Result;
use crate::hub::Hub;
use crate::state::DriverState;
use ivi_common::events::FocusMode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AutoTune,
    Navigate,
    Play,
    Transport,
    Volume,
    Diagnostics,
    Sound,
    Alerts,
    Connect,
    Profile,
    Status,
    /// Nothing matched while the driver is moving or in safety focus
    SafetyPrompt,
    /// Nothing matched
    Unknown,
}

/// What the assistant says and what it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub intent: Intent,
    pub speech: String,
    /// One entry per state change performed; empty on failure or read-only
    pub actions: Vec<String>,
}

impl AssistantResponse {
    pub fn new(intent: Intent, speech: impl Into<String>) -> Self {
        Self {
            intent,
            speech: speech.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

pub type Predicate = fn(&str, &DriverState) -> bool;
pub type Handler = fn(&mut Hub, &str) -> Result<AssistantResponse>;

/// One row of the routing table
pub struct IntentRoute {
    pub intent: Intent,
    pub predicate: Predicate,
    pub handler: Handler,
}

/// Priority order; the first matching predicate handles the request
static ROUTES: [IntentRoute; 11] = [
    IntentRoute {
        intent: Intent::AutoTune,
        predicate: intents::is_auto_tune,
        handler: intents::auto_tune,
    },
    IntentRoute {
        intent: Intent::Navigate,
        predicate: intents::is_navigate,
        handler: intents::navigate,
    },
    IntentRoute {
        intent: Intent::Play,
        predicate: intents::is_play,
        handler: intents::play,
    },
    IntentRoute {
        intent: Intent::Transport,
        predicate: intents::is_transport,
        handler: intents::transport,
    },
    IntentRoute {
        intent: Intent::Volume,
        predicate: intents::is_volume,
        handler: intents::volume,
    },
    IntentRoute {
        intent: Intent::Diagnostics,
        predicate: intents::is_diagnostics,
        handler: intents::diagnostics,
    },
    IntentRoute {
        intent: Intent::Sound,
        predicate: intents::is_sound,
        handler: intents::sound,
    },
    IntentRoute {
        intent: Intent::Alerts,
        predicate: intents::is_alerts,
        handler: intents::alerts,
    },
    IntentRoute {
        intent: Intent::Connect,
        predicate: intents::is_connect,
        handler: intents::connect,
    },
    IntentRoute {
        intent: Intent::Profile,
        predicate: intents::is_profile,
        handler: intents::profile,
    },
    IntentRoute {
        intent: Intent::Status,
        predicate: intents::is_status,
        handler: intents::status,
    },
];

#[derive(Clone, Copy)]
pub struct AssistantRouter {
    routes: &'static [IntentRoute],
}

impl AssistantRouter {
    pub fn new() -> Self {
        Self { routes: &ROUTES }
    }

    /// Which intent a request maps to, without running it
    pub fn classify(&self, text: &str, driver: &DriverState) -> Intent {
        let normalized = normalize(text);
        self.match_route(&normalized, driver)
            .map(|route| route.intent)
            .unwrap_or_else(|| fallback_intent(driver))
    }

    /// Classify and run a request against the hub
    pub fn handle(&self, hub: &mut Hub, text: &str) -> AssistantResponse {
        let normalized = normalize(text);
        let driver = hub.driver().clone();

        let Some(route) = self.match_route(&normalized, &driver) else {
            let intent = fallback_intent(&driver);
            debug!("No intent matched '{}', answering {:?}", normalized, intent);
            return match intent {
                Intent::SafetyPrompt => AssistantResponse::new(
                    intent,
                    "I'll keep it short while you drive. Try \"navigate home\" or \"pause\".",
                ),
                _ => AssistantResponse::new(
                    intent,
                    "Sorry, I didn't understand that. Say \"help\" in the shell for examples, or try \"play road trip\".",
                ),
            };
        };

        info!("Assistant intent {:?} for '{}'", route.intent, normalized);
        match (route.handler)(hub, &normalized) {
            Ok(mut response) => {
                if driver.focus_mode == FocusMode::Safety {
                    response.speech = first_sentence(&response.speech);
                }
                response
            }
            // Failure speech keeps its reason, even in safety focus
            Err(e) => {
                debug!("Intent {:?} failed: {}", route.intent, e);
                AssistantResponse::new(route.intent, format!("Sorry, I couldn't do that. {}.", e))
            }
        }
    }

    fn match_route(&self, normalized: &str, driver: &DriverState) -> Option<&'static IntentRoute> {
        let routes: &'static [IntentRoute] = self.routes;
        routes.iter().find(|route| (route.predicate)(normalized, driver))
    }
}

impl Default for AssistantRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_intent(driver: &DriverState) -> Intent {
    if driver.focus_mode == FocusMode::Safety || driver.is_moving {
        Intent::SafetyPrompt
    } else {
        Intent::Unknown
    }
}

/// Trim, collapse whitespace, lowercase, drop trailing punctuation
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    collapsed
        .trim_end_matches(['.', '!', '?', ','])
        .trim()
        .to_string()
}

/// Speech up to and including the first sentence break
fn first_sentence(speech: &str) -> String {
    match speech.find(". ") {
        Some(idx) => speech[..=idx].to_string(),
        None => speech.to_string(),
    }
}
