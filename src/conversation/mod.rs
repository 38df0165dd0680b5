//! Guided conversation state machine
//!
//! Collects the household figures one turn at a time, then runs the
//! recommendation pipeline. No session is kept server-side: every turn gets
//! the caller's `ConversationState` and returns the next one.
//!
//! FLOW:
//! GREETING → NAME → PEOPLE → CONSUMPTION → PRICE → CONTINUE? → DETAILS → (reset)

pub mod render;

use crate::error::AdvisorError;
use crate::extra_tips::ExtraTipsMatcher;
use crate::models::{ConversationState, TurnOutcome};
use crate::recommendations::RecommendationGenerator;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub use render::CLOSING_MESSAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Greeting,
    Name,
    People,
    Consumption,
    Price,
    Continue,
    Details,
}

impl Step {
    fn number(self) -> i64 {
        match self {
            Step::Greeting => 0,
            Step::Name => 1,
            Step::People => 2,
            Step::Consumption => 3,
            Step::Price => 4,
            Step::Continue => 5,
            Step::Details => 6,
        }
    }
}

impl TryFrom<i64> for Step {
    type Error = AdvisorError;

    fn try_from(step: i64) -> Result<Self> {
        match step {
            0 => Ok(Step::Greeting),
            1 => Ok(Step::Name),
            2 => Ok(Step::People),
            3 => Ok(Step::Consumption),
            4 => Ok(Step::Price),
            5 => Ok(Step::Continue),
            6 => Ok(Step::Details),
            other => Err(AdvisorError::ProtocolError(format!(
                "unknown conversation step {}; restart with step 0",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    NotANumber,
    NotPositive,
}

fn parse_positive_int(message: &str) -> std::result::Result<u32, NumberError> {
    let value: i64 = message.trim().parse().map_err(|_| NumberError::NotANumber)?;
    if value <= 0 {
        return Err(NumberError::NotPositive);
    }
    u32::try_from(value).map_err(|_| NumberError::NotANumber)
}

/// Accepts `,` as decimal separator
fn parse_positive_real(message: &str) -> std::result::Result<f64, NumberError> {
    let value: f64 = message
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| NumberError::NotANumber)?;
    if !value.is_finite() {
        return Err(NumberError::NotANumber);
    }
    if value <= 0.0 {
        return Err(NumberError::NotPositive);
    }
    Ok(value)
}

fn is_greeting(message: &str) -> bool {
    message.to_lowercase().contains("hola")
}

fn is_affirmative(message: &str) -> bool {
    matches!(message.trim().to_lowercase().as_str(), "sí" | "si")
}

/// Drives one dialogue turn at a time
pub struct ConversationEngine {
    generator: Arc<RecommendationGenerator>,
    matcher: ExtraTipsMatcher,
}

impl ConversationEngine {
    pub fn new(generator: Arc<RecommendationGenerator>) -> Self {
        Self {
            generator,
            matcher: ExtraTipsMatcher::new(),
        }
    }

    /// Apply `message` to `state`.
    ///
    /// Invalid input yields a reply with the state unchanged; only an unknown
    /// or inconsistent state is an error.
    pub fn handle_turn(&self, state: ConversationState, message: &str) -> Result<TurnOutcome> {
        let step = Step::try_from(state.step)?;

        let outcome = match step {
            Step::Greeting => self.on_greeting(state, message),
            Step::Name => self.on_name(state, message),
            Step::People => self.on_people(state, message),
            Step::Consumption => self.on_consumption(state, message),
            Step::Price => self.on_price(state, message)?,
            Step::Continue => self.on_continue(state, message),
            Step::Details => self.on_details(message),
        };

        debug!(
            from = step.number(),
            to = outcome.state.step,
            "Conversation turn handled"
        );

        Ok(outcome)
    }

    fn advance(mut state: ConversationState, next: Step, reply: impl Into<String>) -> TurnOutcome {
        state.step = next.number();
        TurnOutcome::new(state, reply)
    }

    /// Ends the dialogue: back to a fresh state with `reply`
    fn finish(reply: impl Into<String>) -> TurnOutcome {
        TurnOutcome::new(ConversationState::reset(), reply)
    }

    fn on_greeting(&self, state: ConversationState, message: &str) -> TurnOutcome {
        if !is_greeting(message) {
            return TurnOutcome::new(state, "Para empezar, salúdame con un \"hola\".");
        }
        Self::advance(
            state,
            Step::Name,
            "¡Hola! Soy tu asistente de consumo energético. ¿Cómo te llamas?",
        )
    }

    fn on_name(&self, mut state: ConversationState, message: &str) -> TurnOutcome {
        let name = message.trim().to_string();
        let reply = format!(
            "Encantado de conocerte, {}. ¿Cuántas personas viven en tu hogar?",
            name
        );
        state.name = Some(name);
        Self::advance(state, Step::People, reply)
    }

    fn on_people(&self, mut state: ConversationState, message: &str) -> TurnOutcome {
        match parse_positive_int(message) {
            Ok(people) => {
                state.people = Some(people);
                Self::advance(
                    state,
                    Step::Consumption,
                    "¿Cuál es tu consumo mensual de energía en kWh?",
                )
            }
            Err(NumberError::NotANumber) => TurnOutcome::new(
                state,
                "Por favor, indica el número de personas con un número entero (por ejemplo, 3).",
            ),
            Err(NumberError::NotPositive) => {
                TurnOutcome::new(state, "El número de personas debe ser mayor que 0.")
            }
        }
    }

    fn on_consumption(&self, mut state: ConversationState, message: &str) -> TurnOutcome {
        match parse_positive_real(message) {
            Ok(consumption) => {
                state.consumption = Some(consumption);
                let reply = format!(
                    "¿Cuál es el precio por kWh que pagas? Si no lo sabes, envía un mensaje vacío \
                     y usaré {:.2} por kWh.",
                    self.generator.default_price_per_kwh()
                );
                Self::advance(state, Step::Price, reply)
            }
            Err(NumberError::NotANumber) => TurnOutcome::new(
                state,
                "Por favor, indica tu consumo mensual en kWh con un número (por ejemplo, 250.5).",
            ),
            Err(NumberError::NotPositive) => {
                TurnOutcome::new(state, "El consumo mensual debe ser mayor que 0.")
            }
        }
    }

    fn on_price(&self, mut state: ConversationState, message: &str) -> Result<TurnOutcome> {
        let price = if message.trim().is_empty() {
            self.generator.default_price_per_kwh()
        } else {
            match parse_positive_real(message) {
                Ok(price) => price,
                Err(NumberError::NotANumber) => {
                    return Ok(TurnOutcome::new(
                        state,
                        "Por favor, indica el precio por kWh con un número, o envía un mensaje \
                         vacío para usar el precio por defecto.",
                    ))
                }
                Err(NumberError::NotPositive) => {
                    return Ok(TurnOutcome::new(
                        state,
                        "El precio por kWh debe ser mayor que 0.",
                    ))
                }
            }
        };

        let people = state.people.filter(|p| *p > 0).ok_or_else(|| {
            AdvisorError::ProtocolError("state at step 4 has no household size".to_string())
        })?;
        let consumption = state
            .consumption
            .filter(|c| c.is_finite() && *c > 0.0)
            .ok_or_else(|| {
                AdvisorError::ProtocolError("state at step 4 has no consumption".to_string())
            })?;

        let bundle = self
            .generator
            .recommend(consumption, i64::from(people), price)?;

        state.price_per_kwh = Some(price);
        let reply = render::advice_reply(state.name.as_deref(), consumption, people, &bundle);
        Ok(Self::advance(state, Step::Continue, reply))
    }

    fn on_continue(&self, state: ConversationState, message: &str) -> TurnOutcome {
        if is_affirmative(message) {
            return Self::advance(
                state,
                Step::Details,
                "Cuéntame más sobre tu hogar: ¿qué aparatos usas más y cómo calientas o \
                 enfrías la casa?",
            );
        }
        Self::finish(CLOSING_MESSAGE)
    }

    fn on_details(&self, details: &str) -> TurnOutcome {
        let tips = self.matcher.extra_tips(details);
        debug!(matched = tips.len(), "Additional recommendations prepared");
        Self::finish(render::extra_tips_reply(&tips))
    }
}
