use rand::seq::SliceRandom;

/// Words for goodbye in a handful of languages; one is picked per run as the
/// phrase the operator must type back.
pub const GOODBYE_WORDS: [&str; 7] = [
    "goodbye",
    "adieu",
    "ciao",
    "adios",
    "sayonara",
    "totsiens",
    "Wiedersehen",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    AwaitingFirstConfirmation,
    AwaitingPhraseConfirmation,
    Confirmed,
    Aborted,
}

impl GateState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Aborted)
    }
}

/// Proof that an operator passed both confirmation steps. Only
/// [`ConfirmationGate`] can produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    _private: (),
}

/// Two-step confirmation in front of the destructive phase: a yes/no question,
/// then an exact, case-sensitive phrase. Each step accepts exactly one answer.
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    phrase: String,
    state: GateState,
}

impl ConfirmationGate {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            state: GateState::AwaitingFirstConfirmation,
        }
    }

    pub fn with_random_phrase() -> Self {
        let phrase = GOODBYE_WORDS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("goodbye");
        Self::new(phrase)
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Question for the current state; `None` once the gate is closed.
    pub fn prompt(&self) -> Option<String> {
        match self.state {
            GateState::AwaitingFirstConfirmation => Some(
                "Do you wish to proceed with deprovisioning the specified users? (Y/N): "
                    .to_string(),
            ),
            GateState::AwaitingPhraseConfirmation => Some(format!(
                "DOUBLE CHECK: Do you wish to proceed with deprovisioning the specified users? \
                 Please type the word '{}' to proceed: ",
                self.phrase
            )),
            GateState::Confirmed | GateState::Aborted => None,
        }
    }

    /// Applies one answer. Terminal states ignore further input.
    pub fn respond(&mut self, input: &str) -> GateState {
        self.state = match self.state {
            GateState::AwaitingFirstConfirmation if input.trim().eq_ignore_ascii_case("y") => {
                GateState::AwaitingPhraseConfirmation
            }
            GateState::AwaitingFirstConfirmation => GateState::Aborted,
            GateState::AwaitingPhraseConfirmation if input.trim() == self.phrase => {
                GateState::Confirmed
            }
            GateState::AwaitingPhraseConfirmation => GateState::Aborted,
            terminal => terminal,
        };
        self.state
    }

    pub fn confirmation(&self) -> Option<Confirmation> {
        (self.state == GateState::Confirmed).then_some(Confirmation { _private: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(inputs: &[&str]) -> GateState {
        let mut gate = ConfirmationGate::new("Wiedersehen");
        for input in inputs {
            gate.respond(input);
        }
        gate.state()
    }

    #[test]
    fn declining_first_question_aborts() {
        assert_eq!(drive(&["n"]), GateState::Aborted);
        assert_eq!(drive(&["yes"]), GateState::Aborted);
        assert_eq!(drive(&[""]), GateState::Aborted);
    }

    #[test]
    fn exact_phrase_confirms() {
        assert_eq!(drive(&["y", "Wiedersehen"]), GateState::Confirmed);
        assert_eq!(drive(&["Y", "  Wiedersehen\n"]), GateState::Confirmed);
    }

    #[test]
    fn phrase_is_case_sensitive() {
        assert_eq!(drive(&["y", "wiedersehen"]), GateState::Aborted);
    }

    #[test]
    fn first_answer_alone_does_not_confirm() {
        let mut gate = ConfirmationGate::new("ciao");
        assert_eq!(gate.respond("y"), GateState::AwaitingPhraseConfirmation);
        assert!(gate.confirmation().is_none());
        assert!(gate.prompt().expect("phrase prompt").contains("'ciao'"));
    }

    #[test]
    fn terminal_states_absorb_input() {
        assert_eq!(drive(&["n", "y", "Wiedersehen"]), GateState::Aborted);
        assert_eq!(drive(&["y", "Wiedersehen", "n"]), GateState::Confirmed);
    }

    #[test]
    fn random_phrase_comes_from_word_list() {
        let gate = ConfirmationGate::with_random_phrase();
        assert!(GOODBYE_WORDS.contains(&gate.phrase()));
        assert!(gate.prompt().is_some());
        assert!(gate.confirmation().is_none());
    }
}
