use std::io::{self, BufRead, Write};

use super::confirmation::{ConfirmationGate, GateState};

/// Source of operator answers.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompts on a writer and reads one line per answer. End of input reads as an
/// empty answer.
#[derive(Debug)]
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.output.write_all(question.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Asks each of the gate's questions once and returns the terminal state.
pub fn run_gate<P: Prompter + ?Sized>(
    gate: &mut ConfirmationGate,
    prompter: &mut P,
) -> io::Result<GateState> {
    while let Some(question) = gate.prompt() {
        let answer = prompter.ask(&question)?;
        gate.respond(&answer);
    }
    Ok(gate.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn console_prompter_writes_question_and_reads_line() {
        let mut output = Vec::new();
        let mut prompter = ConsolePrompter::new(Cursor::new("y\r\nciao\n"), &mut output);
        let mut gate = ConfirmationGate::new("ciao");

        let state = run_gate(&mut gate, &mut prompter).expect("prompt io");
        assert_eq!(state, GateState::Confirmed);

        let transcript = String::from_utf8(output).expect("utf8");
        assert!(transcript.contains("(Y/N)"));
        assert!(transcript.contains("'ciao'"));
    }

    #[test]
    fn end_of_input_aborts() {
        let mut prompter = ConsolePrompter::new(Cursor::new(""), io::sink());
        let mut gate = ConfirmationGate::new("ciao");

        let state = run_gate(&mut gate, &mut prompter).expect("prompt io");
        assert_eq!(state, GateState::Aborted);
    }
}
