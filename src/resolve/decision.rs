//! Decision providers: where conflict answers come from

use crate::console;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Synchronous source of answers for conflict prompts
///
/// The engine only sees raw answer lines, so a scripted provider can replay
/// a transcript deterministically.
pub trait DecisionProvider {
    /// Show context (listings, warnings) ahead of a question
    fn notify(&mut self, message: &str);

    /// Ask a question; returns the raw answer, empty when no input is available
    fn ask(&mut self, question: &str) -> String;
}

/// Reads answers from stdin
pub struct ConsoleDecisions;

impl ConsoleDecisions {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleDecisions {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProvider for ConsoleDecisions {
    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }

    fn ask(&mut self, question: &str) -> String {
        print!("? {} ", question);
        if let Err(e) = io::stdout().flush() {
            log::debug!("Failed to flush prompt: {}", e);
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => {
                console::warning("No input available; using default response.");
                String::new()
            }
            Ok(_) => line.trim_end_matches(['\r', '\n']).to_string(),
            Err(e) => {
                log::warn!("Failed to read answer: {}", e);
                console::warning("No input available; using default response.");
                String::new()
            }
        }
    }
}

/// Replays a fixed list of answers and records everything it was shown
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<String>,
    /// Questions asked, in order
    pub questions: Vec<String>,
    /// Messages shown, in order
    pub messages: Vec<String>,
}

impl ScriptedDecisions {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn ask(&mut self, question: &str) -> String {
        self.questions.push(question.to_string());
        self.answers.pop_front().unwrap_or_default()
    }
}
