//! Scripted prompter for driving the workflow in tests

use super::{InputQuestion, Progress, Prompter, SelectQuestion};
use anyhow::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A pre-recorded user answer
#[derive(Debug, Clone)]
pub enum Answer {
    Select(String),
    /// Empty text accepts the question's default
    Input(String),
    Confirm(bool),
}

/// Everything the prompter was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select(String),
    Input(String),
    InputRejected(String),
    Confirm(String),
    SpinnerStart(String),
    SpinnerStop(String),
    SpinnerFail(String),
    Info(String),
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    events: Rc<RefCell<Vec<Event>>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            events: Rc::default(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Messages of every yes/no question asked
    pub fn confirms(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Confirm(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn asked_anything(&self) -> bool {
        self.events().iter().any(|e| {
            matches!(
                e,
                Event::Select(_) | Event::Input(_) | Event::Confirm(_)
            )
        })
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn next_answer(&mut self, message: &str) -> Result<Answer> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer for '{}'", message))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, question: &SelectQuestion) -> Result<String> {
        self.record(Event::Select(question.message.clone()));
        match self.next_answer(&question.message)? {
            Answer::Select(value) if question.choices.iter().any(|c| c.value == value) => {
                Ok(value)
            }
            Answer::Select(value) => anyhow::bail!("'{}' is not a choice", value),
            other => anyhow::bail!("expected a select answer, got {:?}", other),
        }
    }

    fn input(&mut self, question: &InputQuestion) -> Result<String> {
        self.record(Event::Input(question.message.clone()));
        loop {
            let raw = match self.next_answer(&question.message)? {
                Answer::Input(text) if text.is_empty() => {
                    question.default.clone().unwrap_or_default()
                }
                Answer::Input(text) => text,
                other => anyhow::bail!("expected an input answer, got {:?}", other),
            };
            match (question.validate)(&raw) {
                Ok(value) => return Ok(value),
                Err(message) => self.record(Event::InputRejected(message)),
            }
        }
    }

    fn confirm(&mut self, message: &str, _initial: bool) -> Result<bool> {
        self.record(Event::Confirm(message.to_string()));
        match self.next_answer(message)? {
            Answer::Confirm(yes) => Ok(yes),
            other => anyhow::bail!("expected a confirm answer, got {:?}", other),
        }
    }

    fn spinner(&mut self, message: &str) -> Box<dyn Progress> {
        self.record(Event::SpinnerStart(message.to_string()));
        Box::new(ScriptedProgress {
            events: Rc::clone(&self.events),
        })
    }

    fn info(&mut self, message: &str) -> Result<()> {
        self.record(Event::Info(message.to_string()));
        Ok(())
    }

    fn success(&mut self, message: &str) -> Result<()> {
        self.record(Event::Success(message.to_string()));
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.record(Event::Error(message.to_string()));
        Ok(())
    }
}

struct ScriptedProgress {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Progress for ScriptedProgress {
    fn stop(&mut self, message: &str) {
        self.events
            .borrow_mut()
            .push(Event::SpinnerStop(message.to_string()));
    }

    fn fail(&mut self, message: &str) {
        self.events
            .borrow_mut()
            .push(Event::SpinnerFail(message.to_string()));
    }
}
