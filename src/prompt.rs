//! Interactive questions, behind a trait so workflows can run unattended.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::Result;

pub trait Prompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
    /// Index of the chosen item.
    fn select(&self, message: &str, items: &[&str]) -> Result<usize>;
    fn input(&self, message: &str, allow_empty: bool) -> Result<String>;
    fn password(&self, message: &str) -> Result<String>;
}

/// dialoguer-backed prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()?)
    }

    fn select(&self, message: &str, items: &[&str]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()?)
    }

    fn input(&self, message: &str, allow_empty: bool) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(allow_empty)
            .interact_text()?)
    }

    fn password(&self, message: &str) -> Result<String> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(message)
            .interact()?)
    }
}

/// One canned reply for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Confirm(bool),
    Select(usize),
    Text(String),
}

/// Replays a fixed sequence of answers, in order. Running out of answers or
/// getting a reply of the wrong kind is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: Cell<usize>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: Cell::new(0),
        }
    }

    /// Number of questions asked so far.
    pub fn asked(&self) -> usize {
        self.asked.get()
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, message: &str) -> Result<Answer> {
        self.asked.set(self.asked.get() + 1);
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| unanswered(message, "no answer left"))
    }
}

fn unanswered(message: &str, why: &str) -> crate::Error {
    let io = std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("{} for prompt '{}'", why, message),
    );
    crate::Error::Prompt(dialoguer::Error::IO(io))
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(unanswered(message, &format!("expected a confirmation, got {:?}", other))),
        }
    }

    fn select(&self, message: &str, items: &[&str]) -> Result<usize> {
        match self.next(message)? {
            Answer::Select(i) if i < items.len() => Ok(i),
            other => Err(unanswered(message, &format!("invalid selection {:?}", other))),
        }
    }

    fn input(&self, message: &str, _allow_empty: bool) -> Result<String> {
        match self.next(message)? {
            Answer::Text(text) => Ok(text),
            other => Err(unanswered(message, &format!("expected text, got {:?}", other))),
        }
    }

    fn password(&self, message: &str) -> Result<String> {
        self.input(message, false)
    }
}
