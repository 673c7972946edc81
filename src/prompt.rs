// Prompt layer: every question the tool asks goes through `Prompter`, so the
// flow in `whitelist` can run against a real terminal (`dialoguer`) or a
// scripted list of answers.

use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, FuzzySelect, Input};
use std::collections::VecDeque;

pub trait Prompter {
    /// Yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
    /// Free text. Empty answers are allowed.
    fn input(&mut self, prompt: &str) -> Result<String>;
    /// Searchable single choice, returns the index into `items`.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;
}

/// Interactive terminal prompts backed by `dialoguer`.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(answer)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        // `FuzzySelect` filters the list as the user types.
        let selection = FuzzySelect::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?;
        Ok(selection)
    }
}

/// One pre-recorded answer for `ScriptedPrompter`.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Confirm(bool),
    Text(String),
    /// Picks the item with this label.
    Choice(String),
}

/// Replays answers in order and records every prompt it was shown. Asking a
/// question of the wrong kind, or running out of answers, is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedPrompter {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<Answer> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .with_context(|| format!("No scripted answer left for {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            other => bail!("Expected a confirm answer for {prompt:?}, got {other:?}"),
        }
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text),
            other => bail!("Expected a text answer for {prompt:?}, got {other:?}"),
        }
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        match self.next(prompt)? {
            Answer::Choice(label) => items
                .iter()
                .position(|item| *item == label)
                .with_context(|| format!("{label:?} is not one of {items:?}")),
            other => bail!("Expected a choice for {prompt:?}, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_replay_in_order() {
        let mut prompter = ScriptedPrompter::new([
            Answer::Confirm(false),
            Answer::Text("proj".into()),
            Answer::Choice("b".into()),
        ]);
        let items = vec!["a".to_string(), "b".to_string()];

        assert!(!prompter.confirm("keep?").unwrap());
        assert_eq!(prompter.input("project").unwrap(), "proj");
        assert_eq!(prompter.select("pick", &items).unwrap(), 1);
        assert_eq!(prompter.asked, vec!["keep?", "project", "pick"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_scripted_mismatch_is_error() {
        let mut prompter = ScriptedPrompter::new([Answer::Text("x".into())]);
        assert!(prompter.confirm("keep?").is_err());
        assert!(prompter.input("again").is_err());
    }

    #[test]
    fn test_unknown_choice_is_error() {
        let mut prompter = ScriptedPrompter::new([Answer::Choice("zzz".into())]);
        assert!(prompter.select("pick", &["a".to_string()]).is_err());
    }
}
