//! Interactive prompt boundary.
//!
//! The engine never reads a terminal directly. Anything that may need a
//! human answer goes through an injected [`Prompt`], so the core runs
//! unattended with [`Defaults`] or [`Scripted`] and only blocks in
//! [`Terminal`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use crate::error::Result;

/// Answer to a `choose_one` question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Index(usize),
    Abort,
}

/// Synchronous question/answer interface supplied by the host.
pub trait Prompt: Send + Sync {
    /// Pick one of `options`.
    fn choose_one(&self, question: &str, options: &[String]) -> Result<Choice>;

    /// Yes/no question.
    fn confirm(&self, question: &str) -> Result<bool>;
}

impl<P: Prompt + ?Sized> Prompt for Arc<P> {
    fn choose_one(&self, question: &str, options: &[String]) -> Result<Choice> {
        (**self).choose_one(question, options)
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        (**self).confirm(question)
    }
}

/// Prompts on stderr with dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl Prompt for Terminal {
    fn choose_one(&self, question: &str, options: &[String]) -> Result<Choice> {
        let picked = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .items(options)
            .default(0)
            .interact_on_opt(&Term::stderr())?;
        Ok(picked.map(Choice::Index).unwrap_or(Choice::Abort))
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(false)
            .interact_on(&Term::stderr())?)
    }
}

/// Never blocks: picks the first option and declines confirmations.
#[derive(Debug, Default, Clone, Copy)]
pub struct Defaults;

impl Prompt for Defaults {
    fn choose_one(&self, _question: &str, options: &[String]) -> Result<Choice> {
        Ok(if options.is_empty() {
            Choice::Abort
        } else {
            Choice::Index(0)
        })
    }

    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Replays queued answers; for scripted hosts and tests. Runs out into
/// `Abort` / `false`.
#[derive(Debug, Default)]
pub struct Scripted {
    choices: Mutex<VecDeque<Choice>>,
    confirms: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose(self, choice: Choice) -> Self {
        lock(&self.choices).push_back(choice);
        self
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        lock(&self.confirms).push_back(answer);
        self
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        lock(&self.asked).clone()
    }
}

impl Prompt for Scripted {
    fn choose_one(&self, question: &str, _options: &[String]) -> Result<Choice> {
        lock(&self.asked).push(question.to_string());
        Ok(lock(&self.choices).pop_front().unwrap_or(Choice::Abort))
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        lock(&self.asked).push(question.to_string());
        Ok(lock(&self.confirms).pop_front().unwrap_or(false))
    }
}

/// A poisoned queue only means another test thread panicked; keep going.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Defaults;
        assert_eq!(
            p.choose_one("?", &["a".to_string(), "b".to_string()]).unwrap(),
            Choice::Index(0)
        );
        assert_eq!(p.choose_one("?", &[]).unwrap(), Choice::Abort);
        assert!(!p.confirm("?").unwrap());
    }

    #[test]
    fn test_scripted_replays_then_aborts() {
        let p = Scripted::new().choose(Choice::Index(2)).confirm_with(true);
        assert_eq!(p.choose_one("pick", &[]).unwrap(), Choice::Index(2));
        assert_eq!(p.choose_one("again", &[]).unwrap(), Choice::Abort);
        assert!(p.confirm("sure?").unwrap());
        assert!(!p.confirm("really?").unwrap());
        assert_eq!(p.asked(), vec!["pick", "again", "sure?", "really?"]);
    }
}
