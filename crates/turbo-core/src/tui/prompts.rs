//! Charm-style CLI prompts using cliclack

use crate::commands::{Choice, NoteKind, Prompter, Validator};
use anyhow::Result;
use cliclack::ProgressBar;

/// [`Prompter`] drawing inline prompts on the terminal
#[derive(Default)]
pub struct ClackPrompter {
    spinner: Option<ProgressBar>,
}

impl ClackPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for ClackPrompter {
    fn intro(&mut self, title: &str) -> Result<()> {
        cliclack::intro(title)?;
        Ok(())
    }

    fn outro(&mut self, message: &str) -> Result<()> {
        cliclack::outro(message)?;
        Ok(())
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer: bool = cliclack::confirm(message)
            .initial_value(default)
            .interact()?;
        Ok(answer)
    }

    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize> {
        // Indices as values avoid cloning the labels
        let mut select = cliclack::select(message);
        for (idx, choice) in choices.iter().enumerate() {
            select = select.item(idx, &choice.label, &choice.hint);
        }
        let selected: usize = select.interact()?;
        Ok(selected)
    }

    fn input(&mut self, message: &str, default: Option<&str>, validate: Validator) -> Result<String> {
        let mut input = cliclack::input(message);
        if let Some(default) = default {
            input = input.placeholder(default).default_input(default);
        }
        let value: String = input
            .validate(move |value: &String| validate(value))
            .interact()?;
        Ok(value)
    }

    fn note(&mut self, kind: NoteKind, message: &str) -> Result<()> {
        match kind {
            NoteKind::Info => cliclack::log::info(message)?,
            NoteKind::Success => cliclack::log::success(message)?,
            NoteKind::Warning => cliclack::log::warning(message)?,
            NoteKind::Error => cliclack::log::error(message)?,
        }
        Ok(())
    }

    fn progress_start(&mut self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    fn progress_stop(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.stop(message),
            None => {
                let _ = cliclack::log::success(message);
            }
        }
    }

    fn progress_fail(&mut self, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.error(message),
            None => {
                let _ = cliclack::log::error(message);
            }
        }
    }
}
