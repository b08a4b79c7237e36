//! Commands and the prompting seam they talk to the user through

pub mod init;

use anyhow::Result;

pub use init::{InitArgs, InitCommand, InitOutcome, InitState};

/// A CLI command: argument validation, then execution
#[allow(async_fn_in_trait)]
pub trait Command {
    type Args;
    type State;
    type Output;

    /// Turn parsed arguments into the state `exec` runs with
    fn init(&self, args: Self::Args) -> Result<Self::State>;

    async fn exec(&mut self, state: Self::State) -> Result<Self::Output>;

    async fn run(&mut self, args: Self::Args) -> Result<Self::Output> {
        let state = self.init(args)?;
        self.exec(state).await
    }
}

/// Rejects an input value with a message shown to the user
pub type Validator = fn(&str) -> std::result::Result<(), String>;

/// One option of a [`Prompter::select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub hint: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hint: hint.into(),
        }
    }
}

/// Severity of a [`Prompter::note`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Info,
    Success,
    Warning,
    Error,
}

/// User interaction used by commands
///
/// `input` keeps asking until the validator accepts, so validation errors
/// never reach the caller.
pub trait Prompter {
    fn intro(&mut self, title: &str) -> Result<()>;

    fn outro(&mut self, message: &str) -> Result<()>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Index of the chosen entry in `choices`
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize>;

    fn input(&mut self, message: &str, default: Option<&str>, validate: Validator) -> Result<String>;

    fn note(&mut self, kind: NoteKind, message: &str) -> Result<()>;

    fn progress_start(&mut self, message: &str);

    fn progress_stop(&mut self, message: &str);

    fn progress_fail(&mut self, message: &str);
}
