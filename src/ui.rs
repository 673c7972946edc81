// UI layer: spinners around each step and colored status lines. Everything
// is synchronous; a spinner ticks on its own thread while the step blocks.

use anyhow::Result;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A spinner that ends with a ✔ or ✖ line.
pub struct Spinner {
    bar: ProgressBar,
    message: String,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Spinner {
            bar,
            message: message.to_string(),
        }
    }

    pub fn succeed(self) {
        self.bar.set_style(plain_style());
        self.bar
            .finish_with_message(format!("{} {}", "✔".green(), self.message));
    }

    /// Finish with a failure mark. `reason` replaces the step message when
    /// given.
    pub fn fail(self, reason: Option<&str>) {
        let text = reason.unwrap_or(&self.message).to_string();
        self.bar.set_style(plain_style());
        self.bar.abandon_with_message(format!("{} {}", "✖".red(), text));
    }
}

fn plain_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Run one step under a spinner. On error the spinner fails with
/// `failure` (or the step message) and the error is passed on.
pub fn step<T>(message: &str, failure: Option<&str>, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let spinner = Spinner::start(message);
    match f() {
        Ok(value) => {
            spinner.succeed();
            Ok(value)
        }
        Err(e) => {
            spinner.fail(failure);
            Err(e)
        }
    }
}

/// Standalone failure mark, for checks that have no spinner of their own.
pub fn failure(message: &str) {
    Spinner::start(message).fail(None);
}

pub fn success(message: &str) {
    println!("{}", message.green());
}
