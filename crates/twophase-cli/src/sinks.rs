//! Terminal and desktop implementations of the timer's output capabilities.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{Clear, ClearType},
};
use notify_rust::Notification;
use twophase_core::error::Result;
use twophase_core::storage::NotificationsConfig;
use twophase_core::{DisplaySink, Notifier};

const APP_NAME: &str = "twophase";

/// Redraws the indicator in place on stdout.
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl DisplaySink for TerminalDisplay {
    fn render(&mut self, text: &str) -> Result<()> {
        let mut out = io::stdout();
        execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(text))?;
        Ok(())
    }
}

/// Drops every frame. Used by one-shot commands, which print events instead.
#[derive(Debug, Default)]
pub struct QuietDisplay;

impl DisplaySink for QuietDisplay {
    fn render(&mut self, text: &str) -> Result<()> {
        tracing::trace!(text, "indicator");
        Ok(())
    }
}

/// Phase notices go to the desktop or the terminal; errors always go to stderr.
#[derive(Debug, Clone)]
pub struct CliNotifier {
    enabled: bool,
    desktop: bool,
}

impl CliNotifier {
    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
            desktop: config.desktop,
        }
    }

    /// Terminal-only notices regardless of the desktop setting.
    pub fn terminal(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
            desktop: false,
        }
    }

    fn print_line(prefix: &str, message: &str) -> Result<()> {
        let mut err = io::stderr();
        execute!(
            err,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(format!("{prefix}{message}\n"))
        )?;
        err.flush()?;
        Ok(())
    }
}

impl Notifier for CliNotifier {
    fn notify(&mut self, message: &str) -> Result<()> {
        if !self.enabled {
            tracing::info!("notice suppressed: {message}");
            return Ok(());
        }
        if self.desktop {
            match Notification::new()
                .summary(APP_NAME)
                .body(message)
                .appname(APP_NAME)
                .show()
            {
                Ok(_) => return Ok(()),
                Err(e) => tracing::warn!("desktop notification failed, using terminal: {e}"),
            }
        }
        Self::print_line("", message)
    }

    fn notify_error(&mut self, message: &str) -> Result<()> {
        Self::print_line("error: ", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_notifier_swallows_notices() {
        let mut notifier = CliNotifier {
            enabled: false,
            desktop: true,
        };
        assert!(notifier.notify("Work session finished!").is_ok());
    }

    #[test]
    fn terminal_constructor_ignores_desktop_setting() {
        let notifier = CliNotifier::terminal(&NotificationsConfig::default());
        assert!(notifier.enabled);
        assert!(!notifier.desktop);
    }
}
