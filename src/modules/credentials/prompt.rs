use std::io;

use crate::modules::utils::io::{prompt_line, prompt_with_confirmation};

/// Interactive source of credentials. Every call blocks until the user answers.
pub trait Prompter {
    fn username(&mut self, identifier: &str) -> io::Result<String>;

    /// Masked entry
    fn password(&mut self, identifier: &str) -> io::Result<String>;

    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Informational line shown before asking anything
    fn notice(&mut self, message: &str);
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn username(&mut self, identifier: &str) -> io::Result<String> {
        (**self).username(identifier)
    }

    fn password(&mut self, identifier: &str) -> io::Result<String> {
        (**self).password(identifier)
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        (**self).confirm(question)
    }

    fn notice(&mut self, message: &str) {
        (**self).notice(message)
    }
}

/// Prompter reading from the controlling terminal
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn username(&mut self, _identifier: &str) -> io::Result<String> {
        prompt_line("SMTP username (leave empty to cancel)")
    }

    fn password(&mut self, _identifier: &str) -> io::Result<String> {
        rpassword::prompt_password("SMTP password: ")
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        prompt_with_confirmation(question, false)
    }

    fn notice(&mut self, message: &str) {
        println!("\n{}", message);
    }
}
