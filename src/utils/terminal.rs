use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::chat::handler::Outcome;
use crate::error::ChatError;
use crate::llm::types::ModelDescriptor;

pub const ANSWER_HEADING: &str = "Réponse :";
pub const EMPTY_INPUT_WARNING: &str = "Veuillez entrer un texte.";
pub const INPUT_PROMPT: &str = "Pose ta question...";
pub const WORKING_MESSAGE: &str = "Roland réfléchit...";

/// Text surface the chat is rendered on.
pub struct Terminal<W: Write> {
    out: W,
    spinner: bool,
}

impl Terminal<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout(), spinner: true }
    }
}

impl<W: Write> Terminal<W> {
    /// Writer-backed surface without the spinner.
    #[cfg(test)]
    pub fn with_writer(out: W) -> Self {
        Self { out, spinner: false }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, icon: &str, title: &str) -> io::Result<()> {
        let line = format!("{} {}", icon, title);
        writeln!(self.out, "{}", line.bold())?;
        writeln!(self.out, "{}", "─".repeat(line.chars().count().max(12)).dimmed())
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "\n{} ", format!("{} >", INPUT_PROMPT).cyan())?;
        self.out.flush()
    }

    /// Indeterminate indicator shown while a request is outstanding.
    /// Drawn on stderr so it never mixes with the answer.
    pub fn working(&self) -> ProgressBar {
        if !self.spinner {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.yellow} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(WORKING_MESSAGE);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    pub fn outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Rejected => writeln!(self.out, "{}", EMPTY_INPUT_WARNING.yellow()),
            Outcome::Answered(text) => {
                writeln!(self.out, "{}", ANSWER_HEADING.bold().green())?;
                // verbatim, no styling
                writeln!(self.out, "{}", text)
            }
            Outcome::Failed(e) => writeln!(self.out, "{}", generation_error_message(e).red()),
        }
    }

    /// Static message shown in place of the input when setup failed.
    pub fn setup_error(&mut self, error: &ChatError) -> io::Result<()> {
        writeln!(self.out, "{}", setup_error_message(error).red().bold())
    }

    pub fn models(&mut self, models: &[&ModelDescriptor]) -> io::Result<()> {
        writeln!(self.out, "Modèles disponibles :")?;
        for (i, model) in models.iter().enumerate() {
            match &model.display_name {
                Some(display) => writeln!(self.out, "{}. {} ({})", i + 1, model.name, display)?,
                None => writeln!(self.out, "{}. {}", i + 1, model.name)?,
            }
        }
        Ok(())
    }
}

pub fn generation_error_message(error: &ChatError) -> String {
    format!("Erreur : {}", error)
}

pub fn setup_error_message(error: &ChatError) -> String {
    match error {
        ChatError::MissingCredential { key } => {
            format!("Erreur : la clé {} est manquante dans les secrets.", key)
        }
        ChatError::NoGenerationModel => {
            "Erreur : aucun modèle capable de générer du contenu n'est disponible.".to_string()
        }
        ChatError::Discovery(cause) => {
            format!("Erreur : impossible de lister les modèles ({}).", cause)
        }
        ChatError::InvalidConfig(msg) | ChatError::Secrets(msg) => {
            format!("Erreur de configuration : {}", msg)
        }
        other => format!("Erreur de configuration : {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(outcome: &Outcome) -> String {
        colored::control::set_override(false);
        let mut terminal = Terminal::with_writer(Vec::new());
        terminal.outcome(outcome).unwrap();
        String::from_utf8(terminal.into_inner()).unwrap()
    }

    #[test]
    fn answer_follows_heading_verbatim() {
        let text = "Premier paragraphe.\n\n- point *un*\n- point deux";
        let output = render(&Outcome::Answered(text.to_string()));
        assert_eq!(output, format!("{}\n{}\n", ANSWER_HEADING, text));
    }

    #[test]
    fn rejected_input_shows_warning() {
        assert_eq!(render(&Outcome::Rejected), format!("{}\n", EMPTY_INPUT_WARNING));
    }

    #[test]
    fn failure_includes_underlying_detail() {
        let error = ChatError::Provider { status: 429, message: "Resource exhausted".into() };
        let output = render(&Outcome::Failed(error));
        assert!(output.starts_with("Erreur : "));
        assert!(output.contains("Resource exhausted"));
    }

    #[test]
    fn missing_credential_message_names_the_key() {
        let message = setup_error_message(&ChatError::MissingCredential { key: "GOOGLE_API_KEY".into() });
        assert!(message.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn discovery_message_includes_cause() {
        let message = setup_error_message(&ChatError::Discovery("dns error".into()));
        assert!(message.contains("dns error"));
    }

    #[test]
    fn config_message_does_not_repeat_label() {
        let message = setup_error_message(&ChatError::invalid_config("model name is empty"));
        assert_eq!(message, "Erreur de configuration : model name is empty");

        let message = setup_error_message(&ChatError::secrets("secrets.toml: bad value"));
        assert_eq!(message, "Erreur de configuration : secrets.toml: bad value");
    }

    #[test]
    fn hidden_spinner_for_writer_surface() {
        let terminal = Terminal::with_writer(Vec::new());
        assert!(terminal.working().is_hidden());
    }
}
