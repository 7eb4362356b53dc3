//! Text-to-speech
//!
//! Speech goes through whatever command-line synthesizer is installed.
//! When none is available the speaker reports not ready and callers carry
//! on without sound.

use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::editor::command_exists;

/// Something that can read a word aloud
pub trait Speaker {
    /// Whether `speak` can produce sound
    fn is_ready(&self) -> bool;

    /// Speak `text` in the voice closest to `voice_hint` (a language name)
    fn speak(&self, text: &str, voice_hint: &str) -> Result<()>;
}

/// Synthesizers probed for, in order
const KNOWN_ENGINES: &[&str] = &["espeak-ng", "espeak", "say"];

/// Speaker backed by an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpeaker {
    /// Program and leading arguments; `None` when nothing was found
    command: Option<Vec<String>>,
}

impl CommandSpeaker {
    /// Use the configured command, or the first known engine on PATH
    pub fn detect(configured: Option<&str>) -> Self {
        let command = match configured {
            Some(cmd) => Some(cmd.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                .filter(|parts| !parts.is_empty()),
            None => KNOWN_ENGINES
                .iter()
                .find(|engine| command_exists(engine))
                .map(|engine| vec![engine.to_string()]),
        };

        match &command {
            Some(parts) => debug!("Speech engine: {}", parts.join(" ")),
            None => debug!("No speech engine found"),
        }
        Self { command }
    }

    /// Speaker that never speaks
    pub fn disabled() -> Self {
        Self { command: None }
    }

    fn args_for(&self, text: &str, voice_hint: &str) -> Option<(String, Vec<String>)> {
        let parts = self.command.as_ref()?;
        let (program, rest) = parts.split_first()?;

        let mut args = rest.to_vec();
        if matches!(program.as_str(), "espeak" | "espeak-ng") {
            if let Some(voice) = espeak_voice(voice_hint) {
                args.push("-v".to_string());
                args.push(voice.to_string());
            }
        }
        args.push(text.to_string());
        Some((program.clone(), args))
    }
}

impl Speaker for CommandSpeaker {
    fn is_ready(&self) -> bool {
        self.command.is_some()
    }

    fn speak(&self, text: &str, voice_hint: &str) -> Result<()> {
        let Some((program, args)) = self.args_for(text, voice_hint) else {
            return Ok(());
        };

        let status = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to run speech command: {}", program))?;

        if !status.success() {
            bail!("Speech command '{}' exited with {}", program, status);
        }
        Ok(())
    }
}

/// espeak voice for a language name or code
fn espeak_voice(language: &str) -> Option<&'static str> {
    match language.trim().to_lowercase().as_str() {
        "spanish" | "español" | "es" => Some("es"),
        "french" | "français" | "fr" => Some("fr"),
        "german" | "deutsch" | "de" => Some("de"),
        "italian" | "italiano" | "it" => Some("it"),
        "portuguese" | "português" | "pt" => Some("pt"),
        "dutch" | "nl" => Some("nl"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_espeak_voice() {
        assert_eq!(espeak_voice("Spanish"), Some("es"));
        assert_eq!(espeak_voice(" GERMAN "), Some("de"));
        assert_eq!(espeak_voice("Klingon"), None);
    }

    #[test]
    fn test_disabled_is_not_ready_and_silent() {
        let speaker = CommandSpeaker::disabled();
        assert!(!speaker.is_ready());
        assert!(speaker.speak("perro", "Spanish").is_ok());
    }

    #[test]
    fn test_configured_command_args() {
        let speaker = CommandSpeaker::detect(Some("espeak-ng -s 140"));
        assert!(speaker.is_ready());

        let (program, args) = speaker.args_for("perro", "Spanish").unwrap();
        assert_eq!(program, "espeak-ng");
        assert_eq!(args, vec!["-s", "140", "-v", "es", "perro"]);
    }

    #[test]
    fn test_other_commands_get_no_voice_flag() {
        let speaker = CommandSpeaker::detect(Some("say"));
        let (_, args) = speaker.args_for("chien", "French").unwrap();
        assert_eq!(args, vec!["chien"]);
    }

    #[test]
    fn test_blank_configured_command_is_disabled() {
        assert!(!CommandSpeaker::detect(Some("   ")).is_ready());
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let speaker = CommandSpeaker::detect(Some("definitely_not_a_real_command_12345"));
        assert!(speaker.speak("perro", "Spanish").is_err());
    }
}
