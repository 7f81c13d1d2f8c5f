//! Slash-command parsing

/// Commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Scan,
    Diagnose,
    Cancel,
    Unknown(String),
}

impl Command {
    /// Parse the leading `/command` of a message.
    ///
    /// Accepts the group-chat form `/command@BotName` and ignores anything
    /// after the command word. Returns `None` for text that is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word).to_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "scan" => Command::Scan,
            "diagnose" => Command::Diagnose,
            "cancel" => Command::Cancel,
            _ => Command::Unknown(name),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/diagnose@CeliacBot"), Some(Command::Diagnose));
        assert_eq!(Command::parse("  /Cancel now"), Some(Command::Cancel));
        assert_eq!(Command::parse("/foo"), Some(Command::Unknown("foo".to_string())));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("wheat flour"), None);
        assert_eq!(Command::parse("Yes"), None);
        assert_eq!(Command::parse("/"), None);
    }
}
