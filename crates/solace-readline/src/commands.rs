//! REPL command parsing.

use std::str::FromStr;

use solace_core::mood::{DEFAULT_TREND_DAYS, Mood};

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/register",
    "/login",
    "/logout",
    "/profile",
    "/mood",
    "/select",
    "/trend",
    "/dominant",
    "/history",
    "/breathe",
    "/chat",
    "/dark",
    "/help",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreatheAction {
    Start,
    Pause,
    Toggle,
    Reset,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { name: String, password: String },
    Login { name: String, password: String },
    Logout,
    /// Show the profile, or rename it when a name is given.
    Profile { new_name: Option<String> },
    RecordMood { mood: Option<Mood>, notes: Option<String> },
    SelectMood(Mood),
    Trend { days: u32 },
    Dominant,
    History,
    Breathe(BreatheAction),
    ChatLog,
    ToggleDark,
    Help,
    Quit,
    /// Anything that is not a command is said to the companion.
    Say(String),
}

impl Command {
    /// Parses one trimmed, non-empty input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        if line == "quit" || line == "exit" {
            return Ok(Command::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Command::Say(line.to_string()));
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head {
            "/register" => {
                let (name, password) = credentials(rest, "/register <name> <password>")?;
                Ok(Command::Register { name, password })
            }
            "/login" => {
                let (name, password) = credentials(rest, "/login <name> <password>")?;
                Ok(Command::Login { name, password })
            }
            "/logout" => Ok(Command::Logout),
            "/profile" => Ok(Command::Profile {
                new_name: non_empty(rest),
            }),
            "/mood" => {
                let (word, notes) = match rest.split_once(char::is_whitespace) {
                    Some((word, notes)) => (word, non_empty(notes.trim())),
                    None => (rest, None),
                };
                let mood = if word.is_empty() { None } else { Some(mood(word)?) };
                Ok(Command::RecordMood { mood, notes })
            }
            "/select" => Ok(Command::SelectMood(mood(rest)?)),
            "/trend" => {
                let days = if rest.is_empty() {
                    DEFAULT_TREND_DAYS
                } else {
                    rest.parse::<u32>()
                        .ok()
                        .filter(|d| *d > 0)
                        .ok_or_else(|| "Usage: /trend [days]".to_string())?
                };
                Ok(Command::Trend { days })
            }
            "/dominant" => Ok(Command::Dominant),
            "/history" => Ok(Command::History),
            "/breathe" => {
                let action = match rest {
                    "" | "status" => BreatheAction::Status,
                    "start" => BreatheAction::Start,
                    "pause" => BreatheAction::Pause,
                    "toggle" => BreatheAction::Toggle,
                    "reset" => BreatheAction::Reset,
                    _ => return Err("Usage: /breathe [start|pause|toggle|reset|status]".to_string()),
                };
                Ok(Command::Breathe(action))
            }
            "/chat" => Ok(Command::ChatLog),
            "/dark" => Ok(Command::ToggleDark),
            "/help" => Ok(Command::Help),
            other => Err(format!("Unknown command: {other}. Type /help for a list.")),
        }
    }
}

fn credentials(rest: &str, usage: &str) -> Result<(String, String), String> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(password), None) => Ok((name.to_string(), password.to_string())),
        _ => Err(format!("Usage: {usage}")),
    }
}

fn mood(word: &str) -> Result<Mood, String> {
    Mood::from_str(word).map_err(|_| "Moods: great, good, okay, bad, awful".to_string())
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

pub const HELP: &str = "\
/register <name> <password>   create an account and log in
/login <name> <password>      log in
/logout                       log out
/profile [new-name]           show or rename your profile
/mood [mood] [notes]          record a mood (great, good, okay, bad, awful)
/select <mood>                pick a mood without recording it
/trend [days]                 average mood per day (default 7)
/dominant                     most frequent mood
/history                      all journal entries
/breathe [action]             start, pause, toggle, reset or status
/chat                         show the conversation
/dark                         toggle dark mode
quit                          leave
Anything else is sent to your companion.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            Command::parse("I feel anxious").unwrap(),
            Command::Say("I feel anxious".to_string())
        );
    }

    #[test]
    fn test_credentials() {
        assert_eq!(
            Command::parse("/login ann pw1").unwrap(),
            Command::Login {
                name: "ann".to_string(),
                password: "pw1".to_string()
            }
        );
        assert!(Command::parse("/register ann").is_err());
        assert!(Command::parse("/register ann pw extra").is_err());
    }

    #[test]
    fn test_mood_with_notes() {
        assert_eq!(
            Command::parse("/mood Good  long walk today").unwrap(),
            Command::RecordMood {
                mood: Some(Mood::Good),
                notes: Some("long walk today".to_string())
            }
        );
        // A missing mood is left for the journal to reject
        assert_eq!(
            Command::parse("/mood").unwrap(),
            Command::RecordMood {
                mood: None,
                notes: None
            }
        );
        assert!(Command::parse("/mood ecstatic").is_err());
    }

    #[test]
    fn test_trend_days() {
        assert_eq!(Command::parse("/trend").unwrap(), Command::Trend { days: 7 });
        assert_eq!(Command::parse("/trend 30").unwrap(), Command::Trend { days: 30 });
        assert!(Command::parse("/trend 0").is_err());
    }

    #[test]
    fn test_breathe_actions() {
        assert_eq!(
            Command::parse("/breathe").unwrap(),
            Command::Breathe(BreatheAction::Status)
        );
        assert_eq!(
            Command::parse("/breathe toggle").unwrap(),
            Command::Breathe(BreatheAction::Toggle)
        );
        assert!(Command::parse("/breathe faster").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("/nope").is_err());
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
    }
}
