use crate::session::{GameSession, SessionError};

/// A line typed into the terminal front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { name: String },
    Join { name: String, game_id: String },
    Pick { word: String },
    Guess { word: String },
    Resume,
    Reset,
    View,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = parts.collect();

        match (keyword.to_lowercase().as_str(), args.as_slice()) {
            ("create", [name]) => Ok(Command::Create {
                name: name.to_string(),
            }),
            ("create", _) => Err(CommandError::Usage("create NAME")),
            ("join", [name, game_id]) => Ok(Command::Join {
                name: name.to_string(),
                game_id: game_id.to_string(),
            }),
            ("join", _) => Err(CommandError::Usage("join NAME GAME_CODE")),
            ("pick", [word]) => Ok(Command::Pick {
                word: word.to_uppercase(),
            }),
            ("pick", _) => Err(CommandError::Usage("pick WORD")),
            ("guess", [word]) => Ok(Command::Guess {
                word: word.to_uppercase(),
            }),
            ("guess", _) => Err(CommandError::Usage("guess WORD")),
            ("resume", []) => Ok(Command::Resume),
            ("new" | "reset", []) => Ok(Command::Reset),
            ("view", []) => Ok(Command::View),
            ("quit" | "exit", []) => Ok(Command::Quit),
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// Run a command against the session. `View` and `Quit` are handled by
    /// the caller and do nothing here.
    pub async fn execute(self, session: &GameSession) -> Result<(), SessionError> {
        match self {
            Command::Create { name } => session.create_and_join(&name).await,
            Command::Join { name, game_id } => session.join(&name, &game_id).await,
            Command::Pick { word } => session.pick_word(&word).await,
            Command::Guess { word } => session.submit_guess(&word).await,
            Command::Resume => {
                if !session.resume_polling().await {
                    tracing::info!("Nothing to resume");
                }
                Ok(())
            }
            Command::Reset => {
                if !session.reset().await {
                    tracing::info!("No game to leave");
                }
                Ok(())
            }
            Command::View | Command::Quit => Ok(()),
        }
    }
}
