//! Chat command parsing

/// A recognised chat command with typed arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    /// `/alert <threshold> [from_hour] [to_hour]`
    Alert {
        threshold: f64,
        from_hour: i64,
        to_hour: i64,
    },
    Unsubscribe,
    /// `/setinterval <minutes>`
    SetInterval { minutes: i64 },
}

/// Why a message did not yield a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("not a command")]
    NotACommand,

    #[error("unknown command /{0}")]
    Unknown(String),

    #[error("command addressed to @{0}")]
    OtherBot(String),

    #[error("invalid arguments for /alert")]
    AlertUsage,

    #[error("invalid arguments for /setinterval")]
    SetIntervalUsage,
}

impl Command {
    /// Parse message text such as `/alert 435 9 18` or `/start@fxwatch_bot`
    ///
    /// Hours and minutes are only parsed as integers here; range checks
    /// happen where the values are applied.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        Self::parse_addressed(text, None)
    }

    /// Like [`Command::parse`], but a `/command@name` suffix must match
    /// `bot_username` (case-insensitive) when one is given
    pub fn parse_addressed(text: &str, bot_username: Option<&str>) -> Result<Self, CommandError> {
        let mut parts = text.split_whitespace();
        let head = parts
            .next()
            .and_then(|h| h.strip_prefix('/'))
            .ok_or(CommandError::NotACommand)?;
        let (name, addressee) = match head.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (head, None),
        };
        if let (Some(addressee), Some(ours)) = (addressee, bot_username) {
            if !addressee.eq_ignore_ascii_case(ours) {
                return Err(CommandError::OtherBot(addressee.to_string()));
            }
        }
        let args: Vec<&str> = parts.collect();

        match name {
            "start" => Ok(Command::Start),
            "help" => Ok(Command::Help),
            "unsubscribe" => Ok(Command::Unsubscribe),
            "alert" => parse_alert(&args),
            "setinterval" => {
                let minutes = args
                    .first()
                    .and_then(|m| m.parse().ok())
                    .ok_or(CommandError::SetIntervalUsage)?;
                Ok(Command::SetInterval { minutes })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_alert(args: &[&str]) -> Result<Command, CommandError> {
    let threshold: f64 = args
        .first()
        .and_then(|t| t.parse().ok())
        .ok_or(CommandError::AlertUsage)?;

    let hour_at = |idx: usize, default: i64| -> Result<i64, CommandError> {
        match args.get(idx) {
            Some(raw) => raw.parse().map_err(|_| CommandError::AlertUsage),
            None => Ok(default),
        }
    };

    Ok(Command::Alert {
        threshold,
        from_hour: hour_at(1, 0)?,
        to_hour: hour_at(2, 23)?,
    })
}
