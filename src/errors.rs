use serenity::all::MessageId;

/// Rejections surfaced to the member who triggered an interaction.
/// None of these mutate the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GiveawayError {
    #[error("invalid duration `{0}`")]
    InvalidDuration(String),

    #[error("duration `{token}` exceeds the maximum of `{max}`")]
    DurationTooLong { token: String, max: String },

    #[error("invalid number of winners: {0}")]
    InvalidWinnerCount(i64),

    #[error("caller lacks every allowed giveaway role")]
    Unauthorized,

    #[error("command used outside of a server")]
    NotInGuild,

    #[error("giveaway {0} is not open")]
    NotFound(MessageId),

    #[error("member already entered")]
    AlreadyEntered,
}

impl GiveawayError {
    /// Ephemeral reply text for this rejection.
    pub fn user_message(&self) -> String {
        match self {
            GiveawayError::InvalidDuration(_) => {
                "Invalid duration! Examples: 10s, 5m, 2h, 1d".to_string()
            }
            GiveawayError::DurationTooLong { max, .. } => {
                format!("Duration too long, the maximum is **{max}**.")
            }
            GiveawayError::InvalidWinnerCount(n) => {
                format!("Invalid number of winners: **{n}**.")
            }
            GiveawayError::Unauthorized => {
                "You don't have permission to run giveaways.".to_string()
            }
            GiveawayError::NotInGuild => "Use this in a server.".to_string(),
            GiveawayError::NotFound(_) => "This giveaway has ended or is invalid.".to_string(),
            GiveawayError::AlreadyEntered => "You are already registered!".to_string(),
        }
    }
}
