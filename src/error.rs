use thiserror::Error as ThisError;

/// Every recoverable failure a command can run into, plus the I/O variant for
/// faults the server must not translate into a client-facing error.
#[derive(Debug, ThisError)]
pub enum ServiceError {
    #[error("{0} cannot be empty or blank.")]
    BlankField(&'static str),

    #[error("When searching it is required to have at least one keyword.")]
    MissingKeywords,

    #[error("When trying to get the top songs, a positive number must be provided.")]
    InvalidTopCount,

    #[error(
        "Invalid email format! Valid format is user@smt.domain, where user starts with a letter, \
         ends with a letter or digit and otherwise contains letters, digits, '.', '-' or '_'."
    )]
    InvalidEmailFormat,

    #[error("Email is already in use.")]
    AccountAlreadyExists,

    #[error("Account with email {0} doesn't exist. A registration is required.")]
    AccountDoesntExist(String),

    #[error("Incorrect password.")]
    IncorrectCredentials,

    #[error("User {0} is already logged in. Try disconnecting first.")]
    UserAlreadyLoggedIn(String),

    #[error("You must login or register in order to do anything.")]
    UserNotLoggedIn,

    #[error("There is already an existing playlist with the name {0}")]
    PlaylistAlreadyExists(String),

    #[error("No playlist with the name '{0}' was found")]
    PlaylistDoesntExist(String),

    #[error("'{0}' was already added to the playlist.")]
    PlaylistAlreadyContainsSong(String),

    #[error("Sorry, song {0} doesn't exist in the dataset!")]
    SongDoesntExist(String),

    #[error("Command with name \"{0}\" doesn't exist")]
    NoSuchCommand(String),

    #[error("Insufficient arguments when trying to {action}, expected {expected} argument(s): {fields}")]
    InsufficientArguments {
        action: &'static str,
        expected: usize,
        fields: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Client mistakes become ERROR responses and keep the connection open.
    /// Everything else is a server-side fault and must be surfaced, not
    /// swallowed.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Io(_))
    }
}
