use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// The most played songs of this process lifetime, best first.
#[derive(Debug, PartialEq)]
pub struct Top {
    pub count: i64,
}

impl Executable for Top {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        let songs = store.top(self.count, email)?;

        let message = if songs.is_empty() {
            "No songs have been played".to_string()
        } else {
            format!("Most played songs:\n\t{}", songs.iter().join("\n\t"))
        };

        Ok(Response::new(CommandType::Top, message))
    }
}

impl TryFrom<&mut CommandParser> for Top {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("get top songs", 1, "count of top songs")?;

        let count = parser
            .next_arg()
            .parse::<i64>()
            .map_err(|_| ServiceError::InvalidTopCount)?;

        Ok(Self { count })
    }
}
