use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Finds catalog entries containing any of the keywords as a substring.
#[derive(Debug, PartialEq)]
pub struct Search {
    pub keywords: Vec<String>,
}

impl Executable for Search {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        let songs = store.search(&self.keywords, email)?;

        let message = if songs.is_empty() {
            "No songs were found containing the keywords".to_string()
        } else {
            format!(
                "These are the songs that were found using the keywords:\n\t{}",
                songs.iter().join("\n\t")
            )
        };

        Ok(Response::new(CommandType::Search, message))
    }
}

impl TryFrom<&mut CommandParser> for Search {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("search for songs", 1, "keywords")?;

        Ok(Self {
            keywords: parser.remaining(),
        })
    }
}
