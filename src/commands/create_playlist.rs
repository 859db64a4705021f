use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

#[derive(Debug, PartialEq)]
pub struct CreatePlaylist {
    pub name: String,
}

impl Executable for CreatePlaylist {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        store.create_playlist(&self.name, email)?;
        let message = format!("Playlist '{}' was created", self.name);

        Ok(Response::new(CommandType::CreatePlaylist, message))
    }
}

impl TryFrom<&mut CommandParser> for CreatePlaylist {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("create a playlist", 1, "playlist name")?;

        Ok(Self {
            name: parser.next_arg(),
        })
    }
}
