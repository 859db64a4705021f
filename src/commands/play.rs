use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Resolves a catalog entry for streaming. The response carries the song
/// descriptor the server needs to arm a streaming worker, and the client
/// needs to interpret the bytes arriving on its side connection.
#[derive(Debug, PartialEq)]
pub struct Play {
    pub name: String,
}

impl Executable for Play {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        let song = store.stream_song(&self.name, email)?;
        let message = format!("Playing song \"{}\"", song.name);

        Ok(Response::new(CommandType::Play, message).with_song(song))
    }
}

impl TryFrom<&mut CommandParser> for Play {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("play a song", 1, "song name")?;

        Ok(Self {
            name: parser.next_arg(),
        })
    }
}
