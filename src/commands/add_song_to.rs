use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Appends one song to an existing playlist.
#[derive(Debug, PartialEq)]
pub struct AddSongTo {
    pub playlist: String,
    pub song: String,
}

impl Executable for AddSongTo {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        store.add_song_to_playlist(&self.playlist, &self.song, email)?;
        let message = format!(
            "'{}' was added successfully to '{}'",
            self.song, self.playlist
        );

        Ok(Response::new(CommandType::AddSongTo, message))
    }
}

impl TryFrom<&mut CommandParser> for AddSongTo {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("add song to playlist", 2, "playlist name and song name")?;

        Ok(Self {
            playlist: parser.next_arg(),
            song: parser.next_arg(),
        })
    }
}
