use itertools::Itertools;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

#[derive(Debug, PartialEq)]
pub struct ShowPlaylist {
    pub name: String,
}

impl Executable for ShowPlaylist {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        let lines = store.show_playlist(&self.name, email)?;

        let message = if lines.len() <= 1 {
            format!("Playlist '{}' is empty", self.name)
        } else {
            format!(
                "Playlist '{}' created by '{}'\n\t{}",
                self.name,
                lines[0].trim(),
                lines[1..].iter().map(|line| line.trim()).join("\n\t")
            )
        };

        Ok(Response::new(CommandType::ShowPlaylist, message))
    }
}

impl TryFrom<&mut CommandParser> for ShowPlaylist {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("show playlist", 1, "playlist name")?;

        Ok(Self {
            name: parser.next_arg(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::testing::store;

    #[test]
    fn lists_creator_and_members() {
        let (_root, store) = store();
        store.register("user@abv.bg", "123").unwrap();
        store.create_playlist("mix", "user@abv.bg").unwrap();
        store
            .add_song_to_playlist("mix", "Take Five", "user@abv.bg")
            .unwrap();
        store
            .add_song_to_playlist("mix", "So What", "user@abv.bg")
            .unwrap();

        let response = Command::parse("show-playlist mix")
            .unwrap()
            .exec("user@abv.bg", store)
            .unwrap();

        assert_eq!(response.command, CommandType::ShowPlaylist);
        assert_eq!(
            response.message,
            "Playlist 'mix' created by 'user@abv.bg'\n\tTake Five\n\tSo What"
        );
    }

    #[test]
    fn reports_a_playlist_with_no_members_as_empty() {
        let (_root, store) = store();
        store.register("user@abv.bg", "123").unwrap();
        store.create_playlist("mix", "user@abv.bg").unwrap();

        let response = Command::parse("show-playlist mix")
            .unwrap()
            .exec("user@abv.bg", store)
            .unwrap();

        assert_eq!(response.message, "Playlist 'mix' is empty");
    }

    #[test]
    fn missing_playlist_is_a_domain_error() {
        let (_root, store) = store();
        store.register("user@abv.bg", "123").unwrap();

        let err = Command::parse("show-playlist ghost")
            .unwrap()
            .exec("user@abv.bg", store)
            .unwrap_err();

        assert!(matches!(err, ServiceError::PlaylistDoesntExist(_)));
    }
}
