pub mod add_song_to;
pub mod create_playlist;
pub mod disconnect;
pub mod executable;
pub mod login;
pub mod play;
pub mod register;
pub mod search;
pub mod show_playlist;
pub mod stop;
pub mod top;

use std::str::FromStr;
use std::vec;

use strum_macros::EnumString;

use crate::commands::executable::Executable;
use crate::error::ServiceError;
use crate::frame;
use crate::frame::Response;
use crate::store::Store;
use crate::tokenizer;

use add_song_to::AddSongTo;
use create_playlist::CreatePlaylist;
use disconnect::Disconnect;
use login::Login;
use play::Play;
use register::Register;
use search::Search;
use show_playlist::ShowPlaylist;
use stop::Stop;
use top::Top;

/// Wire-level tag of each exchange. `Error` is only ever produced by the
/// server, never parsed as a command name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CommandType {
    Register,
    Login,
    Disconnect,
    Search,
    Top,
    CreatePlaylist,
    AddSongTo,
    ShowPlaylist,
    Play,
    Stop,
    #[strum(disabled)]
    Error,
}

impl From<CommandType> for u8 {
    fn from(value: CommandType) -> Self {
        match value {
            CommandType::Register => 0,
            CommandType::Login => 1,
            CommandType::Disconnect => 2,
            CommandType::Search => 3,
            CommandType::Top => 4,
            CommandType::CreatePlaylist => 5,
            CommandType::AddSongTo => 6,
            CommandType::ShowPlaylist => 7,
            CommandType::Play => 8,
            CommandType::Stop => 9,
            CommandType::Error => 10,
        }
    }
}

impl TryFrom<u8> for CommandType {
    type Error = frame::Error;

    fn try_from(tag: u8) -> Result<Self, frame::Error> {
        match tag {
            0 => Ok(CommandType::Register),
            1 => Ok(CommandType::Login),
            2 => Ok(CommandType::Disconnect),
            3 => Ok(CommandType::Search),
            4 => Ok(CommandType::Top),
            5 => Ok(CommandType::CreatePlaylist),
            6 => Ok(CommandType::AddSongTo),
            7 => Ok(CommandType::ShowPlaylist),
            8 => Ok(CommandType::Play),
            9 => Ok(CommandType::Stop),
            10 => Ok(CommandType::Error),
            tag => Err(frame::Error::InvalidCommandTag(tag)),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Register(Register),
    Login(Login),
    Disconnect(Disconnect),
    Search(Search),
    Top(Top),
    CreatePlaylist(CreatePlaylist),
    AddSongTo(AddSongTo),
    ShowPlaylist(ShowPlaylist),
    Play(Play),
    Stop(Stop),
}

impl Command {
    /// Parses one raw command line. The first token names the command
    /// (case-insensitive, hyphens allowed in place of underscores); the rest
    /// are its arguments.
    pub fn parse(line: &str) -> Result<Command, ServiceError> {
        let mut tokens = tokenizer::tokenize(line).into_iter();

        let raw_name = tokens
            .next()
            .ok_or_else(|| ServiceError::NoSuchCommand(line.trim().to_string()))?;
        let command_type = CommandType::from_str(&raw_name.replace('-', "_"))
            .map_err(|_| ServiceError::NoSuchCommand(raw_name))?;

        let parser = &mut CommandParser {
            args: tokens.collect::<Vec<_>>().into_iter(),
        };

        match command_type {
            CommandType::Register => Register::try_from(parser).map(Command::Register),
            CommandType::Login => Login::try_from(parser).map(Command::Login),
            CommandType::Disconnect => Disconnect::try_from(parser).map(Command::Disconnect),
            CommandType::Search => Search::try_from(parser).map(Command::Search),
            CommandType::Top => Top::try_from(parser).map(Command::Top),
            CommandType::CreatePlaylist => {
                CreatePlaylist::try_from(parser).map(Command::CreatePlaylist)
            }
            CommandType::AddSongTo => AddSongTo::try_from(parser).map(Command::AddSongTo),
            CommandType::ShowPlaylist => {
                ShowPlaylist::try_from(parser).map(Command::ShowPlaylist)
            }
            CommandType::Play => Play::try_from(parser).map(Command::Play),
            CommandType::Stop => Stop::try_from(parser).map(Command::Stop),
            // `Error` is disabled for parsing; this arm only keeps the match exhaustive.
            CommandType::Error => Err(ServiceError::NoSuchCommand("ERROR".to_string())),
        }
    }
}

impl Executable for Command {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        match self {
            Command::Register(cmd) => cmd.exec(email, store),
            Command::Login(cmd) => cmd.exec(email, store),
            Command::Disconnect(cmd) => cmd.exec(email, store),
            Command::Search(cmd) => cmd.exec(email, store),
            Command::Top(cmd) => cmd.exec(email, store),
            Command::CreatePlaylist(cmd) => cmd.exec(email, store),
            Command::AddSongTo(cmd) => cmd.exec(email, store),
            Command::ShowPlaylist(cmd) => cmd.exec(email, store),
            Command::Play(cmd) => cmd.exec(email, store),
            Command::Stop(cmd) => cmd.exec(email, store),
        }
    }
}

/// Hands out a command's positional arguments, producing the deterministic
/// "insufficient arguments" error before any business state is touched.
pub struct CommandParser {
    args: vec::IntoIter<String>,
}

impl CommandParser {
    /// Fails unless at least `expected` arguments are available.
    fn require(
        &mut self,
        action: &'static str,
        expected: usize,
        fields: &'static str,
    ) -> Result<(), ServiceError> {
        if self.args.len() < expected {
            return Err(ServiceError::InsufficientArguments {
                action,
                expected,
                fields,
            });
        }
        Ok(())
    }

    /// The next argument, trimmed. Only valid after a successful `require`.
    fn next_arg(&mut self) -> String {
        self.args
            .next()
            .map(|arg| arg.trim().to_string())
            .unwrap_or_default()
    }

    /// All remaining arguments, trimmed.
    fn remaining(&mut self) -> Vec<String> {
        self.args.by_ref().map(|arg| arg.trim().to_string()).collect()
    }
}
