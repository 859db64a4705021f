use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Acknowledges a stop request. Playback itself happens on the client; the
/// server only confirms the command so the client can tear its side
/// connection down.
#[derive(Debug, PartialEq)]
pub struct Stop;

impl Executable for Stop {
    fn exec(self, _email: &str, _store: Store) -> Result<Response, ServiceError> {
        Ok(Response::new(CommandType::Stop, "Song stopped"))
    }
}

impl TryFrom<&mut CommandParser> for Stop {
    type Error = ServiceError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
