use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Logs the requesting identity out. Never fails, even when it was not
/// logged in to begin with.
#[derive(Debug, PartialEq)]
pub struct Disconnect;

impl Executable for Disconnect {
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError> {
        store.disconnect(email);

        Ok(Response::new(CommandType::Disconnect, "Disconnected"))
    }
}

impl TryFrom<&mut CommandParser> for Disconnect {
    type Error = ServiceError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
