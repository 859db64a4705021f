use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Marks an existing account as logged in.
#[derive(Debug, PartialEq)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl Executable for Login {
    fn exec(self, _email: &str, store: Store) -> Result<Response, ServiceError> {
        let email = store.login(&self.email, &self.password)?;
        let message = format!("Welcome {}", email);

        Ok(Response::new(CommandType::Login, message).with_email(email))
    }
}

impl TryFrom<&mut CommandParser> for Login {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("login", 2, "email and password")?;

        Ok(Self {
            email: parser.next_arg(),
            password: parser.next_arg(),
        })
    }
}
