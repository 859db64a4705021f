use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandType};
use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

/// Creates a new account and immediately logs it in.
#[derive(Debug, PartialEq)]
pub struct Register {
    pub email: String,
    pub password: String,
}

impl Executable for Register {
    fn exec(self, _email: &str, store: Store) -> Result<Response, ServiceError> {
        let email = store.register(&self.email, &self.password)?;

        Ok(Response::new(CommandType::Register, "Account was registered successfully")
            .with_email(email))
    }
}

impl TryFrom<&mut CommandParser> for Register {
    type Error = ServiceError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.require("register", 2, "email and password")?;

        Ok(Self {
            email: parser.next_arg(),
            password: parser.next_arg(),
        })
    }
}
