use crate::error::ServiceError;
use crate::frame::Response;
use crate::store::Store;

pub trait Executable {
    /// Runs the command against the store on behalf of `email` (empty when
    /// the peer has not authenticated yet).
    fn exec(self, email: &str, store: Store) -> Result<Response, ServiceError>;
}
