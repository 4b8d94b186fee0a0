pub mod crypto;
pub mod responses;

pub use crypto::generate_session_secret;
pub use responses::ResponseBuilder;
