pub mod errors;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use errors::*;
pub use extract::*;
pub use handlers::*;
pub use routes::*;
