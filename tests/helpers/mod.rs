pub mod mock_server;

pub use mock_server::{MockQueryServer, ServerAction, ServerReport};
