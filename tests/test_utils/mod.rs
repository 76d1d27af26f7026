pub mod mock_server;

pub use mock_server::spawn_server;
