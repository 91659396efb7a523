
mod types;
mod headers;
mod stream_state;
mod stream;
mod frame_utils;

mod connection_state;

mod body;
mod settings;
mod options;
mod connection;
mod connection_shared;
mod connection_reader;
mod connection_writer;

pub use connection::Connection;
pub use connection::ConnectionInitialState;
pub use options::ConnectionOptions;
pub use settings::SettingsContainer;