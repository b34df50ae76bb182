mod remote_vision_client;
mod remote_vision_connector;

pub use remote_vision_client::RemoteVisionClient;
pub use remote_vision_connector::RemoteVisionConnector;
