pub mod frame_helpers;
pub mod mock_transport;

pub use frame_helpers::*;
pub use mock_peer::*;
pub use mock_transport::*;
pub use signal_helpers::*;
