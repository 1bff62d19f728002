pub use spyglass_core::model::PeerId;

pub mod model {
    pub use spyglass_core::model::*;
}

pub mod codec {
    pub use spyglass_core::codec::*;
}

pub mod session {
    pub use spyglass_session::*;
}
