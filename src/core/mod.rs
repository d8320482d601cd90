// Domain-layer modules and shared errors/models
pub mod chat_command {
    pub use crate::chat_command::*;
}

pub mod conversation {
    pub use crate::conversation::*;
}

pub mod form_state {
    pub use crate::form_state::*;
}

pub mod renderer {
    pub use crate::renderer::*;
}

pub mod request_builder {
    pub use crate::request_builder::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
