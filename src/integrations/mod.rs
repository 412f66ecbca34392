//! External service integrations.

pub mod llm_client {
    pub use crate::llm_client::*;
}

pub mod leads {
    pub use crate::leads::*;
}
