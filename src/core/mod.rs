// Domain-layer modules and shared errors/models
pub mod assessment {
    pub use crate::assessment::*;
}

pub mod validation {
    pub use crate::validation::*;
}

pub mod prompt {
    pub use crate::prompt::*;
}

pub mod parser {
    pub use crate::parser::*;
}

pub mod metrics {
    pub use crate::metrics::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
