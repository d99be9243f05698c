//! Configuration types for DSM client sessions

use serde::{Deserialize, Serialize};

use crate::schema::NameOptions;

/// Configuration for a [`DsmClient`](super::DsmClient)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name decoding options, including the lenient dimension-marker
    /// compatibility flag
    pub name_options: NameOptions,
}

impl ClientConfig {
    /// Create a configuration with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name decoding options
    pub fn with_name_options(mut self, name_options: NameOptions) -> Self {
        self.name_options = name_options;
        self
    }
}
