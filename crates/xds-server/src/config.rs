//! Server configuration.

/// Configuration for the discovery server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Responses buffered per stream before the session waits for the
    /// client to read.
    pub response_buffer_size: usize,
    /// Serve the deprecated v2 discovery services.
    pub enable_legacy_v2: bool,
    /// Identifier reported in `control_plane` of every response.
    pub control_plane_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            response_buffer_size: 16,
            enable_legacy_v2: true,
            control_plane_id: None,
        }
    }
}
