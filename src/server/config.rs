//! Server configuration.

use std::path::PathBuf;

use crate::config::ConfigBlock;

/// Listener and runtime settings read from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Plain HTTP port.
    pub port: u16,
    /// HTTPS port, used only when TLS material is configured.
    pub https_port: u16,
    /// Number of runtime worker threads.
    pub threads: usize,
    /// Advertised keep-alive setting. Informational only.
    pub keep_alive: i64,
    /// PEM certificate chain for the HTTPS listener.
    pub certificate: Option<PathBuf>,
    /// PEM private key for the HTTPS listener.
    pub private_key: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            https_port: 443,
            threads: 4,
            keep_alive: 0,
            certificate: None,
            private_key: None,
        }
    }
}

impl ServerConfig {
    /// Read the server settings from a parsed config tree.
    pub fn from_config(config: &ConfigBlock) -> Self {
        let path = |field: &str| config.find_str(field).filter(|v| !v.is_empty()).map(PathBuf::from);

        Self {
            port: config.get_port(),
            https_port: config.get_https_port(),
            threads: config.get_threads(),
            keep_alive: config.get_num("keep-alive"),
            certificate: path("certificate"),
            private_key: path("privateKey"),
        }
    }

    /// Certificate and key paths, when both are configured.
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.certificate.as_ref().zip(self.private_key.as_ref())
    }
}
