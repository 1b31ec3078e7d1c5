use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// TCP socket address to listen for incoming connections.
    /// The port is replaced by `PORT` when that variable is set.
    ///
    /// Default: `0.0.0.0:3000`
    pub listen_addr: SocketAddr,

    /// Maximum accepted request body, in bytes.
    ///
    /// Default: `262144`
    pub max_request_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: (Ipv4Addr::UNSPECIFIED, 3000).into(),
            max_request_size: 2 << 17, // 256kb
        }
    }
}

impl ApiConfig {
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        let port = std::env::var(PORT_ENV).ok();
        self.apply_port(port.as_deref())
    }

    fn apply_port(&mut self, port: Option<&str>) -> anyhow::Result<()> {
        let Some(port) = port.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid {PORT_ENV} value: {port:?}"))?;
        self.listen_addr.set_port(port);
        Ok(())
    }
}
