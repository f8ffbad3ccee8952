//! HTTP transport settings shared by size probes and transfers.
//!
//! Built once at startup from the config. The connection limit is raised well
//! above typical client defaults so a parallel batch does not serialize behind
//! a handful of connections.

mod budget;

pub use budget::{ConnectionBudget, ConnectionSlot};

use std::time::Duration;

use crate::config::ScdlConfig;

/// Connection limit used when nothing else is configured.
pub const DEFAULT_MAX_CONNECTIONS: usize = 50;

/// curl settings applied to every easy handle.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Hard limit for a HEAD probe.
    pub probe_timeout: Duration,
    /// Abort a transfer whose throughput stays below this many bytes/s ...
    pub low_speed_limit: u32,
    /// ... for this long.
    pub low_speed_time: Duration,
    pub user_agent: Option<String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            user_agent: None,
        }
    }
}

impl TransportOptions {
    pub fn from_config(cfg: &ScdlConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            probe_timeout: Duration::from_secs(cfg.probe_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }

    /// Apply the common options to a fresh easy handle.
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }
        Ok(())
    }
}

/// Transport options plus the process-wide connection budget.
#[derive(Debug)]
pub struct Transport {
    options: TransportOptions,
    budget: ConnectionBudget,
}

impl Transport {
    pub fn new(options: TransportOptions, max_connections: usize) -> Self {
        Self {
            options,
            budget: ConnectionBudget::new(max_connections),
        }
    }

    pub fn from_config(cfg: &ScdlConfig) -> Self {
        Self::new(TransportOptions::from_config(cfg), cfg.max_connections)
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn budget(&self) -> &ConnectionBudget {
        &self.budget
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(TransportOptions::default(), DEFAULT_MAX_CONNECTIONS)
    }
}
