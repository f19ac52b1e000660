use std::sync::Arc;

use chrono::{DateTime, Utc};
use store::StateDir;

use super::config::Config;

pub struct State {
    pub config: Config,
    pub boot_ts: DateTime<Utc>,
}

impl State {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            boot_ts: Utc::now(),
        })
    }

    pub fn state_dir(&self) -> &StateDir {
        &self.config.state_dir
    }
}
