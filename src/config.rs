//! Configuration for the link manager.
//!
//! This module handles loading and saving configuration from disk,
//! including the arbitration policy knobs.

use std::{env, fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HidLinkError, Result};

/// Policy configuration for the link manager.
#[derive(Serialize, Deserialize, Clone)]
pub struct LinkConfig {
   /// Whether an unsolicited incoming connection supersedes the pending
   /// connect target. The default favors accepting incoming connections
   /// over strict request fidelity.
   #[serde(default = "default_adopt_incoming")]
   pub adopt_incoming: bool,

   /// Debug-log reports dropped while no host is active. The drop is
   /// never surfaced to the caller either way.
   #[serde(default)]
   pub log_dropped_reports: bool,
}

const fn default_adopt_incoming() -> bool {
   true
}

impl Default for LinkConfig {
   fn default() -> Self {
      Self {
         adopt_incoming: default_adopt_incoming(),
         log_dropped_reports: false,
      }
   }
}

impl LinkConfig {
   /// Loads configuration from disk or creates default if not exists.
   pub fn load() -> Result<Self> {
      let config_path = Self::config_path()?;

      if config_path.exists() {
         let contents = fs::read_to_string(&config_path)?;
         Ok(toml::from_str(&contents)?)
      } else {
         // Create default config
         let config = Self::default();
         config.save()?;
         Ok(config)
      }
   }

   /// Saves the current configuration to disk.
   pub fn save(&self) -> Result<()> {
      let config_path = Self::config_path()?;

      // Ensure directory exists
      if let Some(parent) = config_path.parent() {
         fs::create_dir_all(parent)?;
      }

      let contents = toml::to_string_pretty(self)?;
      fs::write(&config_path, contents)?;

      Ok(())
   }

   fn config_path() -> Result<PathBuf> {
      let config_dir = if let Ok(hidlink_home) = env::var("HIDLINK_HOME") {
         PathBuf::from(hidlink_home)
      } else if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
         PathBuf::from(config_home)
      } else if let Ok(home) = env::var("HOME") {
         PathBuf::from(home).join(".config")
      } else {
         return Err(HidLinkError::ConfigDirNotFound);
      };

      Ok(config_dir.join("hidlink").join("config.toml"))
   }
}
