// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the machine provider config scheme.
//!
//! The scheme needs to know which API group and kind it serves and which of
//! its registered versions is preferred. That is supplied here rather than
//! fixed at registration time.

use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GROUP: &str = "openstack.machine.provider";
pub const DEFAULT_KIND: &str = "MachineProviderConfig";

/// Scheme configuration.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SchemeConfig {
    /// API group expected in the `apiVersion` of decoded documents.
    pub group: String,

    /// Kind expected in decoded documents.
    pub kind: String,

    /// Registered versions, most preferred first. Documents in versions not
    /// listed here are rejected.
    #[serde(rename = "version-priority")]
    pub version_priority: Vec<String>,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
            kind: DEFAULT_KIND.to_string(),
            version_priority: vec![
                "v1alpha2".to_string(),
                "v1alpha1".to_string(),
            ],
        }
    }
}

/// Errors which may be returned when parsing the scheme configuration.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot parse toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a TOML file into a configuration object.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<SchemeConfig, ParseError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let cfg = toml::from_str::<SchemeConfig>(&contents)?;
    Ok(cfg)
}
