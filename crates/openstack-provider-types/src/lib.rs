// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal representation of an OpenStack machine provider configuration.
//!
//! Every external API version converts into and out of the types defined
//! here. Business logic should only ever see these types; the versioned
//! shapes live in `openstack_provider_types_versions`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// OpenStack specific configuration for a machine.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MachineProviderConfig {
    pub spec: MachineProviderConfigSpec,
}

/// The specification for an OpenStack instance.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct MachineProviderConfigSpec {
    /// ID of the image used by the machine.
    #[serde(rename = "imageID")]
    pub image_id: String,

    /// Name of the image used by the machine. `image_id` takes priority if
    /// both are set.
    pub image_name: String,

    pub region: String,
    pub availability_zone: String,
    pub flavor_name: String,

    /// Name of the key pair used for SSH access.
    pub key_name: String,

    pub security_groups: Vec<String>,

    /// Key-value pairs stored in the instance's metadata.
    pub tags: BTreeMap<String, String>,

    /// The primary network. This is the only network whose `cidr` is
    /// meaningful.
    pub network: OpenStackNetwork,

    /// Size of the root disk in GB.
    pub root_disk_size: i64,
    pub root_disk_type: Option<String>,
    pub use_config_drive: Option<bool>,

    #[serde(rename = "serverGroupID")]
    pub server_group_id: Option<String>,

    /// Secondary network attachments. Order is preserved across conversions
    /// but carries no meaning.
    pub additional_networks: Vec<OpenStackNetwork>,
}

/// A network a machine instance is attached to.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema,
)]
pub struct OpenStackNetwork {
    #[serde(rename = "networkID")]
    pub network_id: String,

    #[serde(rename = "subnetID")]
    pub subnet_id: String,

    /// The address range machines may use on this network. Only set on the
    /// primary network.
    pub cidr: String,

    /// Human-readable network name. `network_id` takes precedence when both
    /// could identify the network.
    pub name: String,
}

impl OpenStackNetwork {
    /// Returns true if no field of this network is set.
    pub fn is_unset(&self) -> bool {
        self == &Self::default()
    }
}
