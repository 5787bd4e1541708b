// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use openstack_provider_types as internal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::meta::{null_as_default, TypeMeta};

/// OpenStack specific configuration for a machine.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema,
)]
pub struct MachineProviderConfig {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default)]
    pub spec: MachineProviderConfigSpec,
}

/// Provider specific configuration for creating and managing machines.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema,
)]
#[serde(default, rename_all = "camelCase")]
pub struct MachineProviderConfigSpec {
    #[serde(rename = "imageID")]
    pub image_id: String,
    pub image_name: String,
    pub region: String,
    pub availability_zone: String,
    pub flavor_name: String,
    pub key_name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub security_groups: Vec<String>,

    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub tags: BTreeMap<String, String>,

    /// The primary network the instance belongs to.
    pub network: OpenStackNetwork,

    /// Size of the root disk in GB.
    #[serde(skip_serializing_if = "is_zero")]
    pub root_disk_size: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_disk_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_config_drive: Option<bool>,

    #[serde(
        rename = "serverGroupID",
        skip_serializing_if = "Option::is_none"
    )]
    pub server_group_id: Option<String>,

    /// Networks the machine is attached to in addition to `network`.
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub additional_networks: Vec<OpenStackNetwork>,
}

/// A network this instance belongs to.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema,
)]
#[serde(default)]
pub struct OpenStackNetwork {
    /// Network ID. Takes precedence over `name` if both are given.
    #[serde(rename = "networkID", skip_serializing_if = "String::is_empty")]
    pub network_id: String,

    #[serde(rename = "subnetID", skip_serializing_if = "String::is_empty")]
    pub subnet_id: String,

    /// The address range machines may use on this network.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cidr: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl From<OpenStackNetwork> for internal::OpenStackNetwork {
    fn from(old: OpenStackNetwork) -> Self {
        Self {
            network_id: old.network_id,
            subnet_id: old.subnet_id,
            cidr: old.cidr,
            name: old.name,
        }
    }
}

impl From<internal::OpenStackNetwork> for OpenStackNetwork {
    fn from(new: internal::OpenStackNetwork) -> Self {
        Self {
            network_id: new.network_id,
            subnet_id: new.subnet_id,
            cidr: new.cidr,
            name: new.name,
        }
    }
}

impl From<MachineProviderConfig> for internal::MachineProviderConfig {
    fn from(old: MachineProviderConfig) -> Self {
        Self { spec: old.spec.into() }
    }
}

impl From<MachineProviderConfigSpec> for internal::MachineProviderConfigSpec {
    fn from(old: MachineProviderConfigSpec) -> Self {
        Self {
            image_id: old.image_id,
            image_name: old.image_name,
            region: old.region,
            availability_zone: old.availability_zone,
            flavor_name: old.flavor_name,
            key_name: old.key_name,
            security_groups: old.security_groups,
            tags: old.tags,
            network: old.network.into(),
            root_disk_size: old.root_disk_size,
            root_disk_type: old.root_disk_type,
            use_config_drive: old.use_config_drive,
            server_group_id: old.server_group_id,
            additional_networks: old
                .additional_networks
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl From<internal::MachineProviderConfigSpec> for MachineProviderConfigSpec {
    fn from(new: internal::MachineProviderConfigSpec) -> Self {
        Self {
            image_id: new.image_id,
            image_name: new.image_name,
            region: new.region,
            availability_zone: new.availability_zone,
            flavor_name: new.flavor_name,
            key_name: new.key_name,
            security_groups: new.security_groups,
            tags: new.tags,
            network: new.network.into(),
            root_disk_size: new.root_disk_size,
            root_disk_type: new.root_disk_type,
            use_config_drive: new.use_config_drive,
            server_group_id: new.server_group_id,
            additional_networks: new
                .additional_networks
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}
