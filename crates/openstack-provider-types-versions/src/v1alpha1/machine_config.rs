// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use openstack_provider_types as internal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::impls::network::{id_or_name, PrimarySelection};
use crate::meta::{null_as_default, TypeMeta};

/// OpenStack specific configuration for a machine.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, JsonSchema,
)]
pub struct MachineProviderConfig {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default)]
    pub spec: MachineProviderConfigSpec,
}

/// Provider specific configuration for creating and managing machines.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, JsonSchema,
)]
#[serde(default, rename_all = "camelCase")]
pub struct MachineProviderConfigSpec {
    /// ID of the image used by the machine.
    #[serde(rename = "imageID")]
    pub image_id: String,

    /// Name of the image used by the machine. `imageID` takes priority.
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

    /// ID of the primary network. Mutually exclusive with `networks`; if
    /// both are set this one wins.
    #[serde(rename = "networkID")]
    pub network_id: String,

    #[serde(rename = "subnetID", skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,

    /// CIDR of the pod network, shared by the whole spec.
    pub pod_network_cidr: String,

    /// Networks the instance belongs to.
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub networks: Vec<OpenStackNetwork>,

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
}

/// A network reference in the legacy shape.
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, JsonSchema,
)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenStackNetwork {
    /// Network ID. Takes priority over `name`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Marks the network whose CIDR is the pod network CIDR.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pod_network: bool,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl From<MachineProviderConfig> for internal::MachineProviderConfig {
    fn from(old: MachineProviderConfig) -> Self {
        Self { spec: old.spec.into() }
    }
}

impl From<MachineProviderConfigSpec> for internal::MachineProviderConfigSpec {
    fn from(old: MachineProviderConfigSpec) -> Self {
        let selection = old.primary_selection();
        let MachineProviderConfigSpec {
            image_id,
            image_name,
            region,
            availability_zone,
            flavor_name,
            key_name,
            security_groups,
            tags,
            network_id,
            subnet_id,
            pod_network_cidr,
            networks,
            root_disk_size,
            root_disk_type,
            use_config_drive,
            server_group_id,
        } = old;

        let subnet_id = subnet_id.unwrap_or_default();
        let mut network = internal::OpenStackNetwork::default();
        let mut additional_networks = Vec::new();

        match selection {
            PrimarySelection::ScalarNetworkId { .. } => {
                network = internal::OpenStackNetwork {
                    network_id,
                    subnet_id,
                    cidr: pod_network_cidr,
                    name: String::new(),
                };
            }
            PrimarySelection::Unconfigured => {}
            PrimarySelection::SingleEntry
            | PrimarySelection::PodNetworkFlag { .. }
            | PrimarySelection::FirstEntry => {
                let primary = selection.list_index();
                additional_networks.reserve(networks.len() - 1);
                for (i, n) in networks.into_iter().enumerate() {
                    let mut nw = internal::OpenStackNetwork {
                        network_id: id_or_name(&n.id, &n.name).to_owned(),
                        subnet_id: subnet_id.clone(),
                        ..Default::default()
                    };
                    if primary == Some(i) {
                        if selection.attaches_pod_network_cidr() {
                            nw.cidr = pod_network_cidr.clone();
                        }
                        network = nw;
                    } else {
                        additional_networks.push(nw);
                    }
                }
            }
        }

        Self {
            image_id,
            image_name,
            region,
            availability_zone,
            flavor_name,
            key_name,
            security_groups,
            tags,
            network,
            root_disk_size,
            root_disk_type,
            use_config_drive,
            server_group_id,
            additional_networks,
        }
    }
}

impl From<internal::MachineProviderConfigSpec> for MachineProviderConfigSpec {
    fn from(new: internal::MachineProviderConfigSpec) -> Self {
        let internal::MachineProviderConfigSpec {
            image_id,
            image_name,
            region,
            availability_zone,
            flavor_name,
            key_name,
            security_groups,
            tags,
            network,
            root_disk_size,
            root_disk_type,
            use_config_drive,
            server_group_id,
            additional_networks,
        } = new;

        let subnet_id =
            (!network.subnet_id.is_empty()).then_some(network.subnet_id);

        // Without additional networks the scalar form is enough. Otherwise
        // the list is rebuilt with the primary network flagged and first.
        let (network_id, networks) = if additional_networks.is_empty() {
            (network.network_id, Vec::new())
        } else {
            let primary = OpenStackNetwork {
                id: network.network_id,
                name: String::new(),
                pod_network: true,
            };
            let networks = std::iter::once(primary)
                .chain(additional_networks.into_iter().map(|n| {
                    OpenStackNetwork {
                        id: n.network_id,
                        name: String::new(),
                        pod_network: false,
                    }
                }))
                .collect();
            (String::new(), networks)
        };

        Self {
            image_id,
            image_name,
            region,
            availability_zone,
            flavor_name,
            key_name,
            security_groups,
            tags,
            network_id,
            subnet_id,
            pod_network_cidr: network.cidr,
            networks,
            root_disk_size,
            root_disk_type,
            use_config_drive,
            server_group_id,
        }
    }
}
