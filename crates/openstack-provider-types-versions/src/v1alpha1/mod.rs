// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Version `v1alpha1` of the machine provider configuration.
//!
//! This is the legacy shape. Networks are a flat list with an optional
//! `podNetwork` flag, or a single scalar `networkID`, and the pod network
//! CIDR is stored once for the whole spec.

mod machine_config;

pub use machine_config::{
    MachineProviderConfig, MachineProviderConfigSpec, OpenStackNetwork,
};
