// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Version `v1alpha2` of the machine provider configuration.
//!
//! This version names the primary network explicitly and stores a CIDR per
//! network, so it maps onto the internal representation field for field.

mod machine_config;

pub use machine_config::{
    MachineProviderConfig, MachineProviderConfigSpec, OpenStackNetwork,
};
