// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Versioned external shapes of the OpenStack machine provider configuration
//! and the conversions between them and the internal representation.
//!
//! `v1alpha1` is the legacy shape, which stores a flat list of networks and
//! leaves the primary network implicit. `v1alpha2` is the current shape,
//! which names the primary network explicitly. Both convert to and from
//! [`openstack_provider_types::MachineProviderConfigSpec`] through `From`
//! impls; [`scheme::Scheme`] dispatches between them by `apiVersion`.

pub mod impls;
pub mod latest;
pub mod meta;
pub mod scheme;
pub mod v1alpha1;
pub mod v1alpha2;
