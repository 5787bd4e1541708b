// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network identity resolution and primary network selection.

use crate::v1alpha1;

/// Picks the identifier for a network: its ID if one is set, otherwise its
/// name.
pub fn id_or_name<'a>(id: &'a str, name: &'a str) -> &'a str {
    if !id.is_empty() {
        id
    } else {
        name
    }
}

/// How the primary network of a `v1alpha1` spec is determined.
///
/// The legacy shape never stores which network is primary, so it has to be
/// derived from whichever of the scalar `networkID` or the `networks` list
/// is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimarySelection {
    /// The scalar `networkID` is set and defines the primary network on its
    /// own. Any list entries (`ignored_entries` of them) are discarded.
    ScalarNetworkId { ignored_entries: usize },

    /// Neither the scalar nor the list is populated. The primary network is
    /// left unset.
    Unconfigured,

    /// The list holds exactly one entry, which is the primary network.
    ///
    /// Unlike every other branch, this one does not attach the pod network
    /// CIDR to the primary network. Existing documents depend on that, so it
    /// is kept as-is.
    SingleEntry,

    /// The entry at `index` is the first one flagged as the pod network.
    PodNetworkFlag { index: usize },

    /// Several entries are listed and none is flagged, so the first one is
    /// primary.
    FirstEntry,
}

impl PrimarySelection {
    /// Index into the `networks` list of the primary network, if the primary
    /// is taken from the list.
    pub fn list_index(&self) -> Option<usize> {
        match self {
            Self::SingleEntry | Self::FirstEntry => Some(0),
            Self::PodNetworkFlag { index } => Some(*index),
            Self::ScalarNetworkId { .. } | Self::Unconfigured => None,
        }
    }

    /// Whether the primary network receives the spec's `podNetworkCidr`.
    pub fn attaches_pod_network_cidr(&self) -> bool {
        !matches!(self, Self::SingleEntry | Self::Unconfigured)
    }
}

impl v1alpha1::MachineProviderConfigSpec {
    /// Classifies how this spec's primary network is chosen.
    pub fn primary_selection(&self) -> PrimarySelection {
        if !self.network_id.is_empty() {
            return PrimarySelection::ScalarNetworkId {
                ignored_entries: self.networks.len(),
            };
        }

        match self.networks.as_slice() {
            [] => PrimarySelection::Unconfigured,
            [_] => PrimarySelection::SingleEntry,
            networks => match networks.iter().position(|n| n.pod_network) {
                Some(index) => PrimarySelection::PodNetworkFlag { index },
                None => PrimarySelection::FirstEntry,
            },
        }
    }
}
