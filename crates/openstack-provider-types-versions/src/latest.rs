// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Re-exports of the latest external version of all published types.
//!
//! Callers encoding documents for display or persistence should use these
//! re-exports rather than versioned identifiers directly.

pub mod machine_config {
    pub use crate::v1alpha2::MachineProviderConfig;
    pub use crate::v1alpha2::MachineProviderConfigSpec;
    pub use crate::v1alpha2::OpenStackNetwork;
}

pub mod meta {
    pub use crate::meta::TypeMeta;
    pub use crate::scheme::ApiVersion;

    /// The version documents are encoded in when no other is requested.
    pub const LATEST: ApiVersion = ApiVersion::V1Alpha2;
}
