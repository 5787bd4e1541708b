// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Version-aware decoding and encoding of machine provider configurations.
//!
//! A [`Scheme`] knows which API versions are registered and in what order of
//! preference. It reads the `apiVersion` of an incoming document, decodes
//! the matching versioned shape and converts it to the internal
//! representation. Encoding goes the other way, defaulting to the most
//! preferred version.

use std::fmt;
use std::str::FromStr;

use openstack_provider_types as internal;
use openstack_scheme_config::SchemeConfig;
use serde::Deserialize;
use serde_json::Value;
use slog::{debug, o, warn, Logger};
use thiserror::Error;

use crate::impls::network::PrimarySelection;
use crate::meta::TypeMeta;
use crate::{v1alpha1, v1alpha2};

/// The external API versions of the machine provider configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersion {
    V1Alpha1,
    V1Alpha2,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 2] =
        [ApiVersion::V1Alpha1, ApiVersion::V1Alpha2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1Alpha1 => "v1alpha1",
            Self::V1Alpha2 => "v1alpha2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown API version: {0:?}")]
pub struct UnknownVersion(pub String);

impl FromStr for ApiVersion {
    type Err = UnknownVersion;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVersion(s.to_owned()))
    }
}

/// Errors in a version priority list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PriorityError {
    #[error("version priority list is empty")]
    Empty,

    #[error("version {0} listed more than once")]
    Duplicate(ApiVersion),
}

/// Registered versions in order of preference, most preferred first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionPriority(Vec<ApiVersion>);

impl VersionPriority {
    pub fn new(versions: Vec<ApiVersion>) -> Result<Self, PriorityError> {
        if versions.is_empty() {
            return Err(PriorityError::Empty);
        }
        for (i, v) in versions.iter().enumerate() {
            if versions[..i].contains(v) {
                return Err(PriorityError::Duplicate(*v));
            }
        }
        Ok(Self(versions))
    }

    pub fn preferred(&self) -> ApiVersion {
        // Non-empty by construction.
        self.0[0]
    }

    pub fn contains(&self, version: ApiVersion) -> bool {
        self.0.contains(&version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiVersion> {
        self.0.iter()
    }
}

impl fmt::Display for VersionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl Default for VersionPriority {
    fn default() -> Self {
        Self(vec![ApiVersion::V1Alpha2, ApiVersion::V1Alpha1])
    }
}

/// A decoded document, still in the shape of the version it was written in.
#[derive(Clone, Debug, PartialEq)]
pub enum VersionedMachineProviderConfig {
    V1Alpha1(v1alpha1::MachineProviderConfig),
    V1Alpha2(v1alpha2::MachineProviderConfig),
}

impl VersionedMachineProviderConfig {
    pub fn version(&self) -> ApiVersion {
        match self {
            Self::V1Alpha1(_) => ApiVersion::V1Alpha1,
            Self::V1Alpha2(_) => ApiVersion::V1Alpha2,
        }
    }

    pub fn type_meta(&self) -> &TypeMeta {
        match self {
            Self::V1Alpha1(c) => &c.type_meta,
            Self::V1Alpha2(c) => &c.type_meta,
        }
    }
}

impl From<VersionedMachineProviderConfig> for internal::MachineProviderConfig {
    fn from(versioned: VersionedMachineProviderConfig) -> Self {
        match versioned {
            VersionedMachineProviderConfig::V1Alpha1(c) => c.into(),
            VersionedMachineProviderConfig::V1Alpha2(c) => c.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SchemeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no apiVersion")]
    MissingTypeMeta,

    #[error("expected API group {expected:?}, found {found:?}")]
    GroupMismatch { expected: String, found: String },

    #[error("expected kind {expected:?}, found {found:?}")]
    KindMismatch { expected: String, found: String },

    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersion),

    #[error("API version {0} is not registered")]
    UnregisteredVersion(ApiVersion),

    #[error("invalid version priority: {0}")]
    Priority(#[from] PriorityError),
}

/// Decodes and encodes machine provider configurations across versions.
pub struct Scheme {
    group: String,
    kind: String,
    priority: VersionPriority,
    log: Logger,
}

impl Scheme {
    /// Builds a scheme from its configuration.
    pub fn new(
        config: &SchemeConfig,
        log: Logger,
    ) -> Result<Self, SchemeError> {
        let versions = config
            .version_priority
            .iter()
            .map(|v| v.parse())
            .collect::<Result<Vec<ApiVersion>, _>>()?;
        let priority = VersionPriority::new(versions)?;
        Ok(Self::with_priority(&config.group, &config.kind, priority, log))
    }

    pub fn with_priority(
        group: &str,
        kind: &str,
        priority: VersionPriority,
        log: Logger,
    ) -> Self {
        let log = log
            .new(o!("component" => "scheme", "group" => group.to_owned()));
        debug!(log, "registered versions"; "priority" => %priority);
        Self { group: group.to_owned(), kind: kind.to_owned(), priority, log }
    }

    pub fn priority(&self) -> &VersionPriority {
        &self.priority
    }

    /// The version used for encoding when none is requested.
    pub fn preferred_version(&self) -> ApiVersion {
        self.priority.preferred()
    }

    /// The full `apiVersion` string for `version` in this scheme's group.
    pub fn api_version(&self, version: ApiVersion) -> String {
        if self.group.is_empty() {
            version.to_string()
        } else {
            format!("{}/{}", self.group, version)
        }
    }

    fn resolve_version(
        &self,
        meta: &TypeMeta,
    ) -> Result<ApiVersion, SchemeError> {
        if meta.api_version.is_empty() {
            return Err(SchemeError::MissingTypeMeta);
        }
        let (group, version) = meta.group_version();
        if group != self.group {
            return Err(SchemeError::GroupMismatch {
                expected: self.group.clone(),
                found: group.to_owned(),
            });
        }
        if !meta.kind.is_empty() && meta.kind != self.kind {
            return Err(SchemeError::KindMismatch {
                expected: self.kind.clone(),
                found: meta.kind.clone(),
            });
        }
        let version: ApiVersion = version.parse()?;
        if !self.priority.contains(version) {
            return Err(SchemeError::UnregisteredVersion(version));
        }
        Ok(version)
    }

    /// Decodes a JSON document into the shape of the version it declares.
    pub fn decode_versioned(
        &self,
        raw: &[u8],
    ) -> Result<VersionedMachineProviderConfig, SchemeError> {
        let value: Value = serde_json::from_slice(raw)?;
        let meta = TypeMeta::deserialize(&value)?;
        let version = self.resolve_version(&meta)?;
        debug!(self.log, "decoding machine provider config";
            "version" => %version);

        let versioned = match version {
            ApiVersion::V1Alpha1 => VersionedMachineProviderConfig::V1Alpha1(
                serde_json::from_value(value)?,
            ),
            ApiVersion::V1Alpha2 => VersionedMachineProviderConfig::V1Alpha2(
                serde_json::from_value(value)?,
            ),
        };
        Ok(versioned)
    }

    /// Decodes a JSON document in any registered version into the internal
    /// representation.
    pub fn decode(
        &self,
        raw: &[u8],
    ) -> Result<internal::MachineProviderConfig, SchemeError> {
        let versioned = self.decode_versioned(raw)?;
        if let VersionedMachineProviderConfig::V1Alpha1(c) = &versioned {
            self.log_primary_selection(&c.spec);
        }
        let config: internal::MachineProviderConfig = versioned.into();
        if config.spec.network.is_unset() {
            debug!(self.log, "document configures no primary network");
        }
        Ok(config)
    }

    fn log_primary_selection(
        &self,
        spec: &v1alpha1::MachineProviderConfigSpec,
    ) {
        let selection = spec.primary_selection();
        debug!(self.log, "selected primary network";
            "selection" => ?selection);
        match selection {
            PrimarySelection::ScalarNetworkId { ignored_entries }
                if ignored_entries > 0 =>
            {
                warn!(self.log,
                    "both networkID and networks are set, ignoring networks";
                    "network_id" => &spec.network_id,
                    "ignored_entries" => ignored_entries);
            }
            PrimarySelection::SingleEntry
                if !spec.pod_network_cidr.is_empty() =>
            {
                warn!(self.log,
                    "single network entry does not receive podNetworkCidr";
                    "pod_network_cidr" => &spec.pod_network_cidr);
            }
            _ => {}
        }
    }

    /// Encodes `config` as a JSON document in `version`, or in the preferred
    /// version if none is given.
    pub fn encode(
        &self,
        config: internal::MachineProviderConfig,
        version: Option<ApiVersion>,
    ) -> Result<Value, SchemeError> {
        let version = version.unwrap_or_else(|| self.preferred_version());
        if !self.priority.contains(version) {
            return Err(SchemeError::UnregisteredVersion(version));
        }
        debug!(self.log, "encoding machine provider config";
            "version" => %version);

        let type_meta = TypeMeta {
            api_version: self.api_version(version),
            kind: self.kind.clone(),
        };
        let value = match version {
            ApiVersion::V1Alpha1 => {
                serde_json::to_value(v1alpha1::MachineProviderConfig {
                    type_meta,
                    spec: config.spec.into(),
                })?
            }
            ApiVersion::V1Alpha2 => {
                serde_json::to_value(v1alpha2::MachineProviderConfig {
                    type_meta,
                    spec: config.spec.into(),
                })?
            }
        };
        Ok(value)
    }

    /// Re-encodes a document in `target`, or in the preferred version.
    pub fn convert(
        &self,
        raw: &[u8],
        target: Option<ApiVersion>,
    ) -> Result<Value, SchemeError> {
        let config = self.decode(raw)?;
        self.encode(config, target)
    }
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use openstack_scheme_config::SchemeConfig;
    use serde_json::json;
    use slog::{o, Drain, Level, Logger, Never, OwnedKVList, Record};

    use super::*;
    use crate::latest;

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, o!())
    }

    fn default_scheme() -> Scheme {
        Scheme::new(&SchemeConfig::default(), test_logger()).unwrap()
    }

    /// Keeps the level and message of every record logged through it.
    #[derive(Clone, Default)]
    struct CaptureDrain(Arc<Mutex<Vec<(Level, String)>>>);

    impl Drain for CaptureDrain {
        type Ok = ();
        type Err = Never;

        fn log(
            &self,
            record: &Record<'_>,
            _values: &OwnedKVList,
        ) -> Result<(), Never> {
            self.0
                .lock()
                .unwrap()
                .push((record.level(), record.msg().to_string()));
            Ok(())
        }
    }

    impl CaptureDrain {
        fn warnings(&self) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(level, _)| *level == Level::Warning)
                .map(|(_, msg)| msg.clone())
                .collect()
        }
    }

    fn capturing_scheme() -> (Scheme, CaptureDrain) {
        let drain = CaptureDrain::default();
        let log = Logger::root(drain.clone(), o!());
        let scheme = Scheme::new(&SchemeConfig::default(), log).unwrap();
        (scheme, drain)
    }

    fn doc(version: &str, spec: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "apiVersion": format!("openstack.machine.provider/{version}"),
            "kind": "MachineProviderConfig",
            "spec": spec,
        }))
        .unwrap()
    }

    #[test]
    fn api_version_parse_and_display() {
        for v in ApiVersion::ALL {
            assert_eq!(v.to_string().parse::<ApiVersion>(), Ok(v));
        }
        assert_eq!(
            "v2".parse::<ApiVersion>(),
            Err(UnknownVersion("v2".to_string()))
        );
    }

    #[test]
    fn priority_validation() {
        assert_eq!(VersionPriority::new(vec![]), Err(PriorityError::Empty));
        assert_eq!(
            VersionPriority::new(vec![
                ApiVersion::V1Alpha1,
                ApiVersion::V1Alpha1
            ]),
            Err(PriorityError::Duplicate(ApiVersion::V1Alpha1))
        );
        let p = VersionPriority::new(vec![ApiVersion::V1Alpha1]).unwrap();
        assert_eq!(p.preferred(), ApiVersion::V1Alpha1);
        assert!(!p.contains(ApiVersion::V1Alpha2));
        assert_eq!(p.to_string(), "v1alpha1");
        assert_eq!(
            VersionPriority::default().to_string(),
            "v1alpha2, v1alpha1"
        );
    }

    #[test]
    fn current_version_is_preferred_by_default() {
        let scheme = default_scheme();
        assert_eq!(scheme.preferred_version(), ApiVersion::V1Alpha2);
        assert_eq!(scheme.priority(), &VersionPriority::default());
    }

    #[test]
    fn bad_config_is_rejected() {
        let config = SchemeConfig {
            version_priority: vec!["v1beta1".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            Scheme::new(&config, test_logger()),
            Err(SchemeError::UnknownVersion(_))
        ));

        let config =
            SchemeConfig { version_priority: vec![], ..Default::default() };
        assert!(matches!(
            Scheme::new(&config, test_logger()),
            Err(SchemeError::Priority(PriorityError::Empty))
        ));
    }

    #[test]
    fn decode_legacy_document() {
        let raw = doc(
            "v1alpha1",
            json!({
                "networkID": "",
                "networks": [
                    { "id": "", "name": "net-a", "podNetwork": false },
                    { "id": "net-b-id", "name": "net-b", "podNetwork": true },
                ],
                "podNetworkCidr": "10.0.0.0/24",
            }),
        );

        let config = default_scheme().decode(&raw).unwrap();
        assert_eq!(config.spec.network.network_id, "net-b-id");
        assert_eq!(config.spec.network.cidr, "10.0.0.0/24");
        assert_eq!(config.spec.additional_networks.len(), 1);
        assert_eq!(config.spec.additional_networks[0].network_id, "net-a");
        assert_eq!(config.spec.additional_networks[0].cidr, "");
    }

    #[test]
    fn decode_accepts_null_collections() {
        let scheme = default_scheme();

        let raw = doc(
            "v1alpha2",
            json!({
                "securityGroups": null,
                "network": { "networkID": "n" },
            }),
        );
        let config = scheme.decode(&raw).unwrap();
        assert!(config.spec.security_groups.is_empty());
        assert_eq!(config.spec.network.network_id, "n");

        let raw = doc(
            "v1alpha1",
            json!({
                "networkID": "n",
                "networks": null,
                "tags": null,
                "securityGroups": null,
            }),
        );
        let config = scheme.decode(&raw).unwrap();
        assert!(config.spec.tags.is_empty());
        assert!(config.spec.additional_networks.is_empty());
        assert_eq!(config.spec.network.network_id, "n");
    }

    #[test]
    fn scalar_network_id_with_list_warns() {
        let (scheme, drain) = capturing_scheme();
        let raw = doc(
            "v1alpha1",
            json!({
                "networkID": "scalar",
                "networks": [ { "id": "a" }, { "id": "b" } ],
            }),
        );
        let config = scheme.decode(&raw).unwrap();
        assert_eq!(config.spec.network.network_id, "scalar");

        let warnings = drain.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("ignoring networks"));
    }

    #[test]
    fn single_entry_dropping_cidr_warns() {
        let (scheme, drain) = capturing_scheme();
        let raw = doc(
            "v1alpha1",
            json!({
                "networks": [ { "name": "only" } ],
                "podNetworkCidr": "10.0.0.0/24",
            }),
        );
        let config = scheme.decode(&raw).unwrap();
        assert_eq!(config.spec.network.cidr, "");

        let warnings = drain.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("podNetworkCidr"));
    }

    #[test]
    fn unambiguous_legacy_documents_do_not_warn() {
        let (scheme, drain) = capturing_scheme();

        let single_without_cidr =
            doc("v1alpha1", json!({ "networks": [ { "name": "only" } ] }));
        scheme.decode(&single_without_cidr).unwrap();

        let scalar_without_list = doc(
            "v1alpha1",
            json!({
                "networkID": "scalar",
                "podNetworkCidr": "10.0.0.0/24",
            }),
        );
        scheme.decode(&scalar_without_list).unwrap();

        let flagged_list = doc(
            "v1alpha1",
            json!({
                "networks": [
                    { "id": "a" },
                    { "id": "b", "podNetwork": true },
                ],
                "podNetworkCidr": "10.0.0.0/24",
            }),
        );
        scheme.decode(&flagged_list).unwrap();

        assert!(drain.warnings().is_empty());
    }

    #[test]
    fn decode_versioned_keeps_shape() {
        let raw = doc("v1alpha2", json!({ "network": { "networkID": "n" } }));
        let versioned = default_scheme().decode_versioned(&raw).unwrap();
        assert_eq!(versioned.version(), ApiVersion::V1Alpha2);
        assert_eq!(versioned.type_meta().kind, "MachineProviderConfig");
        let VersionedMachineProviderConfig::V1Alpha2(c) = versioned else {
            panic!("expected v1alpha2 document");
        };
        assert_eq!(c.spec.network.network_id, "n");
    }

    #[test]
    fn decode_rejects_bad_type_meta() {
        let scheme = default_scheme();

        let raw = serde_json::to_vec(&json!({ "spec": {} })).unwrap();
        assert!(matches!(
            scheme.decode(&raw),
            Err(SchemeError::MissingTypeMeta)
        ));

        let raw = serde_json::to_vec(&json!({
            "apiVersion": "other.group/v1alpha1",
            "spec": {},
        }))
        .unwrap();
        assert!(matches!(
            scheme.decode(&raw),
            Err(SchemeError::GroupMismatch { .. })
        ));

        let raw = serde_json::to_vec(&json!({
            "apiVersion": "openstack.machine.provider/v1alpha1",
            "kind": "Machine",
        }))
        .unwrap();
        assert!(matches!(
            scheme.decode(&raw),
            Err(SchemeError::KindMismatch { .. })
        ));

        let raw = doc("v9", json!({}));
        assert!(matches!(
            scheme.decode(&raw),
            Err(SchemeError::UnknownVersion(_))
        ));

        assert!(matches!(
            scheme.decode(b"not json"),
            Err(SchemeError::Json(_))
        ));
    }

    #[test]
    fn unregistered_versions_are_refused() {
        let scheme = Scheme::with_priority(
            "openstack.machine.provider",
            "MachineProviderConfig",
            VersionPriority::new(vec![ApiVersion::V1Alpha2]).unwrap(),
            test_logger(),
        );
        let raw = doc("v1alpha1", json!({ "networkID": "n" }));
        assert!(matches!(
            scheme.decode(&raw),
            Err(SchemeError::UnregisteredVersion(ApiVersion::V1Alpha1))
        ));
        assert!(matches!(
            scheme.encode(Default::default(), Some(ApiVersion::V1Alpha1)),
            Err(SchemeError::UnregisteredVersion(ApiVersion::V1Alpha1))
        ));
    }

    #[test]
    fn encode_defaults_to_preferred_version() {
        let scheme = default_scheme();
        let config = internal::MachineProviderConfig {
            spec: internal::MachineProviderConfigSpec {
                network: internal::OpenStackNetwork {
                    network_id: "n".to_string(),
                    cidr: "10.0.0.0/24".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        };

        let v = scheme.encode(config.clone(), None).unwrap();
        assert_eq!(scheme.preferred_version(), latest::meta::LATEST);
        assert_eq!(v["apiVersion"], "openstack.machine.provider/v1alpha2");
        assert_eq!(v["kind"], "MachineProviderConfig");
        let current: latest::machine_config::MachineProviderConfig =
            serde_json::from_value(v).unwrap();
        assert_eq!(current.spec.network.network_id, "n");
        assert_eq!(current.spec.network.cidr, "10.0.0.0/24");

        let v = scheme.encode(config, Some(ApiVersion::V1Alpha1)).unwrap();
        assert_eq!(v["apiVersion"], "openstack.machine.provider/v1alpha1");
        assert_eq!(v["spec"]["networkID"], "n");
        assert_eq!(v["spec"]["podNetworkCidr"], "10.0.0.0/24");
    }

    #[test]
    fn convert_legacy_list_to_current() {
        let raw = doc(
            "v1alpha1",
            json!({
                "networks": [
                    { "name": "a" },
                    { "name": "b" },
                ],
                "subnetID": "s",
                "podNetworkCidr": "10.0.0.0/24",
            }),
        );

        let v = default_scheme().convert(&raw, None).unwrap();
        assert_eq!(
            v["spec"]["network"],
            json!({ "networkID": "a", "subnetID": "s", "cidr": "10.0.0.0/24" })
        );
        assert_eq!(
            v["spec"]["additionalNetworks"],
            json!([{ "networkID": "b", "subnetID": "s" }])
        );
    }

    #[test]
    fn current_document_survives_conversion() {
        let scheme = default_scheme();
        let raw = doc(
            "v1alpha2",
            json!({
                "imageID": "img",
                "imageName": "",
                "region": "r",
                "availabilityZone": "az",
                "flavorName": "f",
                "keyName": "k",
                "securityGroups": ["default"],
                "tags": { "a": "b" },
                "network": {
                    "networkID": "n",
                    "subnetID": "s",
                    "cidr": "10.0.0.0/24",
                    "name": "pri",
                },
                "rootDiskSize": 20,
                "rootDiskType": "ssd",
                "useConfigDrive": true,
                "serverGroupID": "sg",
                "additionalNetworks": [ { "name": "extra" } ],
            }),
        );
        let original: Value = serde_json::from_slice(&raw).unwrap();
        let v = scheme.convert(&raw, Some(ApiVersion::V1Alpha2)).unwrap();
        assert_eq!(v, original);
    }
}
