use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt::Display,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Http,
    Grpc,
}

/// Response header rules applied by a virtual host. Each map is keyed by header name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyResponseOptions {
    pub remove: BTreeMap<String, bool>,
    pub rename: BTreeMap<String, String>,
    pub replace: BTreeMap<String, String>,
    pub append: BTreeMap<String, String>,
}

impl ModifyResponseOptions {
    pub fn len(&self) -> usize {
        self.remove.len() + self.rename.len() + self.replace.len() + self.append.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualHostOptions {
    pub modify_response: ModifyResponseOptions,
    pub security_profile_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    #[serde(with = "super::duration")]
    pub timeout: Option<Duration>,
    #[serde(with = "super::duration")]
    pub idle_timeout: Option<Duration>,
    pub prefix_rewrite: String,
    pub upgrade_types: Vec<String>,
    pub backend_type: BackendType,
    pub use_regex: bool,
    pub allowed_methods: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsConflict {
    #[error("conflict with vh security profiles: {first} and {second}")]
    SecurityProfile { first: String, second: String },
    #[error("conflict with vh modify response {operation}: header {name} has values {first} and {second}")]
    ModifyResponse {
        operation: &'static str,
        name: String,
        first: String,
        second: String,
    },
}

impl VirtualHostOptions {
    /// Security profile with the empty string treated as unset.
    pub fn security_profile_id(&self) -> Option<&str> {
        self.security_profile_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.security_profile_id().is_none() && self.modify_response.is_empty()
    }

    /// Combines two option sets contributed to the same virtual host.
    ///
    /// A key present on both sides must carry the same value, a security profile set on both
    /// sides must be the same profile. Anything else is reported as a conflict and neither side
    /// wins.
    pub fn merge(&self, other: &VirtualHostOptions) -> Result<VirtualHostOptions, OptionsConflict> {
        let security_profile_id = match (self.security_profile_id(), other.security_profile_id()) {
            (Some(first), Some(second)) if first != second => {
                return Err(OptionsConflict::SecurityProfile {
                    first: first.to_owned(),
                    second: second.to_owned(),
                });
            }
            (first, second) => first.or(second).map(str::to_owned),
        };

        let this = &self.modify_response;
        let that = &other.modify_response;
        Ok(VirtualHostOptions {
            security_profile_id,
            modify_response: ModifyResponseOptions {
                append: merge_maps("append", &this.append, &that.append)?,
                remove: merge_maps("remove", &this.remove, &that.remove)?,
                rename: merge_maps("rename", &this.rename, &that.rename)?,
                replace: merge_maps("replace", &this.replace, &that.replace)?,
            },
        })
    }
}

fn merge_maps<V>(operation: &'static str, first: &BTreeMap<String, V>, second: &BTreeMap<String, V>) -> Result<BTreeMap<String, V>, OptionsConflict>
where
    V: Clone + PartialEq + Display,
{
    let mut merged = first.clone();
    for (name, value) in second {
        match merged.entry(name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
            }
            Entry::Occupied(entry) if entry.get() == value => (),
            Entry::Occupied(entry) => {
                return Err(OptionsConflict::ModifyResponse {
                    operation,
                    name: name.clone(),
                    first: entry.get().to_string(),
                    second: value.to_string(),
                });
            }
        }
    }
    Ok(merged)
}
