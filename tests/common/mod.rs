#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use anyhow::{bail, Context, Result};

use sqlwhitelist::api::{AclEntry, InstanceRef, InstanceStateClient};
use sqlwhitelist::public_ip::PublicIpSource;
use sqlwhitelist::token::TokenSource;

/// Hands out a fixed token, or fails like an unconfigured gcloud.
pub struct FakeTokens {
    pub token: Option<String>,
    pub calls: Cell<usize>,
}

impl FakeTokens {
    pub fn ok(token: &str) -> Self {
        FakeTokens {
            token: Some(token.to_string()),
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        FakeTokens {
            token: None,
            calls: Cell::new(0),
        }
    }
}

impl TokenSource for FakeTokens {
    fn access_token(&self) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.token.clone().context("gcloud is not configured")
    }
}

pub struct FakeIp {
    pub cidr: String,
    pub calls: Cell<usize>,
}

impl FakeIp {
    pub fn new(cidr: &str) -> Self {
        FakeIp {
            cidr: cidr.to_string(),
            calls: Cell::new(0),
        }
    }
}

impl PublicIpSource for FakeIp {
    fn public_cidr(&self) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.cidr.clone())
    }
}

/// In-memory instance. `entries: None` behaves like a response without
/// `authorizedNetworks`; `patch_ok: false` like a non-200 PATCH.
pub struct FakeApi {
    pub entries: Option<Vec<AclEntry>>,
    pub patch_ok: bool,
    pub token: Option<String>,
    pub fetches: Cell<usize>,
    pub patches: RefCell<Vec<(InstanceRef, Vec<AclEntry>)>>,
}

impl FakeApi {
    pub fn new(entries: Vec<AclEntry>) -> Self {
        FakeApi {
            entries: Some(entries),
            patch_ok: true,
            token: None,
            fetches: Cell::new(0),
            patches: RefCell::new(Vec::new()),
        }
    }

    pub fn patched(&self) -> Vec<Vec<AclEntry>> {
        self.patches
            .borrow()
            .iter()
            .map(|(_, entries)| entries.clone())
            .collect()
    }
}

impl InstanceStateClient for FakeApi {
    fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn authorized_networks(&self, _instance: &InstanceRef) -> Result<Vec<AclEntry>> {
        self.fetches.set(self.fetches.get() + 1);
        self.entries
            .clone()
            .context("Response has no settings.ipConfiguration.authorizedNetworks")
    }

    fn set_authorized_networks(&self, instance: &InstanceRef, entries: &[AclEntry]) -> Result<()> {
        self.patches
            .borrow_mut()
            .push((instance.clone(), entries.to_vec()));
        if !self.patch_ok {
            bail!("Updating authorized networks failed: 403 Forbidden");
        }
        Ok(())
    }
}

pub fn entry(name: &str, value: &str) -> AclEntry {
    AclEntry::new(name, value)
}
