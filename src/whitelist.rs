// The whitelist update flow. A run is five steps, each depending on the
// previous one: access token, public IP, config, current authorized networks,
// and finally the entry name plus the update itself. The first failing step
// ends the run; nothing remote changes before the final PATCH.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::api::{AclEntry, InstanceRef, InstanceStateClient};
use crate::config::{Config, ConfigStore};
use crate::prompt::Prompter;
use crate::public_ip::PublicIpSource;
use crate::token::TokenSource;
use crate::ui;

/// Last item of the name picker; choosing it asks for a new name.
pub const NEW_VALUE: &str = "NEW VALUE";

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated { name: String, cidr: String },
    AlreadyUpToDate { name: String },
}

/// What has to be sent, if anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    UpToDate,
    Replace(Vec<AclEntry>),
}

/// Decide the new authorized-network list for `name` pointing at `cidr`.
///
/// Nothing is sent when an entry already has both the name and the value.
/// Otherwise every entry that shares either the name or the value is dropped
/// and a fresh entry is appended, so an unrelated entry that happens to hold
/// the same address is removed as well.
pub fn plan_update(current: &[AclEntry], name: &str, cidr: &str) -> Plan {
    if current.iter().any(|e| e.value == cidr && e.name == name) {
        return Plan::UpToDate;
    }
    let mut entries: Vec<AclEntry> = current
        .iter()
        .filter(|e| e.value != cidr && e.name != name)
        .cloned()
        .collect();
    entries.push(AclEntry::new(name, cidr));
    Plan::Replace(entries)
}

/// Everything a run talks to.
pub struct Session<'a> {
    pub tokens: &'a dyn TokenSource,
    pub public_ip: &'a dyn PublicIpSource,
    pub api: &'a mut dyn InstanceStateClient,
    pub store: &'a mut dyn ConfigStore,
    pub prompter: &'a mut dyn Prompter,
}

impl<'a> Session<'a> {
    pub fn run(&mut self) -> Result<Outcome> {
        let token = ui::step("Getting access token", Some("Configure gcloud"), || {
            self.tokens.access_token()
        })?;
        self.api.set_token(&token);

        let cidr = ui::step("Getting current IP address", None, || {
            self.public_ip.public_cidr()
        })?;
        info!(cidr = %cidr, "current public address");

        let mut config = resolve_config(self.store, self.prompter)?;
        let instance = config
            .instance()
            .context("Config has no project id or instance id")?;

        let api = &*self.api;
        let current = ui::step("Getting current whitelisted IP address", None, || {
            api.authorized_networks(&instance)
        })?;

        let name = resolve_name(&mut config, &current, self.store, self.prompter)?;

        commit_update(self.api, &instance, &name, &cidr, &current)
    }
}

/// Reuse the stored project/instance if the operator agrees, otherwise ask
/// for both and save them. A missing or unreadable file just means asking.
pub fn resolve_config(store: &mut dyn ConfigStore, prompter: &mut dyn Prompter) -> Result<Config> {
    let mut config = match store.load() {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %format!("{e:#}"), "no usable config");
            Config::default()
        }
    };

    if let Some(instance) = config.instance() {
        println!("PROJECT ID:   {}", instance.project_id);
        println!("INSTANCE ID:  {}", instance.instance_id);
        if prompter.confirm("Do you want to use this config?")? {
            return Ok(config);
        }
    }

    config.project_id = Some(prompter.input("Enter project id")?);
    config.instance_id = Some(prompter.input("Enter instance id")?);
    store.save(&config)?;
    Ok(config)
}

/// Work out which entry to update: the remembered one if confirmed, else a
/// pick from the current names or a brand new name. The choice is saved to
/// the config before it is checked, and an empty name ends the run.
pub fn resolve_name(
    config: &mut Config,
    current: &[AclEntry],
    store: &mut dyn ConfigStore,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    if let Some(name) = config.remembered_name() {
        let name = name.to_string();
        if prompter.confirm(&format!("Do you want to update {name}?"))? {
            return Ok(name);
        }
    }

    let mut choices: Vec<String> = current.iter().map(|e| e.name.clone()).collect();
    choices.push(NEW_VALUE.to_string());
    let picked = prompter.select("Which IP do you want to update?", &choices)?;
    let name = if picked + 1 == choices.len() {
        prompter.input("Enter new name")?
    } else {
        choices
            .get(picked)
            .cloned()
            .context("Selection out of range")?
    };

    config.name = Some(name.clone());
    store.save(config)?;

    if name.is_empty() {
        ui::failure("Empty name");
        bail!("No entry name given");
    }
    Ok(name)
}

/// Send the new list unless the entry is already current.
pub fn commit_update(
    api: &dyn InstanceStateClient,
    instance: &InstanceRef,
    name: &str,
    cidr: &str,
    current: &[AclEntry],
) -> Result<Outcome> {
    match plan_update(current, name, cidr) {
        Plan::UpToDate => {
            ui::success(&format!("{name} IP is already up to date"));
            Ok(Outcome::AlreadyUpToDate {
                name: name.to_string(),
            })
        }
        Plan::Replace(entries) => {
            ui::step("Updating whitelisted IP addresses", None, || {
                api.set_authorized_networks(instance, &entries)
            })?;
            ui::success(&format!("{name} IP has been successfully updated"));
            Ok(Outcome::Updated {
                name: name.to_string(),
                cidr: cidr.to_string(),
            })
        }
    }
}
