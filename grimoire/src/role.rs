//! Role catalog: static lookup from a role name to its team and flavor text.
//!
//! Roles are stored one JSON file per role, named by slug
//! (`"Scarlet Woman"` → `scarlet-woman.json`). Lookups accept either the
//! display name or the slug.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GrimoireError, GrimoireResult};

/// Team alignment of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Townsfolk,
    Outsider,
    Minion,
    Demon,
}

impl Team {
    /// Townsfolk and outsiders are good; minions and demons are evil.
    pub fn is_good(self) -> bool {
        matches!(self, Self::Townsfolk | Self::Outsider)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Townsfolk => write!(f, "townsfolk"),
            Self::Outsider => write!(f, "outsider"),
            Self::Minion => write!(f, "minion"),
            Self::Demon => write!(f, "demon"),
        }
    }
}

/// A character on the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(rename = "type")]
    pub team: Team,
    pub ability: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub player_tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bluffing_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fighting_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

impl Role {
    /// Minimal role with no flavor text. Mostly useful in tests.
    pub fn new(name: &str, team: Team, ability: &str) -> Self {
        Self {
            name: name.to_string(),
            team,
            ability: ability.to_string(),
            detailed_description: String::new(),
            player_tips: Vec::new(),
            bluffing_tips: None,
            fighting_tips: None,
            examples: None,
        }
    }
}

/// Normalize a role name to its file slug: lowercase, whitespace → `-`.
pub fn role_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Lookup table of roles keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: HashMap<String, Role>,
}

impl RoleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-parsed roles.
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut catalog = Self::new();
        for role in roles {
            catalog.insert(role);
        }
        catalog
    }

    /// Load the given roles from `<dir>/<slug>.json`.
    ///
    /// Every requested role must exist; a missing file is a configuration
    /// error rather than something to skip.
    pub fn load<S: AsRef<str>>(dir: &Path, names: &[S]) -> GrimoireResult<Self> {
        let mut catalog = Self::new();
        for name in names {
            let role = Self::read_role(dir, name.as_ref())?;
            catalog.insert(role);
        }
        debug!(dir = %dir.display(), roles = catalog.len(), "Loaded role catalog");
        Ok(catalog)
    }

    /// Read a single role file without adding it to a catalog.
    pub fn read_role(dir: &Path, name: &str) -> GrimoireResult<Role> {
        let path = dir.join(format!("{}.json", role_slug(name)));
        let content = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => GrimoireError::UnknownRole(name.to_string()),
            _ => GrimoireError::RoleIo {
                path: path.clone(),
                source,
            },
        })?;
        serde_json::from_str(&content).map_err(|source| GrimoireError::RoleParse { path, source })
    }

    pub fn insert(&mut self, role: Role) {
        self.roles.insert(role_slug(&role.name), role);
    }

    /// Resolve a role by name or slug.
    pub fn get(&self, name: &str) -> GrimoireResult<&Role> {
        self.roles
            .get(&role_slug(name))
            .ok_or_else(|| GrimoireError::UnknownRole(name.to_string()))
    }

    /// Resolve a role's team.
    pub fn team_of(&self, name: &str) -> GrimoireResult<Team> {
        self.get(name).map(|r| r.team)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
