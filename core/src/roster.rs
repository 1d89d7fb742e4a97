//! Roster store: the pool of selectable entries and the roles they fill.
//!
//! The backing source is a JSON object mapping entry name to a list of
//! role tags, e.g. `{"Ahri": ["Mid"], "Akali": ["Baron", "Mid"]}`.
//! The roster is immutable once loaded; edits are an offline operation
//! (see `upsert_entry` / `save`).

use crate::error::{BotError, BotResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The closed set of team slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Baron,
    Dragon,
    Mid,
    Jungle,
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Baron,
        Role::Dragon,
        Role::Mid,
        Role::Jungle,
        Role::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baron   => "Baron",
            Self::Dragon  => "Dragon",
            Self::Mid     => "Mid",
            Self::Jungle  => "Jungle",
            Self::Support => "Support",
        }
    }

    /// Single-letter shorthand used by the maintenance tool.
    pub fn from_code(code: char) -> Option<Role> {
        match code.to_ascii_lowercase() {
            'b' => Some(Self::Baron),
            'd' => Some(Self::Dragon),
            'm' => Some(Self::Mid),
            'j' => Some(Self::Jungle),
            's' => Some(Self::Support),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BotError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == tag)
            .ok_or_else(|| BotError::UnknownRole { tag: tag.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name:  String,
    pub roles: BTreeSet<Role>,
}

/// Role → entries eligible for it. Only roles some entry references appear.
pub type RoleIndex = BTreeMap<Role, Vec<String>>;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Keyed by name, so iteration order is the sorted name order.
    entries: BTreeMap<String, BTreeSet<Role>>,
}

impl Roster {
    /// Parse the roster from its JSON text.
    pub fn from_json(text: &str) -> BotResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| BotError::DataFormat {
                reason: format!("not valid JSON: {e}"),
            })?;
        let object = value.as_object().ok_or_else(|| BotError::DataFormat {
            reason: "top level must be an object of entry name to role list".to_string(),
        })?;

        let mut entries = BTreeMap::new();
        for (name, tags) in object {
            let tags = tags.as_array().ok_or_else(|| BotError::DataFormat {
                reason: format!("roles for '{name}' must be a list"),
            })?;
            if tags.is_empty() {
                return Err(BotError::DataFormat {
                    reason: format!("'{name}' has no roles"),
                });
            }
            let mut roles = BTreeSet::new();
            for tag in tags {
                let tag = tag.as_str().ok_or_else(|| BotError::DataFormat {
                    reason: format!("role tags for '{name}' must be strings"),
                })?;
                roles.insert(tag.parse::<Role>()?);
            }
            entries.insert(name.clone(), roles);
        }
        log::debug!("roster parsed: {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Read and parse the roster file at `path`.
    pub fn load(path: impl AsRef<Path>) -> BotResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let roster = Self::from_json(&text)?;
        log::info!(
            "roster loaded from {}: {} entries",
            path.as_ref().display(),
            roster.len()
        );
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<RosterEntry> {
        self.entries.get(name).map(|roles| RosterEntry {
            name:  name.to_string(),
            roles: roles.clone(),
        })
    }

    /// All entry names, sorted.
    pub fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Invert entry → roles into role → entries.
    pub fn role_index(&self) -> RoleIndex {
        let mut index = RoleIndex::new();
        for (name, roles) in &self.entries {
            for role in roles {
                index.entry(*role).or_default().push(name.clone());
            }
        }
        index
    }

    /// Both views the team engine consumes.
    pub fn split(&self) -> (Vec<String>, RoleIndex) {
        (self.entry_names(), self.role_index())
    }

    // ── Offline maintenance ───────────────────────────────────────

    /// Add or replace an entry. An empty role set is rejected.
    pub fn upsert_entry(&mut self, name: &str, roles: BTreeSet<Role>) -> BotResult<()> {
        if roles.is_empty() {
            return Err(BotError::DataFormat {
                reason: format!("'{name}' has no roles"),
            });
        }
        self.entries.insert(name.to_string(), roles);
        Ok(())
    }

    pub fn to_json_pretty(&self) -> BotResult<String> {
        let doc: BTreeMap<&str, Vec<&str>> = self
            .entries
            .iter()
            .map(|(name, roles)| (name.as_str(), roles.iter().map(Role::as_str).collect()))
            .collect();
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> BotResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Parse a code string such as `"bm"` into roles.
pub fn roles_from_codes(codes: &str) -> BotResult<BTreeSet<Role>> {
    codes
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| {
            Role::from_code(c).ok_or_else(|| BotError::UnknownRole { tag: c.to_string() })
        })
        .collect()
}
