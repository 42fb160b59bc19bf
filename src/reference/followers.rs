use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::typology::TypeCode;
use super::ReferenceError;

/// A team-member behavioural profile used for compatibility lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowerType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A follower type picked for a named team member.
///
/// Built once at the input boundary via [`FollowerTaxonomy::select`]; the rest
/// of the crate never re-inspects the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerSelection {
    pub id: String,
    pub name: String,
    pub member_name: String,
}

#[derive(Debug, Clone)]
pub struct FollowerTaxonomy {
    types: Vec<FollowerType>,
}

impl FollowerTaxonomy {
    pub fn new(types: Vec<FollowerType>) -> Result<Self, ReferenceError> {
        let mut seen = std::collections::HashSet::new();
        for t in &types {
            if !seen.insert(t.id.as_str()) {
                return Err(ReferenceError::DuplicateFollower(t.id.clone()));
            }
        }
        Ok(Self { types })
    }

    pub fn get(&self, id: &str) -> Option<&FollowerType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FollowerType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a follower id for a team member. Unknown ids yield `None`.
    pub fn select(&self, id: &str, member_name: &str) -> Option<FollowerSelection> {
        self.get(id).map(|t| FollowerSelection {
            id: t.id.clone(),
            name: t.name.clone(),
            member_name: member_name.trim().to_string(),
        })
    }

    /// Parse an `id:name` team member argument. A bare `id` names the member
    /// after the follower type.
    pub fn parse_selection(&self, member: &str) -> Result<FollowerSelection, ReferenceError> {
        let (id, member_name) = match member.split_once(':') {
            Some((id, name)) => (id.trim(), name.trim()),
            None => (member.trim(), ""),
        };

        let follower = self
            .get(id)
            .ok_or_else(|| ReferenceError::UnknownFollower(id.to_string()))?;
        let member_name = if member_name.is_empty() {
            follower.name.as_str()
        } else {
            member_name
        };

        self.select(id, member_name)
            .ok_or_else(|| ReferenceError::UnknownFollower(id.to_string()))
    }
}

/// Strength/caution text for one (leadership code, follower type) pairing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompatibilityEntry {
    pub score: u8,
    pub strength: String,
    pub caution: String,
}

/// Sparse (code, follower id) -> entry lookup
#[derive(Debug, Clone, Default)]
pub struct CompatibilityMatrix {
    entries: HashMap<TypeCode, HashMap<String, CompatibilityEntry>>,
}

impl CompatibilityMatrix {
    /// Build the matrix, checking every follower id against the taxonomy
    pub fn new(
        entries: HashMap<TypeCode, HashMap<String, CompatibilityEntry>>,
        taxonomy: &FollowerTaxonomy,
    ) -> Result<Self, ReferenceError> {
        for (code, row) in &entries {
            for (follower_id, entry) in row {
                if taxonomy.get(follower_id).is_none() {
                    return Err(ReferenceError::UnknownFollower(format!(
                        "{} (in compatibility row {})",
                        follower_id, code
                    )));
                }
                if entry.score > 100 {
                    return Err(ReferenceError::InvalidCompatibilityScore {
                        code: *code,
                        follower: follower_id.clone(),
                        score: entry.score,
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, code: TypeCode, follower_id: &str) -> Option<&CompatibilityEntry> {
        self.entries.get(&code).and_then(|row| row.get(follower_id))
    }

    /// Pairings of the taxonomy that have no entry
    pub fn gaps(&self, taxonomy: &FollowerTaxonomy) -> Vec<(TypeCode, String)> {
        let mut gaps = Vec::new();
        for code in TypeCode::ALL {
            for follower in taxonomy.iter() {
                if self.get(code, &follower.id).is_none() {
                    gaps.push((code, follower.id.clone()));
                }
            }
        }
        gaps
    }
}
