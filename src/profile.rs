//! Structured résumé input for the ATS résumé builder and gap analysis

use crate::error::{Result, ResumeMatchError};
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stable handle to one row of an [`EntryList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

/// Ordered rows with identifiers that survive removal and reordering.
///
/// Ids are never reused within one list, so a handle held by a caller
/// either resolves to the row it was issued for or to nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryList<T> {
    next_id: u32,
    entries: Vec<(EntryId, T)>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> EntryList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, value));
        id
    }

    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries.iter().find(|(i, _)| *i == id).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.entries.iter_mut().find(|(i, _)| *i == id).map(|(_, v)| v)
    }

    /// Swap the row with its predecessor. Returns false at the top or for
    /// an unknown id.
    pub fn move_up(&mut self, id: EntryId) -> bool {
        match self.position(id) {
            Some(index) if index > 0 => {
                self.entries.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_down(&mut self, id: EntryId) -> bool {
        match self.position(id) {
            Some(index) if index + 1 < self.entries.len() => {
                self.entries.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> {
        self.entries.iter().map(|(id, v)| (*id, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|(i, _)| *i == id)
    }
}

impl<T> FromIterator<T> for EntryList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = EntryList::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}

// Ids are session handles; files store only the ordered rows.
impl<T: Serialize> Serialize for EntryList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for value in self.values() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for EntryList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<T>::deserialize(deserializer)?;
        Ok(rows.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub location: String,
    pub year: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: Vec<String>,
    pub summary: String,
    /// Either plain skills or `Category: a, b, c` lines.
    pub skills: Vec<String>,
    pub experience: EntryList<Experience>,
    pub education: EntryList<Education>,
    pub projects: EntryList<Project>,
    pub certifications: Vec<String>,
    /// Path or data URI of a photo. Kept for round-tripping, not rendered.
    pub photo: Option<String>,
}

/// One line of the skills section after splitting off its category.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup {
    pub category: Option<String>,
    pub items: Vec<String>,
}

impl ResumeProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(ResumeMatchError::UnsupportedFormat(format!(
                "Profile must be .json or .toml: {}",
                path.display()
            ))),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ResumeMatchError::InvalidInput(format!("Failed to parse profile: {}", e)))
    }

    pub fn skill_groups(&self) -> Vec<SkillGroup> {
        self.skills
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match line.split_once(':') {
                Some((category, rest)) => SkillGroup {
                    category: Some(category.trim().to_string()),
                    items: split_list(rest),
                },
                None => SkillGroup {
                    category: None,
                    items: vec![line.trim().to_string()],
                },
            })
            .collect()
    }

    /// Every skill, lowercased, with category prefixes removed.
    pub fn flat_skills(&self) -> Vec<String> {
        self.skill_groups()
            .into_iter()
            .flat_map(|group| group.items)
            .map(|skill| skill.to_lowercase())
            .collect()
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
