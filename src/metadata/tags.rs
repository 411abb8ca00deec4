use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Lifecycle scope of a bean
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    /// One instance reused for every resolution
    #[default]
    Shared,
    /// A new instance for every resolution
    PerRequest,
}

/// A declarative tag attached to a type or to one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Manageable,
    Configuration,
    Produces,
    Inject,
    Optional,
    Scope(Scope),
    Lazy,
    Primary,
    Qualifier(String),
    PostInitialize,
    /// Reserved for teardown; ignored while resolving.
    PreDestroy,
}

/// The tags declared on one type or member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn has(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_manageable(&self) -> bool {
        self.has(&Tag::Manageable)
    }

    pub fn is_configuration(&self) -> bool {
        self.has(&Tag::Configuration)
    }

    /// Declared scope; the last declaration wins when repeated
    pub fn scope(&self) -> Option<Scope> {
        self.tags.iter().rev().find_map(|tag| match tag {
            Tag::Scope(scope) => Some(*scope),
            _ => None,
        })
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.tags.iter().rev().find_map(|tag| match tag {
            Tag::Qualifier(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl Extend<Tag> for TagSet {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        self.tags.extend(iter);
    }
}
