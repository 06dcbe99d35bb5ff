// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Looking up scene object constructors from the string tags used by test cases.
//!
//! Anything a test case asks for which is not registered fails here, before any pass is
//! rendered.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The kinds of object a test case can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectCategory {
    Geometry,
    Pen,
    Brush,
    Transform,
    Drawing,
    Shape,
}

impl ObjectCategory {
    pub const ALL: [Self; 6] = [
        Self::Geometry,
        Self::Pen,
        Self::Brush,
        Self::Transform,
        Self::Drawing,
        Self::Shape,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => "Geometry",
            Self::Pen => "Pen",
            Self::Brush => "Brush",
            Self::Transform => "Transform",
            Self::Drawing => "Drawing",
            Self::Shape => "Shape",
        }
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectCategory {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SetupError::UnsupportedCategory(s.to_string()))
    }
}

/// The value type of an animatable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Double,
    Color,
    Point,
    Size,
    Rect,
    Matrix,
}

/// Objects whose properties can be animated.
pub trait Animatable {
    fn category(&self) -> ObjectCategory;

    /// The kind of the animatable property `name`, if there is one.
    fn animatable_property(&self, name: &str) -> Option<PropertyKind>;
}

/// Look up an animatable property, failing if `object` does not have it.
pub fn animatable_property(
    object: &(impl Animatable + ?Sized),
    tag: &str,
    name: &str,
) -> Result<PropertyKind, SetupError> {
    object
        .animatable_property(name)
        .ok_or_else(|| SetupError::UnknownProperty {
            category: object.category(),
            tag: tag.to_string(),
            property: name.to_string(),
        })
}

/// A test case asked for something which can't be built.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetupError {
    #[error("Unsupported object category '{0}'")]
    UnsupportedCategory(String),
    #[error("Unsupported {category} kind '{tag}'")]
    Unsupported {
        category: ObjectCategory,
        tag: String,
    },
    #[error("{category} '{tag}' has no animatable property '{property}'")]
    UnknownProperty {
        category: ObjectCategory,
        tag: String,
        property: String,
    },
    #[error("Invalid parameters for {tag}: {message}")]
    InvalidParameters { tag: String, message: String },
    #[error("Expected 'Category:Kind', got '{0}'")]
    MalformedTag(String),
}

/// Builds an object from its string parameters.
pub type Constructor<T> = Box<dyn Fn(&[&str]) -> Result<T, SetupError>>;

/// Maps `(category, tag)` pairs to constructors.
pub struct Registry<T> {
    constructors: BTreeMap<(ObjectCategory, String), Constructor<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register `constructor` for `tag`, replacing any earlier registration.
    pub fn register(
        &mut self,
        category: ObjectCategory,
        tag: impl Into<String>,
        constructor: impl Fn(&[&str]) -> Result<T, SetupError> + 'static,
    ) -> &mut Self {
        self.constructors
            .insert((category, tag.into()), Box::new(constructor));
        self
    }

    /// Build the object registered as `tag` in `category`.
    pub fn construct(
        &self,
        category: ObjectCategory,
        tag: &str,
        params: &[&str],
    ) -> Result<T, SetupError> {
        let constructor = self
            .constructors
            .get(&(category, tag.to_string()))
            .ok_or_else(|| SetupError::Unsupported {
                category,
                tag: tag.to_string(),
            })?;
        constructor(params)
    }

    /// Build an object from a `Category:Kind` tag, such as `Brush:SolidColor`.
    pub fn construct_tagged(&self, tagged: &str, params: &[&str]) -> Result<T, SetupError> {
        let (category, tag) = tagged
            .split_once(':')
            .ok_or_else(|| SetupError::MalformedTag(tagged.to_string()))?;
        self.construct(category.parse()?, tag.trim(), params)
    }

    /// The registered tags of `category`, sorted.
    pub fn tags(&self, category: ObjectCategory) -> impl Iterator<Item = &str> {
        self.constructors
            .keys()
            .filter(move |(c, _)| *c == category)
            .map(|(_, tag)| tag.as_str())
    }
}
