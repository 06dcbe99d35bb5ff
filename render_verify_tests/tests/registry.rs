// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building scene objects from test case tags.

#![allow(clippy::missing_assert_message)]

use render_verify::Color;
use render_verify_tests::{
    animatable_property, Animatable, ObjectCategory, PropertyKind, Registry, SetupError,
};

#[derive(Debug, PartialEq)]
enum Object {
    SolidColorBrush(Color),
    RotateTransform(f64),
}

impl Animatable for Object {
    fn category(&self) -> ObjectCategory {
        match self {
            Self::SolidColorBrush(_) => ObjectCategory::Brush,
            Self::RotateTransform(_) => ObjectCategory::Transform,
        }
    }

    fn animatable_property(&self, name: &str) -> Option<PropertyKind> {
        match (self, name) {
            (Self::SolidColorBrush(_), "Color") => Some(PropertyKind::Color),
            (_, "Opacity") => Some(PropertyKind::Double),
            (Self::RotateTransform(_), "Angle") => Some(PropertyKind::Double),
            (Self::RotateTransform(_), "Center") => Some(PropertyKind::Point),
            _ => None,
        }
    }
}

fn parse_f64(tag: &str, value: Option<&&str>) -> Result<f64, SetupError> {
    value
        .ok_or_else(|| SetupError::InvalidParameters {
            tag: tag.to_string(),
            message: "missing value".to_string(),
        })?
        .parse()
        .map_err(|e| SetupError::InvalidParameters {
            tag: tag.to_string(),
            message: format!("{e}"),
        })
}

fn registry() -> Registry<Object> {
    let mut registry = Registry::new();
    registry
        .register(ObjectCategory::Brush, "SolidColor", |params| {
            let channel = |i: usize| parse_f64("SolidColor", params.get(i)).map(|v| v as f32);
            Ok(Object::SolidColorBrush(Color::from_components(
                channel(0)?,
                channel(1)?,
                channel(2)?,
                channel(3)?,
            )))
        })
        .register(ObjectCategory::Transform, "Rotate", |params| {
            parse_f64("Rotate", params.first()).map(Object::RotateTransform)
        });
    registry
}

#[test]
fn registered_objects_are_built() {
    let registry = registry();
    assert_eq!(
        registry.construct_tagged("Brush:SolidColor", &["1", "0.5", "0", "1"]),
        Ok(Object::SolidColorBrush(Color::from_components(
            1.0, 0.5, 0.0, 1.0
        )))
    );
    assert_eq!(
        registry.construct(ObjectCategory::Transform, "Rotate", &["45"]),
        Ok(Object::RotateTransform(45.0))
    );
}

#[test]
fn unknown_kinds_are_unsupported() {
    let registry = registry();
    assert_eq!(
        registry.construct_tagged("Brush:VisualBrush", &[]),
        Err(SetupError::Unsupported {
            category: ObjectCategory::Brush,
            tag: "VisualBrush".to_string()
        })
    );
    // Registered, but in another category.
    assert!(matches!(
        registry.construct(ObjectCategory::Pen, "SolidColor", &[]),
        Err(SetupError::Unsupported { .. })
    ));
    assert_eq!(
        registry.construct_tagged("Visual:Rotate", &["45"]),
        Err(SetupError::UnsupportedCategory("Visual".to_string()))
    );
    assert_eq!(
        registry.construct_tagged("Rotate", &["45"]),
        Err(SetupError::MalformedTag("Rotate".to_string()))
    );
}

#[test]
fn bad_parameters_are_reported() {
    let registry = registry();
    let err = registry
        .construct_tagged("Transform:Rotate", &["north"])
        .unwrap_err();
    assert!(matches!(err, SetupError::InvalidParameters { .. }));
    assert!(err.to_string().starts_with("Invalid parameters for Rotate"));
}

#[test]
fn animatable_properties_are_resolved() {
    let rotate = Object::RotateTransform(0.0);
    assert_eq!(
        animatable_property(&rotate, "Rotate", "Center"),
        Ok(PropertyKind::Point)
    );
    assert_eq!(
        animatable_property(&rotate, "Rotate", "Color"),
        Err(SetupError::UnknownProperty {
            category: ObjectCategory::Transform,
            tag: "Rotate".to_string(),
            property: "Color".to_string(),
        })
    );
    let brush: &dyn Animatable = &Object::SolidColorBrush(Color::WHITE);
    assert_eq!(
        animatable_property(brush, "SolidColor", "Opacity"),
        Ok(PropertyKind::Double)
    );
}
