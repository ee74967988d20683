//! # Property Model
//!
//! This crate contains the pure data types shared by every configurer: the declared
//! [`PropertyType`] of an option and the loosely typed [`PropertyValue`] handed to it.
//! Keep it lean: no lookup, coercion, or I/O, just data and simple helpers.

pub mod types;
pub mod value;

pub use types::{EnumType, ObjectType, PropertyType};
pub use value::{ObjectRef, PropertyValue};
