//! Entity type definitions
//!
//! Roster works with two record types:
//!
//! - [`Qualification`] - a named competency in the shared catalog
//! - [`Employee`] - a person holding a set of [`SkillReference`]s into that catalog
//!
//! The outbound shapes ([`EmployeePayload`], [`QualificationPayload`]) are
//! what the backend accepts on create and update.

pub mod employee;
pub mod qualification;

pub use employee::{Employee, EmployeeBasic, EmployeePayload, SkillReference};
pub use qualification::{Qualification, QualificationDetails, QualificationPayload};
