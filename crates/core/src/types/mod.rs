//! Core types for the portfolio.
//!
//! This module provides the typed shapes of every stored record, plus the
//! normalization rules that turn loosely-shaped documents into them.

pub mod company;
pub mod id;
pub mod project;
pub mod skill;

pub use company::{CompanyPatch, CompanyRecord, CompanySection};
pub use id::{ProjectId, ProjectRef};
pub use project::{NormalizeError, Project, ProjectInput, ProjectInputError};
pub use skill::{Skill, SkillCategory, SkillsError};
