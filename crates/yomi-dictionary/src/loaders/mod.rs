//! Importers that turn an external dictionary package into store rows.
//!
//! Yomitan zip archives are the only supported format.

pub mod yomitan;
