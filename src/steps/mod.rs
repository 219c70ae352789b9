//! Typed argument structs for the install steps.
//!
//! Each struct implements `StepArgs` and maps its fields to the exact argument
//! vector of the tool it drives.

pub mod link;
pub mod python;
pub mod system;

pub use link::CompatLinkArgs;
pub use python::PythonRequirementsArgs;
pub use system::SystemPackagesArgs;
