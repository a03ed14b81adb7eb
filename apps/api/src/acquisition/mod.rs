pub mod resolver;

pub use resolver::{resolve, AcquisitionMode, LocalResume, ModeKind, ResolverInput};
