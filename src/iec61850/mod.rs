pub mod attribute;
pub mod decoder;
pub mod node;
pub mod report;

pub use attribute::{DataAttribute, LogicalNode, SubDataAttribute};
pub use node::{Fc, Node, SubValue};
pub use report::{OptFields, ReasonForInclusion, Report};
