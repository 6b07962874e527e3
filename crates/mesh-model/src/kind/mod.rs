mod operation;
pub use operation::Operation;

mod resource;
pub use resource::ResourceKind;
