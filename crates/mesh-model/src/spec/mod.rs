mod dependency;
pub use dependency::{DEPENDENCY_KIND, Dependency, DependencySpec, ObjectMeta, TypeMeta};

mod template;
pub use template::DependencyTemplate;
