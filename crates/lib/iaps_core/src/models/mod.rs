//! Domain models.

pub mod classroom;
pub mod resource;
pub mod semester;
pub mod user;

pub use classroom::{ClassroomRow, ClassroomSummary, JoinRequestInfo, MemberInfo};
pub use resource::{DocumentRow, SubjectRow, TodoRow};
pub use semester::{SemesterDetail, SemesterRow};
pub use user::{TokenClaims, User};
