pub mod contest;
pub mod stats;
pub mod student;
pub mod submission;

pub use contest::Contest;
pub use stats::{HardestProblem, ProblemStats};
pub use student::{NewStudent, NewStudentRequest, Student, UpdateStudentRequest};
pub use submission::{Submission, VERDICT_ACCEPTED};
