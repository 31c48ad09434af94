//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod academic_year;
pub mod classroom;
pub mod student;
pub mod student_assignment;
pub mod teacher;

// Re-export specific types to avoid conflicts
pub use academic_year::{
    Column as AcademicYearColumn, Entity as AcademicYear, Model as AcademicYearModel,
};
pub use classroom::{Column as ClassroomColumn, Entity as Classroom, Model as ClassroomModel};
pub use student::{
    Column as StudentColumn, Entity as Student, Gender, Model as StudentModel, StudentStatus,
};
pub use student_assignment::{
    Column as StudentAssignmentColumn, Entity as StudentAssignment,
    Model as StudentAssignmentModel,
};
pub use teacher::{Column as TeacherColumn, Entity as Teacher, Model as TeacherModel, TeacherStatus};
