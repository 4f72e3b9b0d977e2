pub mod assessment;
pub mod diagnosis;
pub mod employee;
