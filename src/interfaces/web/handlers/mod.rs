pub mod assignments;
pub mod employees;
pub mod geo;
pub mod session;
pub mod suggestions;
pub mod tasks;
