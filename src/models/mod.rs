pub mod category;
pub mod quiz;
pub mod quiz_attempt;
pub mod subject;
