pub mod applications;
pub mod domain;
pub mod intake;
pub mod matching;
