pub mod age;
pub mod build;
pub mod convert;
pub mod normalize;
