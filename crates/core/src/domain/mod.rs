pub mod quote;
pub mod selection;
pub mod tier;
