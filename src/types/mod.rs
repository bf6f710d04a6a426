pub mod args;
pub mod base;
pub mod containers;
pub mod enums;
pub mod field;
pub mod interface;
pub mod marker;
pub mod nullable;
pub mod object;
pub mod scalars;
pub mod wrapped;
