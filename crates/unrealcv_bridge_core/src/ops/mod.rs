pub mod console;
pub mod probe;
pub mod raw;
pub mod spawn;
