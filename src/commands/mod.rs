pub mod index;
pub mod lookup;
pub mod pipeline;
pub mod retime;
pub mod status;
pub mod student;
