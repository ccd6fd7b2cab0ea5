pub mod adder;
pub mod overlap;
pub mod phase;
pub mod track;
pub mod zero_crossing;
