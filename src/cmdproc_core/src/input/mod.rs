pub mod accumulator;

pub use accumulator::LineAccumulator;
