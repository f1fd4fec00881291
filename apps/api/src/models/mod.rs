pub mod journey;
