pub mod result_sink;

pub use result_sink::{JsonFileSink, ResultSink};
