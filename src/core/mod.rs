//! Core replay abstractions: data model, execution, scheduling and sinks.

pub mod error;
pub mod executor;
pub mod resource;
pub mod scheduler;
pub mod sink;

pub use error::{AppResult, ReplayError, SinkError, TransportError};
pub use executor::{
    map_reqwest_error, ExecutionOutcome, HttpResponse, HttpTransport, IgnorableKind,
    ReqwestTransport, RequestExecutor,
};
pub use resource::{RequestResult, ResourceDescriptor};
pub use scheduler::{ReplayScheduler, ReplaySummary};
pub use sink::{InMemorySink, NoopSink, ResultSink, SinkEvent};
