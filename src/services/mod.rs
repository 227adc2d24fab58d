pub(crate) mod proctoring;
pub(crate) mod scoring;
pub(crate) mod session_backend;
pub(crate) mod session_clock;
pub(crate) mod session_flow;
