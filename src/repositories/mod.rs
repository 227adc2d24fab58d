pub(crate) mod forms;
pub(crate) mod questions;
pub(crate) mod responses;
pub(crate) mod sessions;
pub(crate) mod users;
