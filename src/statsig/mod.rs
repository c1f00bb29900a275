pub mod statsig_datastore;
pub mod statsig_error;
pub mod statsig_error_sink;
pub mod statsig_options;
pub mod statsig_specs_client;

pub(crate) mod internal;
