mod statsig;

// re-export public objects to top level
pub use statsig::internal::{
    APIDownloadedConfigs, APIIdList, IdList, IdLists, SpecMap, Specs, StatsigNetwork, StatsigStore,
};
pub use statsig::statsig_datastore::{StatsigDatastore, CONFIG_SPEC_KEY};
pub use statsig::statsig_error::StatsigError;
pub use statsig::statsig_error_sink::{LogErrorSink, StatsigErrorSink};
pub use statsig::statsig_options::{RulesUpdatedCallback, StatsigOptions};
pub use statsig::statsig_specs_client::{IdListRange, StatsigSpecsClient};
