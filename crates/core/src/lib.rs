pub mod backend;
pub mod config;
pub mod evaluator;
pub mod frontend;
pub mod mmf;
pub mod query;
pub mod statestore;
pub mod synchronizer;
pub mod testing;
pub mod ticket;

pub use backend::{BackendError, BackendService};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig,
};
pub use evaluator::{build_evaluator, Evaluator, EvaluatorConfig, EvaluatorError};
pub use frontend::{
    create_deleter, DeleterHandle, FrontendConfig, FrontendError, FrontendService, TicketDeleter,
};
pub use mmf::{
    Match, MatchFunction, MatchFunctionHost, MatchProfile, MmfError, MmfHostConfig,
    PairMatchFunction, Roster,
};
pub use query::{
    DoubleRangeFilter, Pool, QueryConfig, QueryError, QueryService, StringEqualsFilter,
    TagPresentFilter,
};
pub use statestore::{
    AssignmentCallback, RedisStateStore, StateStore, StoreConfig, StoreError, WatchFlow,
};
pub use synchronizer::{Registration, SyncError, Synchronizer, SynchronizerConfig};
pub use ticket::{Assignment, SearchFields, Ticket};
