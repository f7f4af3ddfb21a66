pub mod behaviour;
pub mod cbm;
pub mod host;
pub mod immediate;
pub mod immediate_cbm;
pub mod response_capture;

pub use behaviour::{BaseBehaviour, Behaviour};
pub use host::{
    AttemptContext, ConfigLookup, ContentStore, GradingService, QuestionType, UsageContextResolver,
};
pub use immediate::ImmediateBehaviour;
pub use immediate_cbm::ImmediateCbmBehaviour;
pub use response_capture::ResponseCapture;
