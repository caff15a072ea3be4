pub mod registry;
pub mod state;

pub use registry::{FormRegistry, DEFAULT_FORM_IDLE_TTL, MAX_FORMS_PER_OWNER};
pub use state::{FieldError, FormField, FormState, MarketForm, SubmitError};
