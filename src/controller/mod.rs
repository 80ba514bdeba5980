//! Form & request controller.
//!
//! - `validate`: pre-submit gate over the raw form text
//! - `state`: immutable form state and its reducer
//! - `runtime`: runs the reducer's requests on the event loop

mod runtime;
mod state;
mod validate;

pub use runtime::Controller;
pub use state::{
    Action, AppState, Banner, Channel, Effect, RequestError, RequestId, RequestStatus,
    Resolution, ResultsPanel, Transition,
};
pub use validate::{ParseError, ValidationError, parse_measurement, validate};
