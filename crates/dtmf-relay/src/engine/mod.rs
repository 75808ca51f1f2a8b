//! Call correlation and DTMF playback.
//!
//! Each inbound call is answered, matched to its pending verification by
//! session id, fed the code's tones one digit at a time, and hung up.
//! The registry is the only state shared between calls.

mod call;
mod dispatcher;
mod pacer;
mod playback;

pub use call::{CallError, CallHandle};
pub use dispatcher::CallDispatcher;
pub use pacer::{Pacer, TokioPacer};
pub use playback::{CallOutcome, PlaybackEngine, PlaybackReport, INTER_DIGIT_INTERVAL};
