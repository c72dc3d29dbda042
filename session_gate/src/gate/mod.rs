mod decision;
mod redirect;
mod types;

pub use decision::evaluate;
pub use redirect::{apply_redirect, redirect_status};
pub use types::{GateDecision, GateScope};
