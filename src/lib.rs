// Enable pedantic lints globally, then allow the noisy ones we're not fixing.
#![warn(clippy::pedantic, clippy::nursery)]
// --- Intentionally allowed ---
#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]
// DSP variable names (mid/side, left/right) are intentionally similar
#![allow(clippy::similar_names)]
// Audio code performs intentional casts
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap
)]
// Not a published API, no need for doc sections
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
// Style/pedantic lints that add noise without value here
#![allow(
    clippy::module_name_repetitions,
    clippy::items_after_statements,
    clippy::option_if_let_else,
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::match_same_arms,
    clippy::struct_field_names,
    clippy::needless_pass_by_value
)]
#![allow(clippy::redundant_pub_crate, clippy::significant_drop_tightening)]

pub mod effect;
pub mod host;
pub mod io;
pub mod midi;
pub mod render;
pub mod settings;
