// Resume extraction core: dates, tenure, experience metrics, field extraction.
// Everything except `handlers` is pure and synchronous; reference dates are
// always passed in.

pub mod catalogue;
pub mod coverage;
pub mod dates;
pub mod experience;
pub mod fields;
pub mod handlers;
pub mod location;
pub mod merge;
pub mod normalize;
pub mod prompts;
pub mod tenure;
