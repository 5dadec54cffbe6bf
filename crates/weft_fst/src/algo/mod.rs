//! Rational operations over [`VectorFst`](crate::fst::VectorFst).
//!
//! Every operation either mutates a machine in place (structural edits like
//! concatenation and closure) or builds a fresh machine (products like
//! composition and difference). All of them are eager.

mod closure;
mod compose;
mod concat;
mod connect;
mod cross;
mod determinize;
mod difference;
mod encode;
mod lenient;
mod map;
mod minimize;
mod optimize;
mod replace;
mod rmepsilon;
mod shortest;
mod union;

pub use closure::{closure_plus, closure_question, closure_star, concat_range};
pub use compose::compose;
pub use concat::concat;
pub use connect::{connect, top_sort};
pub use cross::cross;
pub use determinize::determinize;
pub use difference::difference;
pub use encode::{decode, encode, EncodeTable};
pub use lenient::leniently_compose;
pub use map::{arc_sort, invert, project, rm_weight, ProjectType, SortType};
pub use minimize::minimize;
pub use optimize::{optimize, optimize_difference_rhs};
pub use replace::{replace, ReplaceError};
pub use rmepsilon::rm_epsilon;
pub use shortest::{
    labels_to_text, path_weights, prune_to_best, shortest_distance, shortest_path_labels,
    total_weight,
};
pub use union::union;
