mod order;
pub use order::ThreadOrder;

pub mod reaction;
pub use reaction::{Reaction, ReactionKind};

mod thread;
pub use thread::{run_command, Command, Thread, ThreadMsg};

pub mod tree;

#[cfg(test)]
pub(crate) mod testutil;

pub mod api {
    pub use quibble_api::*;
}

pub mod prelude {
    pub use crate::{ThreadOrder, Thread, ThreadMsg};
}
