mod arena;
mod handle;
mod node;
mod raw_ladder_tree;

pub(crate) use raw_ladder_tree::RawLadderTree;
