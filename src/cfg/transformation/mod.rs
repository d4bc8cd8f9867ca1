mod remove_useless_blocks;

pub use self::remove_useless_blocks::{remove_useless_blocks, RemoveUselessBlocks};
