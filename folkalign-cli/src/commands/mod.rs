pub mod build_cost_map;
pub mod command;
pub mod cost_map_args;
pub mod distance;
pub mod pairwise;
pub mod search;
