mod load;
mod tree;

pub use load::{load_edges, load_graph, load_nodes, NodeMap};
pub use tree::{read_tree, read_tree_dir, GraphTree, TreeBlob};

#[cfg(test)]
mod tests;
