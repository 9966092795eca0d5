pub mod graph_view;
pub mod panels;
