pub mod chronograph;
