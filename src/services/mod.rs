pub mod city_info;
pub mod clustering;
pub mod cost;
pub mod recommendations;

pub use clustering::{ClusterModel, ClusterSettings};
pub use recommendations::{CandidatePicker, Recommender, SeededPicker, ThreadRngPicker};
