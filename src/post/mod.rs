pub mod feed;
pub mod listing;
pub mod post_controller;
pub mod post_index;
pub mod post_model;
pub mod post_service;
pub mod vote_model;
